use std::path::Path;

use webforge_core::catalog::PricingCatalog;

use super::{format_minor, CommandResult};

pub fn run(path: Option<&Path>) -> CommandResult {
    let (catalog, source) = match path {
        Some(path) => match PricingCatalog::load(path) {
            Ok(catalog) => (catalog, path.display().to_string()),
            Err(error) => {
                return CommandResult::failure("catalog", "catalog_load", error.to_string(), 2)
            }
        },
        None => (PricingCatalog::reference(), "built-in reference".to_string()),
    };

    let mut lines = vec![
        format!("catalog ({source}), currency {}:", catalog.currency),
        format!(
            "  page rule: first {} pages included, then {} per page on `{}`",
            catalog.included_pages,
            format_minor(catalog.per_page_rate),
            catalog.page_priced_service.0
        ),
        format!("  services ({}):", catalog.services.len()),
    ];
    for service in &catalog.services {
        lines.push(format!(
            "    - {} [{}]: {}",
            service.label,
            service.id.0,
            format_minor(service.base_price)
        ));
    }
    lines.push(format!("  features ({}):", catalog.features.len()));
    for feature in &catalog.features {
        lines.push(format!(
            "    - {} [{}]: +{}",
            feature.label,
            feature.id.0,
            format_minor(feature.price)
        ));
    }
    lines.push(format!("  timelines ({}):", catalog.timelines.len()));
    for timeline in &catalog.timelines {
        lines.push(format!(
            "    - {} [{}]: x{}",
            timeline.label, timeline.id.0, timeline.multiplier
        ));
    }

    CommandResult::success("catalog", lines.join("\n"))
}
