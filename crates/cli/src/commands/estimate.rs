use std::collections::BTreeSet;
use std::path::PathBuf;

use webforge_core::catalog::{FeatureId, PricingCatalog, ServiceId, TimelineId};
use webforge_core::pricing::{estimate_selection, QuoteSelection};

use super::{format_minor, CommandResult};

#[derive(Debug, Clone)]
pub struct EstimateArgs {
    pub service: String,
    pub features: Vec<String>,
    pub pages: Option<u32>,
    pub timeline: String,
    pub catalog: Option<PathBuf>,
    pub json: bool,
}

pub fn run(args: EstimateArgs) -> CommandResult {
    let catalog = match load_catalog(args.catalog.as_deref()) {
        Ok(catalog) => catalog,
        Err(message) => return CommandResult::failure("estimate", "catalog_load", message, 2),
    };

    let selection = QuoteSelection {
        service: ServiceId(args.service.clone()),
        features: args.features.iter().map(|id| FeatureId(id.clone())).collect::<BTreeSet<_>>(),
        page_count: args.pages,
        timeline: TimelineId(args.timeline.clone()),
    };

    let estimate = match estimate_selection(&catalog, &selection) {
        Ok(estimate) => estimate,
        Err(error) => {
            return CommandResult::failure("estimate", "unknown_service", error.to_string(), 3)
        }
    };

    if args.json {
        let message = serde_json::to_string(&estimate)
            .unwrap_or_else(|error| format!("estimate serialization failed: {error}"));
        return CommandResult::success("estimate", message);
    }

    let subtotal = estimate.base + estimate.feature_total + estimate.page_overage;
    let message = [
        format!("Estimate for {} ({} timeline):", args.service, args.timeline),
        format!("  base:               {}", format_minor(estimate.base)),
        format!("  features:           {}", format_minor(estimate.feature_total)),
        format!("  page overage:       {}", format_minor(estimate.page_overage)),
        format!("  subtotal:           {}", format_minor(subtotal)),
        format!("  timeline surcharge: {}", format_minor(estimate.timeline_surcharge)),
        format!("  total:              {} {}", catalog.currency, format_minor(estimate.total)),
    ]
    .join("\n");

    CommandResult::success("estimate", message)
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<PricingCatalog, String> {
    match path {
        Some(path) => PricingCatalog::load(path).map_err(|error| error.to_string()),
        None => Ok(PricingCatalog::reference()),
    }
}
