use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub String);

/// Timeline id every catalog must carry with a multiplier of exactly 1.
pub const STANDARD_TIMELINE: &str = "standard";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOption {
    pub id: ServiceId,
    pub label: String,
    /// Base price in minor currency units.
    pub base_price: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureOption {
    pub id: FeatureId,
    pub label: String,
    /// Flat surcharge in minor currency units, applied at most once.
    pub price: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineOption {
    pub id: TimelineId,
    pub label: String,
    /// Multiplicative factor applied to the running subtotal, >= 1.
    pub multiplier: Decimal,
}

/// Deploy-time pricing data: option tables plus the page-overage rule.
///
/// Loaded once at startup (built-in reference data or a TOML file) and
/// treated as immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingCatalog {
    pub currency: String,
    pub services: Vec<ServiceOption>,
    pub features: Vec<FeatureOption>,
    pub timelines: Vec<TimelineOption>,
    /// Cost per page beyond `included_pages`, in minor units.
    pub per_page_rate: i64,
    /// Pages covered by the base price of the page-priced service.
    pub included_pages: u32,
    /// The one service whose price scales with page count.
    pub page_priced_service: ServiceId,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("could not parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog validation failed: {0}")]
    Validation(String),
}

impl PricingCatalog {
    /// The reference pricing data the site ships with. Prices are INR paise.
    pub fn reference() -> Self {
        Self {
            currency: "INR".to_string(),
            services: vec![
                service("websites", "Business Website", 249_900),
                service("ecommerce", "E-commerce Store", 499_900),
                service("webapps", "Web Application", 899_900),
                service("dashboards", "Analytics Dashboard", 699_900),
                service("maintenance", "Care & Maintenance Plan", 19_900),
            ],
            features: vec![
                feature("cms", "Content Management", 50_000),
                feature("seo", "SEO Setup", 60_000),
                feature("copywriting", "Copywriting", 40_000),
                feature("branding", "Logo & Brand Kit", 35_000),
                feature("analytics", "Analytics Integration", 25_000),
                feature("chat", "Live Chat Widget", 30_000),
            ],
            timelines: vec![
                timeline(STANDARD_TIMELINE, "Standard (4-6 weeks)", Decimal::ONE),
                timeline("express", "Express (2-3 weeks)", Decimal::new(125, 2)),
                timeline("rush", "Rush (under 2 weeks)", Decimal::new(150, 2)),
            ],
            per_page_rate: 15_000,
            included_pages: 5,
            page_priced_service: ServiceId("websites".to_string()),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = toml::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        let catalog: Self = toml::from_str(&raw)
            .map_err(|source| CatalogError::ParseFile { path: path.to_path_buf(), source })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn find_service(&self, id: &ServiceId) -> Option<&ServiceOption> {
        self.services.iter().find(|option| &option.id == id)
    }

    pub fn find_feature(&self, id: &FeatureId) -> Option<&FeatureOption> {
        self.features.iter().find(|option| &option.id == id)
    }

    pub fn find_timeline(&self, id: &TimelineId) -> Option<&TimelineOption> {
        self.timelines.iter().find(|option| &option.id == id)
    }

    /// Catalog invariants. A failure here is a deploy-time defect, not a
    /// runtime condition to recover from.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.currency.trim().is_empty() {
            return Err(CatalogError::Validation("currency must be set".to_string()));
        }
        if self.services.is_empty() {
            return Err(CatalogError::Validation("at least one service is required".to_string()));
        }
        if self.timelines.is_empty() {
            return Err(CatalogError::Validation("at least one timeline is required".to_string()));
        }

        check_unique("services", self.services.iter().map(|option| option.id.0.as_str()))?;
        check_unique("features", self.features.iter().map(|option| option.id.0.as_str()))?;
        check_unique("timelines", self.timelines.iter().map(|option| option.id.0.as_str()))?;

        if let Some(option) = self.services.iter().find(|option| option.base_price < 0) {
            return Err(CatalogError::Validation(format!(
                "service `{}` has a negative base price",
                option.id.0
            )));
        }
        if let Some(option) = self.features.iter().find(|option| option.price < 0) {
            return Err(CatalogError::Validation(format!(
                "feature `{}` has a negative price",
                option.id.0
            )));
        }
        if let Some(option) = self.timelines.iter().find(|option| option.multiplier < Decimal::ONE)
        {
            return Err(CatalogError::Validation(format!(
                "timeline `{}` has a multiplier below 1",
                option.id.0
            )));
        }

        let standard = TimelineId(STANDARD_TIMELINE.to_string());
        match self.find_timeline(&standard) {
            Some(option) if option.multiplier == Decimal::ONE => {}
            Some(_) => {
                return Err(CatalogError::Validation(format!(
                    "timeline `{STANDARD_TIMELINE}` must have a multiplier of exactly 1"
                )));
            }
            None => {
                return Err(CatalogError::Validation(format!(
                    "a `{STANDARD_TIMELINE}` timeline is required"
                )));
            }
        }

        if self.per_page_rate < 0 {
            return Err(CatalogError::Validation("per_page_rate must not be negative".to_string()));
        }
        if self.find_service(&self.page_priced_service).is_none() {
            return Err(CatalogError::Validation(format!(
                "page_priced_service `{}` does not resolve to a service",
                self.page_priced_service.0
            )));
        }

        Ok(())
    }
}

fn service(id: &str, label: &str, base_price: i64) -> ServiceOption {
    ServiceOption { id: ServiceId(id.to_string()), label: label.to_string(), base_price }
}

fn feature(id: &str, label: &str, price: i64) -> FeatureOption {
    FeatureOption { id: FeatureId(id.to_string()), label: label.to_string(), price }
}

fn timeline(id: &str, label: &str, multiplier: Decimal) -> TimelineOption {
    TimelineOption { id: TimelineId(id.to_string()), label: label.to_string(), multiplier }
}

fn check_unique<'a>(
    section: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = std::collections::BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::Validation(format!(
                "duplicate id `{id}` in catalog {section}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CatalogError, PricingCatalog, ServiceId, TimelineId};

    #[test]
    fn reference_catalog_passes_validation() {
        PricingCatalog::reference().validate().expect("reference catalog must be valid");
    }

    #[test]
    fn reference_catalog_resolves_known_ids() {
        let catalog = PricingCatalog::reference();

        let websites = catalog
            .find_service(&ServiceId("websites".to_string()))
            .expect("websites service exists");
        assert_eq!(websites.base_price, 249_900);

        let rush =
            catalog.find_timeline(&TimelineId("rush".to_string())).expect("rush timeline exists");
        assert_eq!(rush.multiplier, Decimal::new(150, 2));

        assert!(catalog.find_service(&ServiceId("podcasts".to_string())).is_none());
    }

    #[test]
    fn catalog_loads_from_toml() {
        let catalog = PricingCatalog::from_toml_str(
            r#"
currency = "INR"
per_page_rate = 10000
included_pages = 3
page_priced_service = "sites"

[[services]]
id = "sites"
label = "Sites"
base_price = 100000

[[features]]
id = "forms"
label = "Forms"
price = 20000

[[timelines]]
id = "standard"
label = "Standard"
multiplier = "1.0"

[[timelines]]
id = "rush"
label = "Rush"
multiplier = "1.5"
"#,
        )
        .expect("catalog should parse");

        assert_eq!(catalog.included_pages, 3);
        assert_eq!(
            catalog
                .find_timeline(&TimelineId("rush".to_string()))
                .expect("rush timeline")
                .multiplier,
            Decimal::new(15, 1)
        );
    }

    #[test]
    fn missing_standard_timeline_is_rejected() {
        let mut catalog = PricingCatalog::reference();
        catalog.timelines.retain(|option| option.id.0 != "standard");

        let error = catalog.validate().expect_err("must require a standard timeline");
        assert!(matches!(
            error,
            CatalogError::Validation(ref message) if message.contains("standard")
        ));
    }

    #[test]
    fn discounted_standard_multiplier_is_rejected() {
        let mut catalog = PricingCatalog::reference();
        for option in &mut catalog.timelines {
            if option.id.0 == "standard" {
                option.multiplier = Decimal::new(90, 2);
            }
        }

        assert!(catalog.validate().is_err());
    }

    #[test]
    fn duplicate_service_ids_are_rejected() {
        let mut catalog = PricingCatalog::reference();
        let duplicate = catalog.services[0].clone();
        catalog.services.push(duplicate);

        let error = catalog.validate().expect_err("duplicates must be rejected");
        assert!(matches!(
            error,
            CatalogError::Validation(ref message) if message.contains("duplicate")
        ));
    }

    #[test]
    fn unresolved_page_priced_service_is_rejected() {
        let mut catalog = PricingCatalog::reference();
        catalog.page_priced_service = ServiceId("missing".to_string());

        assert!(catalog.validate().is_err());
    }
}
