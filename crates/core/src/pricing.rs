use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{FeatureId, PricingCatalog, ServiceId, TimelineId};

/// Everything the estimate depends on, rebuilt from UI state on each
/// recompute. Feature selection is a set: an id can be applied at most
/// once no matter how the caller assembled it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSelection {
    pub service: ServiceId,
    pub features: BTreeSet<FeatureId>,
    pub page_count: Option<u32>,
    pub timeline: TimelineId,
}

/// The computed estimate and its display decomposition, all in minor
/// currency units.
///
/// Invariant: `total == round((base + feature_total + page_overage) * factor)`
/// with rounding applied exactly once, after the multiplier, and
/// `timeline_surcharge == total - (base + feature_total + page_overage)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEstimate {
    pub total: i64,
    pub base: i64,
    pub feature_total: i64,
    pub page_overage: i64,
    pub timeline_surcharge: i64,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EstimateError {
    #[error("unknown service {service:?}")]
    UnknownService { service: ServiceId },
}

pub trait EstimateEngine: Send + Sync {
    fn estimate(&self, selection: &QuoteSelection) -> Result<QuoteEstimate, EstimateError>;
}

/// Engine over an injected catalog. Stateless beyond the catalog, so it
/// is safe to call on every input change.
pub struct DeterministicEstimateEngine {
    catalog: PricingCatalog,
}

impl DeterministicEstimateEngine {
    pub fn new(catalog: PricingCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }
}

impl EstimateEngine for DeterministicEstimateEngine {
    fn estimate(&self, selection: &QuoteSelection) -> Result<QuoteEstimate, EstimateError> {
        estimate_selection(&self.catalog, selection)
    }
}

/// Computes the estimate for a selection against a catalog.
///
/// Pricing rules, in order: service base price (an unknown service id is
/// the one hard failure), flat feature surcharges (unknown feature ids
/// are skipped so a stale selection keeps estimating), per-page overage
/// beyond the included pages for the catalog's page-priced service only,
/// then the timeline multiplier (an unknown timeline id prices as
/// standard). Rounding is round-half-away-from-zero, applied once to the
/// multiplied subtotal.
pub fn estimate_selection(
    catalog: &PricingCatalog,
    selection: &QuoteSelection,
) -> Result<QuoteEstimate, EstimateError> {
    let base = catalog
        .find_service(&selection.service)
        .ok_or_else(|| EstimateError::UnknownService { service: selection.service.clone() })?
        .base_price;

    let feature_total: i64 = selection
        .features
        .iter()
        .filter_map(|id| catalog.find_feature(id))
        .map(|feature| feature.price)
        .sum();

    let page_overage = match selection.page_count {
        Some(pages)
            if selection.service == catalog.page_priced_service
                && pages > catalog.included_pages =>
        {
            i64::from(pages - catalog.included_pages) * catalog.per_page_rate
        }
        _ => 0,
    };

    let subtotal = base + feature_total + page_overage;
    let factor = catalog
        .find_timeline(&selection.timeline)
        .map(|timeline| timeline.multiplier)
        .unwrap_or(Decimal::ONE);

    let total = round_minor(Decimal::from(subtotal) * factor);

    Ok(QuoteEstimate {
        total,
        base,
        feature_total,
        page_overage,
        timeline_surcharge: total - subtotal,
    })
}

fn round_minor(amount: Decimal) -> i64 {
    // Validated catalogs bound the factor, so the product always fits an
    // i64; saturate rather than wrap on a pathological catalog.
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero).to_i64().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use crate::catalog::{FeatureId, PricingCatalog, ServiceId, TimelineId};

    use super::{estimate_selection, DeterministicEstimateEngine, EstimateEngine, EstimateError, QuoteSelection};

    fn selection(service: &str, features: &[&str], pages: Option<u32>, timeline: &str) -> QuoteSelection {
        QuoteSelection {
            service: ServiceId(service.to_string()),
            features: features.iter().map(|id| FeatureId(id.to_string())).collect(),
            page_count: pages,
            timeline: TimelineId(timeline.to_string()),
        }
    }

    #[test]
    fn websites_with_features_pages_and_rush_timeline() {
        let catalog = PricingCatalog::reference();
        let estimate = estimate_selection(
            &catalog,
            &selection("websites", &["cms", "seo"], Some(10), "rush"),
        )
        .expect("estimate");

        assert_eq!(estimate.base, 249_900);
        assert_eq!(estimate.feature_total, 110_000);
        assert_eq!(estimate.page_overage, 75_000);
        assert_eq!(estimate.total, 652_350);
        assert_eq!(estimate.timeline_surcharge, 652_350 - 434_900);
    }

    #[test]
    fn maintenance_with_standard_timeline_is_base_price_only() {
        let catalog = PricingCatalog::reference();
        let estimate = estimate_selection(&catalog, &selection("maintenance", &[], None, "standard"))
            .expect("estimate");

        assert_eq!(estimate.total, 19_900);
        assert_eq!(estimate.feature_total, 0);
        assert_eq!(estimate.page_overage, 0);
        assert_eq!(estimate.timeline_surcharge, 0);
    }

    #[test]
    fn repeated_calls_return_identical_estimates() {
        let catalog = PricingCatalog::reference();
        let input = selection("ecommerce", &["seo", "chat"], Some(12), "express");

        let first = estimate_selection(&catalog, &input).expect("first estimate");
        let second = estimate_selection(&catalog, &input).expect("second estimate");

        assert_eq!(first, second);
    }

    #[test]
    fn unknown_service_fails() {
        let catalog = PricingCatalog::reference();
        let error = estimate_selection(&catalog, &selection("hologram", &[], None, "standard"))
            .expect_err("unknown service must fail");

        assert!(matches!(error, EstimateError::UnknownService { ref service } if service.0 == "hologram"));
    }

    #[test]
    fn unknown_feature_ids_are_ignored() {
        let catalog = PricingCatalog::reference();
        let with_stale = estimate_selection(
            &catalog,
            &selection("websites", &["cms", "retired-addon"], None, "standard"),
        )
        .expect("estimate with stale feature id");
        let without = estimate_selection(&catalog, &selection("websites", &["cms"], None, "standard"))
            .expect("estimate without stale feature id");

        assert_eq!(with_stale, without);
    }

    #[test]
    fn duplicate_feature_ids_collapse_to_one_charge() {
        let catalog = PricingCatalog::reference();
        let features: BTreeSet<FeatureId> = ["seo", "seo", "seo"]
            .iter()
            .map(|id| FeatureId(id.to_string()))
            .collect();
        assert_eq!(features.len(), 1);

        let estimate = estimate_selection(
            &catalog,
            &QuoteSelection {
                service: ServiceId("websites".to_string()),
                features,
                page_count: None,
                timeline: TimelineId("standard".to_string()),
            },
        )
        .expect("estimate");

        assert_eq!(estimate.feature_total, 60_000);
    }

    #[test]
    fn adding_a_feature_moves_only_the_feature_total() {
        let catalog = PricingCatalog::reference();
        let smaller = estimate_selection(&catalog, &selection("websites", &["cms"], Some(8), "standard"))
            .expect("smaller estimate");
        let larger = estimate_selection(
            &catalog,
            &selection("websites", &["cms", "analytics"], Some(8), "standard"),
        )
        .expect("larger estimate");

        assert_eq!(larger.feature_total - smaller.feature_total, 25_000);
        assert_eq!(larger.base, smaller.base);
        assert_eq!(larger.page_overage, smaller.page_overage);
    }

    #[test]
    fn page_overage_starts_above_the_included_pages() {
        let catalog = PricingCatalog::reference();

        for pages in [0, 1, 5] {
            let estimate =
                estimate_selection(&catalog, &selection("websites", &[], Some(pages), "standard"))
                    .expect("estimate");
            assert_eq!(estimate.page_overage, 0, "no overage at {pages} pages");
        }

        let six = estimate_selection(&catalog, &selection("websites", &[], Some(6), "standard"))
            .expect("estimate");
        assert_eq!(six.page_overage, 15_000);

        let thirty = estimate_selection(&catalog, &selection("websites", &[], Some(30), "standard"))
            .expect("estimate");
        assert_eq!(thirty.page_overage, 25 * 15_000);
    }

    #[test]
    fn page_count_is_ignored_for_other_services() {
        let catalog = PricingCatalog::reference();
        let estimate = estimate_selection(&catalog, &selection("ecommerce", &[], Some(40), "standard"))
            .expect("estimate");

        assert_eq!(estimate.page_overage, 0);
        assert_eq!(estimate.total, 499_900);
    }

    #[test]
    fn unknown_timeline_prices_as_standard() {
        let catalog = PricingCatalog::reference();
        let unknown = estimate_selection(&catalog, &selection("websites", &["seo"], None, "yesterday"))
            .expect("estimate with unknown timeline");
        let standard = estimate_selection(&catalog, &selection("websites", &["seo"], None, "standard"))
            .expect("estimate with standard timeline");

        assert_eq!(unknown, standard);
        assert_eq!(unknown.timeline_surcharge, 0);
    }

    #[test]
    fn total_never_drops_below_the_service_base_price() {
        let catalog = PricingCatalog::reference();
        for service in ["websites", "ecommerce", "webapps", "dashboards", "maintenance"] {
            for timeline in ["standard", "express", "rush"] {
                let estimate = estimate_selection(
                    &catalog,
                    &selection(service, &["cms"], Some(9), timeline),
                )
                .expect("estimate");
                assert!(
                    estimate.total >= estimate.base,
                    "{service}/{timeline} dropped below base"
                );
            }
        }
    }

    #[test]
    fn rounding_is_half_away_from_zero_and_applied_once() {
        let mut catalog = PricingCatalog::reference();
        // 1.0001 * 15000 = 15001.5, which must round up to 15002.
        catalog.timelines.push(crate::catalog::TimelineOption {
            id: TimelineId("sliver".to_string()),
            label: "Sliver".to_string(),
            multiplier: Decimal::new(10_001, 4),
        });
        catalog.services.push(crate::catalog::ServiceOption {
            id: ServiceId("tiny".to_string()),
            label: "Tiny".to_string(),
            base_price: 15_000,
        });

        let estimate = estimate_selection(&catalog, &selection("tiny", &[], None, "sliver"))
            .expect("estimate");

        assert_eq!(estimate.total, 15_002);
        assert_eq!(estimate.timeline_surcharge, 2);
    }

    #[test]
    fn engine_trait_delegates_to_the_injected_catalog() {
        let engine = DeterministicEstimateEngine::new(PricingCatalog::reference());
        let estimate = engine
            .estimate(&selection("websites", &["cms", "seo"], Some(10), "rush"))
            .expect("estimate via trait");

        assert_eq!(estimate.total, 652_350);
        assert_eq!(engine.catalog().currency, "INR");
    }
}
