use serde_json::{json, Value};

use webforge_core::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink};
use webforge_core::booking::ContactDetails;
use webforge_core::errors::{ApplicationError, DomainError};
use webforge_core::pricing::{EstimateEngine, QuoteEstimate, QuoteSelection};
use webforge_core::validation::validate_contact;

use crate::functions::FunctionGateway;

pub const QUOTE_CREATE_FUNCTION: &str = "quote-create";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteRequest {
    pub selection: QuoteSelection,
    pub contact: ContactDetails,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteReceipt {
    pub estimate: QuoteEstimate,
    pub response: Value,
}

/// The quote submission flow: estimate for display, then forward the
/// full selection with contact fields to the `quote-create` endpoint.
/// The desk never formats money; totals stay in minor units.
pub struct QuoteDesk<G, E, A> {
    gateway: G,
    engine: E,
    audit: A,
    correlation_id: String,
}

impl<G, E, A> QuoteDesk<G, E, A>
where
    G: FunctionGateway,
    E: EstimateEngine,
    A: AuditSink,
{
    pub fn new(gateway: G, engine: E, audit: A, correlation_id: impl Into<String>) -> Self {
        Self { gateway, engine, audit, correlation_id: correlation_id.into() }
    }

    /// The display estimate, recomputed on every selection change.
    pub fn preview(&self, selection: &QuoteSelection) -> Result<QuoteEstimate, DomainError> {
        let estimate = self.engine.estimate(selection)?;
        self.audit.emit(
            AuditEvent::new(
                None,
                self.correlation_id.clone(),
                "quote.estimate_computed",
                AuditCategory::Pricing,
                "quote-desk",
                AuditOutcome::Success,
            )
            .with_metadata("service", selection.service.0.clone())
            .with_metadata("total", estimate.total.to_string()),
        );
        Ok(estimate)
    }

    /// Validates, estimates, and forwards. A gateway failure surfaces as
    /// `ApplicationError::Remote`; the caller keeps the selection and can
    /// resubmit unchanged.
    pub async fn submit(&self, request: &QuoteRequest) -> Result<QuoteReceipt, ApplicationError> {
        validate_contact(&request.contact).map_err(DomainError::from)?;
        let estimate = self.engine.estimate(&request.selection).map_err(DomainError::from)?;

        let body = json!({
            "selection": request.selection,
            "contact": request.contact,
            "estimate": estimate,
        });

        match self.gateway.invoke(QUOTE_CREATE_FUNCTION, body).await {
            Ok(response) => {
                self.audit.emit(
                    AuditEvent::new(
                        None,
                        self.correlation_id.clone(),
                        "quote.submitted",
                        AuditCategory::Remote,
                        "quote-desk",
                        AuditOutcome::Success,
                    )
                    .with_metadata("total", estimate.total.to_string()),
                );
                Ok(QuoteReceipt { estimate, response })
            }
            Err(error) => {
                self.audit.emit(
                    AuditEvent::new(
                        None,
                        self.correlation_id.clone(),
                        "quote.submit_failed",
                        AuditCategory::Remote,
                        "quote-desk",
                        AuditOutcome::Failed,
                    )
                    .with_metadata("error", error.to_string()),
                );
                Err(ApplicationError::Remote(error.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use webforge_core::audit::InMemoryAuditSink;
    use webforge_core::booking::ContactDetails;
    use webforge_core::catalog::{FeatureId, PricingCatalog, ServiceId, TimelineId};
    use webforge_core::errors::{ApplicationError, DomainError};
    use webforge_core::pricing::{DeterministicEstimateEngine, QuoteSelection};

    use crate::memory::InMemoryGateway;

    use super::{QuoteDesk, QuoteRequest, QUOTE_CREATE_FUNCTION};

    fn desk() -> QuoteDesk<InMemoryGateway, DeterministicEstimateEngine, InMemoryAuditSink> {
        QuoteDesk::new(
            InMemoryGateway::default(),
            DeterministicEstimateEngine::new(PricingCatalog::reference()),
            InMemoryAuditSink::default(),
            "req-7",
        )
    }

    fn selection() -> QuoteSelection {
        QuoteSelection {
            service: ServiceId("websites".to_string()),
            features: ["cms", "seo"]
                .iter()
                .map(|id| FeatureId(id.to_string()))
                .collect::<BTreeSet<_>>(),
            page_count: Some(10),
            timeline: TimelineId("rush".to_string()),
        }
    }

    fn contact() -> ContactDetails {
        ContactDetails {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
            company: Some("Compilers Ltd".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn submit_forwards_selection_contact_and_estimate() {
        let desk = desk();
        desk.gateway.respond_with(QUOTE_CREATE_FUNCTION, json!({"quote_ref": "Q-2026-0101"})).await;

        let receipt = desk
            .submit(&QuoteRequest { selection: selection(), contact: contact() })
            .await
            .expect("submission succeeds");

        assert_eq!(receipt.estimate.total, 652_350);
        assert_eq!(receipt.response["quote_ref"], "Q-2026-0101");

        let calls = desk.gateway.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, QUOTE_CREATE_FUNCTION);
        assert_eq!(calls[0].1["estimate"]["total"], 652_350);
        assert_eq!(calls[0].1["contact"]["email"], "grace@example.com");
        assert_eq!(calls[0].1["selection"]["page_count"], 10);
    }

    #[tokio::test]
    async fn preview_is_pure_and_repeatable() {
        let desk = desk();
        let first = desk.preview(&selection()).expect("first preview");
        let second = desk.preview(&selection()).expect("second preview");

        assert_eq!(first, second);
        assert_eq!(first.total, 652_350);
        assert!(desk.gateway.calls().await.is_empty(), "preview must not touch the gateway");
    }

    #[tokio::test]
    async fn invalid_contact_never_reaches_the_gateway() {
        let desk = desk();
        let error = desk
            .submit(&QuoteRequest {
                selection: selection(),
                contact: ContactDetails::default(),
            })
            .await
            .expect_err("validation must fail");

        assert!(matches!(error, ApplicationError::Domain(DomainError::Validation(_))));
        assert!(desk.gateway.calls().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_service_is_a_domain_error() {
        let desk = desk();
        let mut bad_selection = selection();
        bad_selection.service = ServiceId("timetravel".to_string());

        let error = desk
            .submit(&QuoteRequest { selection: bad_selection, contact: contact() })
            .await
            .expect_err("unknown service");

        assert!(matches!(error, ApplicationError::Domain(DomainError::Estimate(_))));
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_as_remote_error() {
        let desk = desk();
        desk.gateway.fail_next_with("edge function unreachable").await;

        let error = desk
            .submit(&QuoteRequest { selection: selection(), contact: contact() })
            .await
            .expect_err("gateway down");

        assert!(matches!(error, ApplicationError::Remote(_)));
    }
}
