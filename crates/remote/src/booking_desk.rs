use chrono::NaiveDate;
use serde_json::{json, Value};

use webforge_core::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink};
use webforge_core::booking::{
    transition, BookingAction, BookingDraft, BookingEvent, ContactDetails, MeetingTypeId,
    SchedulingWindow, TimeSlot, TransitionOutcome, WizardStep,
};
use webforge_core::errors::{ApplicationError, DomainError};
use webforge_core::validation::validate_contact;

use crate::store::{DataStore, Row};

/// One booking wizard session: the current step, the draft, and the
/// single remote insert at the end. Nothing is written to the backend
/// until `submit` succeeds; a failed submit holds the session at the
/// contact step with the draft (and its idempotency key) intact.
pub struct BookingDesk<S, A> {
    store: S,
    audit: A,
    table: String,
    window: SchedulingWindow,
    step: WizardStep,
    draft: BookingDraft,
    in_flight: bool,
    correlation_id: String,
}

impl<S, A> BookingDesk<S, A>
where
    S: DataStore,
    A: AuditSink,
{
    pub fn new(
        store: S,
        audit: A,
        window: SchedulingWindow,
        table: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            audit,
            table: table.into(),
            window,
            step: WizardStep::SelectType,
            draft: BookingDraft::new(),
            in_flight: false,
            correlation_id: correlation_id.into(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn choose_meeting_type(&mut self, meeting_type: MeetingTypeId) {
        self.draft.meeting_type = Some(meeting_type);
    }

    pub fn pick_date(&mut self, date: NaiveDate) -> Result<(), DomainError> {
        self.draft.set_date(date, &self.window)?;
        Ok(())
    }

    pub fn pick_slot(&mut self, slot: TimeSlot) {
        self.draft.slot = Some(slot);
    }

    pub fn update_contact(&mut self, contact: ContactDetails) {
        self.draft.contact = contact;
    }

    pub fn confirm_type(&mut self) -> Result<WizardStep, DomainError> {
        self.apply(BookingEvent::TypeConfirmed)
    }

    pub fn confirm_schedule(&mut self) -> Result<WizardStep, DomainError> {
        self.apply(BookingEvent::ScheduleConfirmed)
    }

    pub fn back(&mut self) -> Result<WizardStep, DomainError> {
        self.apply(BookingEvent::Back)
    }

    pub fn restart(&mut self) -> Result<WizardStep, DomainError> {
        self.apply(BookingEvent::Restart)
    }

    /// The terminal transition. Validation failures and remote failures
    /// both leave the wizard at `EnterContact` with the draft retained;
    /// only a successful insert advances to `Confirmed`.
    pub async fn submit(&mut self) -> Result<WizardStep, ApplicationError> {
        if self.in_flight {
            return Err(ApplicationError::Domain(DomainError::InvariantViolation(
                "booking submission already in flight".to_string(),
            )));
        }

        validate_contact(&self.draft.contact).map_err(DomainError::from)?;
        // Reject early when the wizard is not at the contact step, before
        // anything is sent to the backend.
        transition(self.step, BookingEvent::SubmitSucceeded, &self.draft)
            .map_err(DomainError::from)?;

        self.in_flight = true;
        let inserted = self.store.insert(&self.table, self.draft_row()).await;
        self.in_flight = false;

        match inserted {
            Ok(row) => {
                let step = self.apply(BookingEvent::SubmitSucceeded)?;
                tracing::info!(
                    event_name = "booking.persisted",
                    correlation_id = %self.correlation_id,
                    row_id = %row.get("id").map(|v| v.to_string()).unwrap_or_default(),
                    "booking stored on the backend"
                );
                Ok(step)
            }
            Err(error) => {
                let _ = self.apply(BookingEvent::SubmitFailed)?;
                Err(ApplicationError::Remote(error.to_string()))
            }
        }
    }

    fn apply(&mut self, event: BookingEvent) -> Result<WizardStep, DomainError> {
        let outcome = match transition(self.step, event, &self.draft) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.audit.emit(
                    AuditEvent::new(
                        None,
                        self.correlation_id.clone(),
                        "booking.transition_rejected",
                        AuditCategory::Flow,
                        "booking-desk",
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
                return Err(error.into());
            }
        };

        self.run_actions(&outcome);
        self.audit.emit(
            AuditEvent::new(
                Some(self.draft.idempotency_key.to_string()),
                self.correlation_id.clone(),
                "booking.transition_applied",
                AuditCategory::Flow,
                "booking-desk",
                AuditOutcome::Success,
            )
            .with_metadata("from", format!("{:?}", outcome.from))
            .with_metadata("to", format!("{:?}", outcome.to))
            .with_metadata("event", format!("{:?}", outcome.event)),
        );

        self.step = outcome.to;
        Ok(self.step)
    }

    fn run_actions(&mut self, outcome: &TransitionOutcome) {
        for action in &outcome.actions {
            match action {
                BookingAction::ResetDraft => self.draft.reset(),
                BookingAction::SurfaceError => {
                    tracing::warn!(
                        event_name = "booking.submit_failed",
                        correlation_id = %self.correlation_id,
                        "booking submission failed; draft retained for retry"
                    );
                }
            }
        }
    }

    fn draft_row(&self) -> Row {
        let contact = &self.draft.contact;
        let value = json!({
            "meeting_type": self.draft.meeting_type.as_ref().map(|id| id.0.clone()),
            "date": self.draft.date.map(|date| date.to_string()),
            "time_slot": self.draft.slot.as_ref().map(|slot| slot.0.clone()),
            "first_name": contact.first_name,
            "last_name": contact.last_name,
            "email": contact.email,
            "company": contact.company,
            "notes": contact.notes,
            "idempotency_key": self.draft.idempotency_key.to_string(),
        });

        match value {
            Value::Object(row) => row,
            _ => Row::new(),
        }
    }
}
