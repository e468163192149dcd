use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::schedule::{ScheduleError, SchedulingWindow};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeetingTypeId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot(pub String);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub notes: Option<String>,
}

/// Transient wizard state. Nothing is persisted until the terminal
/// insert succeeds; a reset discards every field and issues a fresh
/// idempotency key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub meeting_type: Option<MeetingTypeId>,
    pub date: Option<NaiveDate>,
    pub slot: Option<TimeSlot>,
    pub contact: ContactDetails,
    /// Sent with the booking row so the backend can deduplicate a retry
    /// after a lost response. One key per draft.
    pub idempotency_key: Uuid,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self {
            meeting_type: None,
            date: None,
            slot: None,
            contact: ContactDetails::default(),
            idempotency_key: Uuid::new_v4(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Rejects weekend, past, and out-of-window dates; the calendar
    /// selection stays empty on rejection.
    pub fn set_date(
        &mut self,
        date: NaiveDate,
        window: &SchedulingWindow,
    ) -> Result<(), ScheduleError> {
        window.check(date)?;
        self.date = Some(date);
        Ok(())
    }

    pub fn has_schedule(&self) -> bool {
        self.date.is_some() && self.slot.is_some()
    }

    pub fn missing_schedule_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date".to_string());
        }
        if self.slot.is_none() {
            missing.push("time_slot".to_string());
        }
        missing
    }
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// The wizard's four steps, strictly ordered. `Confirmed` is terminal
/// except for an explicit restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStep {
    SelectType,
    SelectSchedule,
    EnterContact,
    Confirmed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingEvent {
    TypeConfirmed,
    Back,
    ScheduleConfirmed,
    SubmitSucceeded,
    SubmitFailed,
    Restart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingAction {
    ResetDraft,
    SurfaceError,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: WizardStep,
    pub to: WizardStep,
    pub event: BookingEvent,
    pub actions: Vec<BookingAction>,
}
