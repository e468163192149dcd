use thiserror::Error;

use crate::booking::states::{
    BookingAction, BookingDraft, BookingEvent, TransitionOutcome, WizardStep,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BookingTransitionError {
    #[error("a meeting type must be selected before leaving {step:?}")]
    MissingMeetingType { step: WizardStep },
    #[error("schedule is incomplete before transition from {step:?}: {missing:?}")]
    MissingSchedule { step: WizardStep, missing: Vec<String> },
    #[error("invalid transition from {step:?} using event {event:?}")]
    InvalidTransition { step: WizardStep, event: BookingEvent },
}

/// The single transition function for the booking wizard.
///
/// Guards: `TypeConfirmed` needs a selected meeting type,
/// `ScheduleConfirmed` needs both a date and a time slot, and only the
/// submission outcome events can leave `EnterContact`. A failed
/// submission holds the step (draft retained, error surfaced) so the
/// caller can retry the same draft.
pub fn transition(
    current: WizardStep,
    event: BookingEvent,
    draft: &BookingDraft,
) -> Result<TransitionOutcome, BookingTransitionError> {
    use BookingAction::{ResetDraft, SurfaceError};
    use BookingEvent::{
        Back, Restart, ScheduleConfirmed, SubmitFailed, SubmitSucceeded, TypeConfirmed,
    };
    use WizardStep::{Confirmed, EnterContact, SelectSchedule, SelectType};

    let (to, actions) = match (current, event) {
        (SelectType, TypeConfirmed) => {
            if draft.meeting_type.is_none() {
                return Err(BookingTransitionError::MissingMeetingType { step: current });
            }
            (SelectSchedule, Vec::new())
        }
        (SelectSchedule, Back) => (SelectType, Vec::new()),
        (SelectSchedule, ScheduleConfirmed) => {
            if !draft.has_schedule() {
                return Err(BookingTransitionError::MissingSchedule {
                    step: current,
                    missing: draft.missing_schedule_fields(),
                });
            }
            (EnterContact, Vec::new())
        }
        (EnterContact, Back) => (SelectSchedule, Vec::new()),
        (EnterContact, SubmitSucceeded) => (Confirmed, Vec::new()),
        (EnterContact, SubmitFailed) => (EnterContact, vec![SurfaceError]),
        (Confirmed, Restart) => (SelectType, vec![ResetDraft]),
        _ => {
            return Err(BookingTransitionError::InvalidTransition { step: current, event });
        }
    };

    Ok(TransitionOutcome { from: current, to, event, actions })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::booking::states::{
        BookingAction, BookingDraft, BookingEvent, MeetingTypeId, TimeSlot, WizardStep,
    };

    use super::{transition, BookingTransitionError};

    fn draft_with_type() -> BookingDraft {
        let mut draft = BookingDraft::new();
        draft.meeting_type = Some(MeetingTypeId("discovery".to_string()));
        draft
    }

    fn draft_with_schedule() -> BookingDraft {
        let mut draft = draft_with_type();
        draft.date = NaiveDate::from_ymd_opt(2026, 8, 10);
        draft.slot = Some(TimeSlot("10:00".to_string()));
        draft
    }

    #[test]
    fn wizard_walks_forward_through_all_four_steps() {
        let draft = draft_with_schedule();
        let mut step = WizardStep::SelectType;

        step = transition(step, BookingEvent::TypeConfirmed, &draft)
            .expect("select type -> select schedule")
            .to;
        assert_eq!(step, WizardStep::SelectSchedule);

        step = transition(step, BookingEvent::ScheduleConfirmed, &draft)
            .expect("select schedule -> enter contact")
            .to;
        assert_eq!(step, WizardStep::EnterContact);

        step = transition(step, BookingEvent::SubmitSucceeded, &draft)
            .expect("enter contact -> confirmed")
            .to;
        assert_eq!(step, WizardStep::Confirmed);
    }

    #[test]
    fn backward_transitions_walk_to_the_previous_step() {
        let draft = draft_with_schedule();

        let from_contact = transition(WizardStep::EnterContact, BookingEvent::Back, &draft)
            .expect("enter contact -> select schedule");
        assert_eq!(from_contact.to, WizardStep::SelectSchedule);

        let from_schedule = transition(WizardStep::SelectSchedule, BookingEvent::Back, &draft)
            .expect("select schedule -> select type");
        assert_eq!(from_schedule.to, WizardStep::SelectType);
    }

    #[test]
    fn type_confirmation_requires_a_selected_meeting_type() {
        let error = transition(WizardStep::SelectType, BookingEvent::TypeConfirmed, &BookingDraft::new())
            .expect_err("no meeting type selected");
        assert!(matches!(error, BookingTransitionError::MissingMeetingType { .. }));
    }

    #[test]
    fn schedule_confirmation_requires_date_and_slot() {
        let mut draft = draft_with_type();

        let error = transition(WizardStep::SelectSchedule, BookingEvent::ScheduleConfirmed, &draft)
            .expect_err("nothing scheduled");
        assert!(matches!(
            error,
            BookingTransitionError::MissingSchedule { ref missing, .. }
                if missing == &["date", "time_slot"]
        ));

        draft.date = NaiveDate::from_ymd_opt(2026, 8, 10);
        let error = transition(WizardStep::SelectSchedule, BookingEvent::ScheduleConfirmed, &draft)
            .expect_err("slot still missing");
        assert!(matches!(
            error,
            BookingTransitionError::MissingSchedule { ref missing, .. } if missing == &["time_slot"]
        ));
    }

    #[test]
    fn failed_submission_holds_the_step_and_surfaces_the_error() {
        let draft = draft_with_schedule();
        let outcome = transition(WizardStep::EnterContact, BookingEvent::SubmitFailed, &draft)
            .expect("failure is a valid no-advance transition");

        assert_eq!(outcome.to, WizardStep::EnterContact);
        assert_eq!(outcome.actions, vec![BookingAction::SurfaceError]);
    }

    #[test]
    fn confirmed_only_leaves_through_restart() {
        let draft = draft_with_schedule();

        let restart = transition(WizardStep::Confirmed, BookingEvent::Restart, &draft)
            .expect("confirmed -> select type");
        assert_eq!(restart.to, WizardStep::SelectType);
        assert_eq!(restart.actions, vec![BookingAction::ResetDraft]);

        let error = transition(WizardStep::Confirmed, BookingEvent::Back, &draft)
            .expect_err("confirmed has no back transition");
        assert!(matches!(error, BookingTransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn success_event_is_rejected_outside_the_contact_step() {
        let draft = draft_with_schedule();
        for step in [WizardStep::SelectType, WizardStep::SelectSchedule, WizardStep::Confirmed] {
            let error = transition(step, BookingEvent::SubmitSucceeded, &draft)
                .expect_err("success only applies at the contact step");
            assert!(matches!(error, BookingTransitionError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn replay_of_the_same_event_sequence_is_deterministic() {
        let draft = draft_with_schedule();
        let events = [
            BookingEvent::TypeConfirmed,
            BookingEvent::ScheduleConfirmed,
            BookingEvent::SubmitFailed,
            BookingEvent::SubmitSucceeded,
        ];

        let run = || {
            let mut step = WizardStep::SelectType;
            let mut actions = Vec::new();
            for event in events {
                let outcome = transition(step, event, &draft).expect("deterministic run");
                actions.push(outcome.actions);
                step = outcome.to;
            }
            (step, actions)
        };

        assert_eq!(run(), run());
    }
}
