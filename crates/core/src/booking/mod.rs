pub mod engine;
pub mod schedule;
pub mod states;

pub use engine::{transition, BookingTransitionError};
pub use schedule::{is_weekend, ScheduleError, SchedulingWindow, DEFAULT_WINDOW_DAYS};
pub use states::{
    BookingAction, BookingDraft, BookingEvent, ContactDetails, MeetingTypeId, TimeSlot,
    TransitionOutcome, WizardStep,
};
