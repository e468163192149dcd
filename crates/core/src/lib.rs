pub mod audit;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod pricing;
pub mod validation;

pub use booking::{
    transition, BookingAction, BookingDraft, BookingEvent, BookingTransitionError, ContactDetails,
    MeetingTypeId, ScheduleError, SchedulingWindow, TimeSlot, TransitionOutcome, WizardStep,
};
pub use catalog::{
    CatalogError, FeatureId, FeatureOption, PricingCatalog, ServiceId, ServiceOption, TimelineId,
    TimelineOption,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::{
    estimate_selection, DeterministicEstimateEngine, EstimateEngine, EstimateError, QuoteEstimate,
    QuoteSelection,
};
pub use validation::{validate_contact, FieldError, ValidationError};
