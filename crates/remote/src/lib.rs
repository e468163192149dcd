pub mod booking_desk;
pub mod functions;
pub mod memory;
pub mod quote_desk;
pub mod rest;
pub mod store;

pub use booking_desk::BookingDesk;
pub use functions::{FunctionGateway, GatewayError};
pub use memory::{InMemoryGateway, InMemoryStore};
pub use quote_desk::{QuoteDesk, QuoteReceipt, QuoteRequest, QUOTE_CREATE_FUNCTION};
pub use rest::RestBackend;
pub use store::{DataStore, Filter, Ordering, Row, StoreError};
