//! The dispatchable function catalog behind the booking assistant.
//!
//! Every operation the assistant may request by name lives here: booking
//! writers that append a row to the booking spreadsheet, price estimators
//! that read the price list, date validators, and canned advisory replies.
//! All of them return instruction text for the assistant, never raw errors;
//! failures surface as [`FunctionError`] and are handled by the run loop.

pub mod advisories;
pub mod categories;
pub mod context;
pub mod registry;

pub use context::{BookingWriter, FunctionContext, PolicyResponder, PriceBook};
pub use registry::{standard_catalog, FunctionCatalog, FunctionError};
