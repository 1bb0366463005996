//! Spreadsheet plumbing for bookly.
//!
//! Two storage surfaces exist: the price list spreadsheet, read worksheet by
//! worksheet into [`bookly_core::PriceTable`] values, and the booking
//! spreadsheet, which only ever receives appended rows. Both go through the
//! [`SheetStore`] trait so business logic stays testable without network
//! access.

pub mod client;
pub mod store;

pub use client::GoogleSheetsClient;
pub use store::{AppendRecord, InMemorySheetStore, SheetStore, StoreError};
