use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::info;

use bookly_core::PriceTable;
use bookly_sheets::SheetStore;

use crate::registry::FunctionError;

/// Answers service-policy questions. Implemented by the agent layer against
/// the dedicated policy assistant; test code substitutes a scripted impl.
#[async_trait]
pub trait PolicyResponder: Send + Sync {
    async fn answer(&self, prompt: &str) -> Result<String, FunctionError>;
}

/// Everything handlers need, shared by `Arc` clones captured per closure.
#[derive(Clone)]
pub struct FunctionContext {
    pub store: Arc<dyn SheetStore>,
    pub booking_spreadsheet_id: String,
    pub price_list_spreadsheet_id: String,
    pub policy: Arc<dyn PolicyResponder>,
}

impl FunctionContext {
    pub fn booking(&self) -> BookingWriter {
        BookingWriter {
            store: Arc::clone(&self.store),
            spreadsheet_id: self.booking_spreadsheet_id.clone(),
        }
    }

    pub fn prices(&self) -> PriceBook {
        PriceBook {
            store: Arc::clone(&self.store),
            spreadsheet_id: self.price_list_spreadsheet_id.clone(),
        }
    }
}

/// Appends confirmed bookings to the booking spreadsheet.
#[derive(Clone)]
pub struct BookingWriter {
    store: Arc<dyn SheetStore>,
    spreadsheet_id: String,
}

impl BookingWriter {
    pub async fn append(&self, range: &str, row: Vec<String>) -> Result<(), FunctionError> {
        self.store.append_row(&self.spreadsheet_id, range, row).await?;
        info!(event_name = "booking.saved", range, "booking row appended");
        Ok(())
    }
}

/// Reads price list worksheets into [`PriceTable`] values. Each call fetches
/// fresh data so price edits take effect without a restart.
#[derive(Clone)]
pub struct PriceBook {
    store: Arc<dyn SheetStore>,
    spreadsheet_id: String,
}

impl PriceBook {
    pub async fn table(&self, worksheet: &str) -> Result<PriceTable, FunctionError> {
        let values = self.store.read_range(&self.spreadsheet_id, worksheet).await?;
        Ok(PriceTable::from_values(values))
    }
}

/// Accepts strings, numbers and booleans for free-form fields. The model
/// sends budgets and horsepower as either strings or bare numbers.
pub(crate) fn flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
