use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("spreadsheet request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("spreadsheet API returned {status} for range `{range}`: {body}")]
    Api { status: u16, range: String, body: String },
    #[error("could not decode spreadsheet response for range `{range}`: {reason}")]
    Decode { range: String, reason: String },
}

/// Storage seam for both spreadsheets. `read_range` serves the price list,
/// `append_row` serves the booking sheet; implementations must treat each
/// call as independent (no caching between calls).
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError>;

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendRecord {
    pub spreadsheet_id: String,
    pub range: String,
    pub row: Vec<String>,
}

/// Test double backed by worksheet-name fixtures and an append log.
#[derive(Debug, Default)]
pub struct InMemorySheetStore {
    worksheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    appends: Mutex<Vec<AppendRecord>>,
}

impl InMemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worksheet(
        self,
        worksheet: impl Into<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        self.set_worksheet(worksheet, rows);
        self
    }

    pub fn set_worksheet(&self, worksheet: impl Into<String>, rows: Vec<Vec<String>>) {
        let mut worksheets = self.worksheets.lock().unwrap_or_else(|e| e.into_inner());
        worksheets.insert(worksheet.into(), rows);
    }

    pub fn appended(&self) -> Vec<AppendRecord> {
        let appends = self.appends.lock().unwrap_or_else(|e| e.into_inner());
        appends.clone()
    }
}

fn worksheet_name(range: &str) -> &str {
    range.split('!').next().unwrap_or(range)
}

#[async_trait]
impl SheetStore for InMemorySheetStore {
    async fn read_range(
        &self,
        _spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let worksheets = self.worksheets.lock().unwrap_or_else(|e| e.into_inner());
        Ok(worksheets.get(worksheet_name(range)).cloned().unwrap_or_default())
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), StoreError> {
        let mut appends = self.appends.lock().unwrap_or_else(|e| e.into_inner());
        appends.push(AppendRecord {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            row,
        });
        Ok(())
    }
}
