use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bookly_core::config::SheetsConfig;

use crate::store::{SheetStore, StoreError};

/// Google Sheets v4 `values` client. Reads use plain GET, bookings use the
/// `:append` endpoint with `USER_ENTERED` input so Sheets keeps its own
/// number and date coercion.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    base_url: String,
    access_token: SecretString,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: [&'a [String]; 1],
}

impl GoogleSheetsClient {
    pub fn new(config: &SheetsConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!("{}/{}/values/{}", self.base_url, spreadsheet_id, range)
    }

    async fn check(response: reqwest::Response, range: &str) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api { status: status.as_u16(), range: range.to_string(), body })
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        debug!(event_name = "sheets.read_range", range, "reading spreadsheet range");

        let response = self
            .http
            .get(self.values_url(spreadsheet_id, range))
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await?;
        let response = Self::check(response, range).await?;

        let value_range: ValueRange = response.json().await.map_err(|err| StoreError::Decode {
            range: range.to_string(),
            reason: err.to_string(),
        })?;

        Ok(value_range.values)
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), StoreError> {
        debug!(
            event_name = "sheets.append_row",
            range,
            columns = row.len(),
            "appending booking row"
        );

        let url = format!("{}:append", self.values_url(spreadsheet_id, range));
        let response = self
            .http
            .post(url)
            .query(&[("valueInputOption", "USER_ENTERED"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(self.access_token.expose_secret())
            .json(&AppendBody { values: [row.as_slice()] })
            .send()
            .await?;
        Self::check(response, range).await?;

        Ok(())
    }
}
