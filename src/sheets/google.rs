//! Google Sheets v4 REST client
//!
//! Uses `values.get`, `values.update` and a `batchUpdate` that resizes the
//! grid. Requests carry a bearer token read once from the environment.

use super::Worksheet;
use crate::config::SheetsConfig;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Spreadsheet API errors
#[derive(Debug, Error)]
pub enum SheetsError {
    /// The token environment variable is unset or empty
    #[error("spreadsheet token variable {0} is not set")]
    MissingToken(String),
    /// No spreadsheet to write to
    #[error("sheets.spreadsheet_id is empty")]
    MissingSpreadsheet,
    /// No worksheet with this title in the spreadsheet
    #[error("worksheet {0:?} not found")]
    UnknownWorksheet(String),
    /// Non-success HTTP status
    #[error("Sheets API {method} {range} returned {status}: {body}")]
    Status {
        method: &'static str,
        range: String,
        status: StatusCode,
        body: String,
    },
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

/// `updateSheetProperties` request setting the grid to `rows` by `cols`
fn resize_request(sheet_id: i64, rows: usize, cols: usize) -> serde_json::Value {
    json!({
        "requests": [{
            "updateSheetProperties": {
                "properties": {
                    "sheetId": sheet_id,
                    "gridProperties": { "rowCount": rows, "columnCount": cols }
                },
                "fields": "gridProperties(rowCount,columnCount)"
            }
        }]
    })
}

/// Authenticated handle to one spreadsheet
pub struct GoogleSheets {
    client: Client,
    api_url: String,
    spreadsheet_id: String,
    token: String,
}

impl GoogleSheets {
    pub fn new(
        api_url: &str,
        spreadsheet_id: &str,
        token: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        if spreadsheet_id.is_empty() {
            return Err(SheetsError::MissingSpreadsheet.into());
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            token,
        })
    }

    /// Read the token from the configured environment variable
    pub fn from_config(config: &SheetsConfig, timeout: Duration) -> anyhow::Result<Self> {
        let token = std::env::var(&config.access_token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SheetsError::MissingToken(config.access_token_env.clone()))?;
        Self::new(&config.api_url, &config.spreadsheet_id, token, timeout)
    }

    /// Handle to the worksheet titled `title`
    pub fn worksheet(self: &Arc<Self>, title: &str) -> GoogleWorksheet {
        GoogleWorksheet {
            sheets: Arc::clone(self),
            title: title.to_string(),
        }
    }

    /// `{api_url}/v4/spreadsheets/` followed by `segments`
    fn spreadsheets_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("cannot use {} as a base URL", self.api_url))?
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    /// `{api_url}/v4/spreadsheets/{id}/values/{range}`
    fn values_url(&self, range: &str) -> anyhow::Result<Url> {
        self.spreadsheets_url([self.spreadsheet_id.as_str(), "values", range])
    }

    /// `{api_url}/v4/spreadsheets/{id}:batchUpdate`
    fn batch_update_url(&self) -> anyhow::Result<Url> {
        let segment = format!("{}:batchUpdate", self.spreadsheet_id);
        self.spreadsheets_url([segment.as_str()])
    }

    /// Numeric id of the worksheet titled `title`
    async fn sheet_id(&self, title: &str) -> anyhow::Result<i64> {
        let mut url = self.spreadsheets_url([self.spreadsheet_id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let response = self.client.get(url).bearer_auth(&self.token).send().await?;
        let response = ensure_success("GET", title, response).await?;
        let meta: SpreadsheetMeta = response.json().await?;

        meta.sheets
            .into_iter()
            .find(|sheet| sheet.properties.title == title)
            .map(|sheet| sheet.properties.sheet_id)
            .ok_or_else(|| SheetsError::UnknownWorksheet(title.to_string()).into())
    }

    async fn resize_sheet(&self, title: &str, rows: usize, cols: usize) -> anyhow::Result<()> {
        let sheet_id = self.sheet_id(title).await?;
        let response = self
            .client
            .post(self.batch_update_url()?)
            .bearer_auth(&self.token)
            .json(&resize_request(sheet_id, rows, cols))
            .send()
            .await?;
        ensure_success("POST", title, response).await?;
        Ok(())
    }

    async fn get_values(&self, range: &str) -> anyhow::Result<Vec<Vec<String>>> {
        let response = self
            .client
            .get(self.values_url(range)?)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = ensure_success("GET", range, response).await?;
        let body: ValueRange = response.json().await?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn update_values(&self, range: &str, values: Vec<Vec<String>>) -> anyhow::Result<()> {
        let body = ValueUpdate {
            range,
            major_dimension: "ROWS",
            values,
        };
        let response = self
            .client
            .put(self.values_url(range)?)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        ensure_success("PUT", range, response).await?;
        Ok(())
    }
}

/// One worksheet of a [`GoogleSheets`] spreadsheet
pub struct GoogleWorksheet {
    sheets: Arc<GoogleSheets>,
    title: String,
}

impl GoogleWorksheet {
    /// A1 range covering the whole worksheet
    fn range(&self) -> String {
        a1_sheet_range(&self.title)
    }
}

#[async_trait]
impl Worksheet for GoogleWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    async fn get_all_values(&self) -> anyhow::Result<Vec<Vec<String>>> {
        self.sheets.get_values(&self.range()).await
    }

    async fn resize(&self, rows: usize, cols: usize) -> anyhow::Result<()> {
        tracing::debug!(sheet = %self.title, rows, cols, "Resizing worksheet");
        self.sheets.resize_sheet(&self.title, rows, cols).await
    }

    async fn update(&self, grid: Vec<Vec<String>>) -> anyhow::Result<()> {
        tracing::debug!(
            sheet = %self.title,
            rows = grid.len(),
            "Writing worksheet"
        );
        self.sheets.update_values(&self.range(), grid).await
    }
}

/// Quote a sheet title for use as an A1 range
fn a1_sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

async fn ensure_success(
    method: &'static str,
    range: &str,
    response: Response,
) -> Result<Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SheetsError::Status {
        method,
        range: range.to_string(),
        status,
        body,
    })
}
