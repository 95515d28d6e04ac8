use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{PortalError, Result};

/// Access to a single worksheet as a grid of string cells.
///
/// Row and column coordinates are 1-based, matching A1 notation.
#[async_trait]
pub trait Worksheet: Send + Sync {
    /// Every populated row, header included, top to bottom.
    async fn all_rows(&self) -> Result<Vec<Vec<String>>>;

    /// Overwrite the header row (row 1) in full.
    async fn write_header(&self, header: &[String]) -> Result<()>;

    /// Append a data row after the last populated row.
    async fn append_row(&self, row: &[String]) -> Result<()>;

    /// Overwrite a single cell.
    async fn write_cell(&self, row: u32, col: u32, value: &str) -> Result<()>;
}

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Cell range read for full-sheet scans.
const DATA_RANGE: &str = "A:ZZ";

/// Worksheet backed by the Google Sheets v4 `values` API.
///
/// Authenticates every call with a pre-issued OAuth bearer token; all writes
/// use `valueInputOption=RAW` so cell values land as typed.
pub struct SheetsApi {
    http: reqwest::Client,
    spreadsheet_id: String,
    token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsApi {
    pub fn new(spreadsheet_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            token: token.into(),
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!("{SHEETS_API_BASE}/{}/values/{range}", self.spreadsheet_id)
    }
}

async fn check_status(op: &'static str, response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let detail = response.text().await.unwrap_or_default();
    Err(PortalError::SheetApi {
        op,
        detail: format!("{status}: {detail}"),
    })
}

#[async_trait]
impl Worksheet for SheetsApi {
    async fn all_rows(&self) -> Result<Vec<Vec<String>>> {
        let response = self
            .http
            .get(self.values_url(DATA_RANGE))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = check_status("read", response).await?;
        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }

    async fn write_header(&self, header: &[String]) -> Result<()> {
        let response = self
            .http
            .put(self.values_url("1:1"))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "values": [header] }))
            .send()
            .await?;
        check_status("header update", response).await?;
        Ok(())
    }

    async fn append_row(&self, row: &[String]) -> Result<()> {
        let response = self
            .http
            .post(format!("{}:append", self.values_url("A1")))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await?;
        check_status("append", response).await?;
        Ok(())
    }

    async fn write_cell(&self, row: u32, col: u32, value: &str) -> Result<()> {
        let cell = format!("{}{row}", column_letter(col));
        let response = self
            .http
            .put(self.values_url(&cell))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "values": [[value]] }))
            .send()
            .await?;
        check_status("cell update", response).await?;
        Ok(())
    }
}

/// Convert a 1-based column index to its A1-notation letters
pub fn column_letter(col: u32) -> String {
    let mut col = col;
    let mut letters = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.push(b'A' + rem);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// In-memory worksheet used by tests.
#[derive(Debug, Default)]
pub struct MemSheet {
    rows: Mutex<Vec<Vec<String>>>,
}

impl MemSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the sheet with existing rows (header first).
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub async fn snapshot(&self) -> Vec<Vec<String>> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl Worksheet for MemSheet {
    async fn all_rows(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.lock().await.clone())
    }

    async fn write_header(&self, header: &[String]) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if rows.is_empty() {
            rows.push(header.to_vec());
        } else {
            rows[0] = header.to_vec();
        }
        Ok(())
    }

    async fn append_row(&self, row: &[String]) -> Result<()> {
        self.rows.lock().await.push(row.to_vec());
        Ok(())
    }

    async fn write_cell(&self, row: u32, col: u32, value: &str) -> Result<()> {
        let row_idx = row.max(1) as usize - 1;
        let col_idx = col.max(1) as usize - 1;
        let mut rows = self.rows.lock().await;
        while rows.len() <= row_idx {
            rows.push(Vec::new());
        }
        let cells = &mut rows[row_idx];
        while cells.len() <= col_idx {
            cells.push(String::new());
        }
        cells[col_idx] = value.to_string();
        Ok(())
    }
}
