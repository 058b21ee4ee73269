// src/sheets/client.rs

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::{a1, CellRef, CellUpdate, SourceError, TabularSource};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// `TabularSource` over the Google Sheets v4 `values` endpoints, bound to one
/// worksheet of one spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
    http: Client,
    base: Url,
    access_token: String,
    spreadsheet_id: String,
    worksheet: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest<'a> {
    value_input_option: &'a str,
    data: Vec<RangeWrite<'a>>,
}

#[derive(Debug, Serialize)]
struct RangeWrite<'a> {
    range: String,
    values: [[&'a str; 1]; 1],
}

impl SheetsClient {
    pub fn new(
        http: Client,
        access_token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            http,
            base: Url::parse(SHEETS_API_BASE)?,
            access_token: access_token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
        })
    }

    /// Point the client at a different API root, e.g. a local stand-in.
    pub fn with_base_url(mut self, base: &str) -> Result<Self, SourceError> {
        self.base = Url::parse(base)?;
        Ok(self)
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    fn endpoint(&self, tail: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .extend(tail);
        Ok(url)
    }

    async fn get_values(&self, range: &str, major_dimension: &str) -> Result<ValueRange, SourceError> {
        let mut url = self.endpoint(&["values", range])?;
        url.query_pairs_mut()
            .append_pair("majorDimension", major_dimension);
        debug!(%range, major_dimension, "GET values");

        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Ok(check(resp).await?.json::<ValueRange>().await?)
    }
}

impl TabularSource for SheetsClient {
    async fn find_cells(&self, value: &str) -> Result<Vec<CellRef>, SourceError> {
        let range = a1::quote_sheet(&self.worksheet);
        let grid = self.get_values(&range, "ROWS").await?;
        Ok(find_in_grid(&grid.values, value))
    }

    async fn find_cells_in_row(&self, row: usize, value: &str) -> Result<Vec<CellRef>, SourceError> {
        let range = a1::whole_row(&self.worksheet, row);
        let grid = self.get_values(&range, "ROWS").await?;
        Ok(find_in_grid(&grid.values, value)
            .into_iter()
            .map(|c| CellRef { row: row + c.row - 1, col: c.col })
            .collect())
    }

    async fn column_values(&self, col: usize) -> Result<Vec<String>, SourceError> {
        let range = a1::whole_column(&self.worksheet, col);
        let grid = self.get_values(&range, "COLUMNS").await?;
        Ok(grid
            .values
            .into_iter()
            .next()
            .map(|column| column.iter().map(cell_text).collect())
            .unwrap_or_default())
    }

    async fn write_cells(&self, updates: &[CellUpdate]) -> Result<(), SourceError> {
        let url = self.endpoint(&["values:batchUpdate"])?;
        let body = batch_update_body(&self.worksheet, updates);
        info!(cells = updates.len(), worksheet = %self.worksheet, "batch update");

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

async fn check(resp: Response) -> Result<Response, SourceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SourceError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

/// Pull `error.message` out of a Google API error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn find_in_grid(rows: &[Vec<Value>], needle: &str) -> Vec<CellRef> {
    let mut hits = Vec::new();
    for (r, row) in rows.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            if cell_text(v) == needle {
                hits.push(CellRef { row: r + 1, col: c + 1 });
            }
        }
    }
    hits
}

fn batch_update_body<'a>(sheet: &str, updates: &'a [CellUpdate]) -> BatchUpdateRequest<'a> {
    BatchUpdateRequest {
        value_input_option: "USER_ENTERED",
        data: updates
            .iter()
            .map(|u| RangeWrite {
                range: a1::cell(sheet, u.row, u.col),
                values: [[u.value.as_str()]],
            })
            .collect(),
    }
}
