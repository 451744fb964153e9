//! Thin transport over the Google Sheets v4 values API.
//!
//! Only three calls are needed: read one row, read the whole sheet (to count
//! rows), and overwrite a range. Every call hits the network; nothing is cached.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use sheetwriter_shared::{Result, Secret, SheetAccess, SheetSettings, SheetWriterError, cell_to_string};

/// User-Agent string for Sheets requests.
const USER_AGENT: &str = concat!("SheetWriter/", env!("CARGO_PKG_VERSION"));

/// A `ValueRange` as returned (and accepted) by the values API.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    /// Omitted by the API when the range is empty.
    #[serde(default)]
    values: Vec<Vec<Value>>,
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
struct SheetProperties {
    title: String,
}

/// Handle to one tab of one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    sheet_title: String,
    token: Secret,
}

impl SheetsClient {
    /// Open the spreadsheet. When no tab name is configured the first tab's
    /// title is looked up once here.
    #[instrument(skip_all, fields(spreadsheet = %access.spreadsheet_id))]
    pub async fn connect(access: &SheetAccess, settings: &SheetSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| SheetWriterError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            SheetWriterError::config(format!("invalid sheets base_url {:?}: {e}", settings.base_url))
        })?;

        let mut this = Self {
            client,
            base_url,
            spreadsheet_id: access.spreadsheet_id.clone(),
            sheet_title: settings.sheet_name.clone().unwrap_or_default(),
            token: access.access_token.clone(),
        };

        if this.sheet_title.is_empty() {
            this.sheet_title = this.first_sheet_title().await?;
        }

        info!(
            sheet = %this.sheet_title,
            account = %access.service_account.client_email,
            "connected to spreadsheet"
        );
        Ok(this)
    }

    /// Title of the tab this client addresses.
    pub fn sheet_title(&self) -> &str {
        &self.sheet_title
    }

    /// Values of one row (1-based). Trailing empty cells are absent.
    #[instrument(skip(self))]
    pub async fn row_values(&self, row: u32) -> Result<Vec<String>> {
        let range = self.range(&format!("A{row}:{row}"));
        let values = self.get_range(&range).await?;
        Ok(values
            .into_iter()
            .next()
            .map(|cells| cells.iter().map(cell_to_string).collect())
            .unwrap_or_default())
    }

    /// Every populated row of the sheet, up to the last non-empty one.
    #[instrument(skip(self))]
    pub async fn get_all_values(&self) -> Result<Vec<Vec<String>>> {
        let range = self.range_all();
        let values = self.get_range(&range).await?;
        Ok(values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    /// Overwrite `a1_range` (relative to this tab) with `values`, row-major.
    /// Values are stored as given, not parsed as formulas.
    #[instrument(skip(self, values), fields(rows = values.len()))]
    pub async fn update(&self, a1_range: &str, values: Vec<Vec<Value>>) -> Result<()> {
        let range = self.range(a1_range);
        let mut url = self.values_url(&range);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = ValueRange {
            range: Some(range.clone()),
            major_dimension: Some("ROWS".into()),
            values,
        };

        let response = self
            .client
            .put(url)
            .bearer_auth(self.token.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetWriterError::Network(format!("sheets update {range}: {e}")))?;

        check_status(response).await?;
        debug!(%range, "range updated");
        Ok(())
    }

    /// Value of a single cell, `None` when empty.
    pub async fn acell(&self, a1: &str) -> Result<Option<String>> {
        let values = self.get_range(&self.range(a1)).await?;
        Ok(values
            .first()
            .and_then(|row| row.first())
            .map(cell_to_string)
            .filter(|v| !v.is_empty()))
    }

    async fn get_range(&self, range: &str) -> Result<Vec<Vec<Value>>> {
        let url = self.values_url(range);

        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| SheetWriterError::Network(format!("sheets read {range}: {e}")))?;

        let body: ValueRange = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SheetWriterError::Sheets(format!("malformed values response: {e}")))?;

        Ok(body.values)
    }

    async fn first_sheet_title(&self) -> Result<String> {
        let mut url = self.spreadsheet_url();
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| SheetWriterError::Network(format!("sheets metadata: {e}")))?;

        let meta: SpreadsheetMeta = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SheetWriterError::Sheets(format!("malformed metadata response: {e}")))?;

        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| SheetWriterError::Sheets("spreadsheet has no sheets".into()))
    }

    /// Prefix an A1 range with the quoted tab title.
    fn range(&self, a1: &str) -> String {
        format!("{}!{a1}", self.range_all())
    }

    /// The whole tab. The API clamps this to the tab's grid, whatever its size.
    fn range_all(&self) -> String {
        format!("'{}'", self.sheet_title.replace('\'', "''"))
    }

    fn spreadsheet_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()]);
        }
        url
    }

    fn values_url(&self, range: &str) -> Url {
        let mut url = self.spreadsheet_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(["values", range]);
        }
        url
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SheetWriterError::api("sheets", status.as_u16(), body))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sheetwriter_shared::ServiceAccountInfo;
    use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn access() -> SheetAccess {
        SheetAccess {
            service_account: ServiceAccountInfo {
                client_email: "bot@demo.iam.gserviceaccount.com".into(),
                project_id: None,
            },
            access_token: Secret::new("test-token"),
            spreadsheet_id: "sheet-123".into(),
        }
    }

    fn settings(server: &MockServer, sheet_name: Option<&str>) -> SheetSettings {
        SheetSettings {
            base_url: server.uri(),
            sheet_name: sheet_name.map(String::from),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn connect_resolves_first_sheet_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-123"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sheets": [
                    {"properties": {"title": "Prompts"}},
                    {"properties": {"title": "Archive"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SheetsClient::connect(&access(), &settings(&server, None))
            .await
            .unwrap();
        assert_eq!(client.sheet_title(), "Prompts");
    }

    #[tokio::test]
    async fn row_values_converts_cells_to_strings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Sheet1!A2:Z2",
                "majorDimension": "ROWS",
                "values": [["investigate X", 42]]
            })))
            .mount(&server)
            .await;

        let client = SheetsClient::connect(&access(), &settings(&server, Some("Sheet1")))
            .await
            .unwrap();
        let row = client.row_values(2).await.unwrap();
        assert_eq!(row, vec!["investigate X".to_string(), "42".to_string()]);
    }

    #[tokio::test]
    async fn empty_range_reads_as_no_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Sheet1!A1:Z1000",
                "majorDimension": "ROWS"
            })))
            .mount(&server)
            .await;

        let client = SheetsClient::connect(&access(), &settings(&server, Some("Sheet1")))
            .await
            .unwrap();
        assert!(client.get_all_values().await.unwrap().is_empty());
        assert!(client.row_values(2).await.unwrap().is_empty());
        assert_eq!(client.acell("B1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn all_values_requests_the_bare_sheet_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-123/values/'Sheet1'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Sheet1!A1:Z1000",
                "majorDimension": "ROWS",
                "values": [["header"], ["investigate", "write"]]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                "Range ('Sheet1'!A:ZZZ) exceeds grid limits. Max rows: 1000, max columns: 26",
            ))
            .mount(&server)
            .await;

        let client = SheetsClient::connect(&access(), &settings(&server, Some("Sheet1")))
            .await
            .unwrap();
        let rows = client.get_all_values().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["investigate".to_string(), "write".to_string()]);
    }

    #[tokio::test]
    async fn update_sends_raw_value_range() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+"))
            .and(query_param("valueInputOption", "RAW"))
            .and(body_partial_json(json!({
                "range": "'Sheet1'!A4:E4",
                "majorDimension": "ROWS",
                "values": [["", "2024-01-01 09:00:00", "findings", "final article", 13]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updatedCells": 5})))
            .expect(1)
            .mount(&server)
            .await;

        let client = SheetsClient::connect(&access(), &settings(&server, Some("Sheet1")))
            .await
            .unwrap();
        client
            .update(
                "A4:E4",
                vec![vec![
                    json!(""),
                    json!("2024-01-01 09:00:00"),
                    json!("findings"),
                    json!("final article"),
                    json!(13),
                ]],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let client = SheetsClient::connect(&access(), &settings(&server, Some("Sheet1")))
            .await
            .unwrap();
        let err = client.row_values(2).await.unwrap_err();
        match err {
            SheetWriterError::Api { service, status, body } => {
                assert_eq!(service, "sheets");
                assert_eq!(status, 403);
                assert!(body.contains("PERMISSION_DENIED"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn range_quotes_sheet_title() {
        let client = SheetsClient {
            client: Client::new(),
            base_url: Url::parse("https://sheets.googleapis.com").unwrap(),
            spreadsheet_id: "id".into(),
            sheet_title: "Bob's sheet".into(),
            token: Secret::new("t"),
        };
        assert_eq!(client.range("A2:2"), "'Bob''s sheet'!A2:2");
        assert_eq!(client.range_all(), "'Bob''s sheet'");
        assert_eq!(
            client.spreadsheet_url().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/id"
        );
    }
}
