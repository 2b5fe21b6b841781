//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.

use crate::api::{Sheet, SheetRange, TokenProvider};
use crate::config::Spreadsheet;
use crate::error::Res;
use crate::model::column_letter;
use anyhow::{bail, Context};
use serde::Deserialize;
use sheets::types::{
    BatchUpdateValuesRequest, DateTimeRenderOption, Dimension, ValueInputOption, ValueRange,
    ValueRenderOption,
};
use sheets::ClientError;
use tracing::{debug, trace, warn};
use url::Url;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet. It
/// takes a `TokenProvider`, from which it gets a fresh token before each request.
pub(super) struct GoogleSheet {
    spreadsheet_id: String,
    token_provider: TokenProvider,
    client: sheets::Client,
}

impl GoogleSheet {
    /// Opens the spreadsheet. When it is known only by name, the name is looked up in Google
    /// Drive among the files shared with the service account.
    pub(super) async fn open(spreadsheet: &Spreadsheet, token_provider: TokenProvider) -> Res<Self> {
        let spreadsheet_id = match spreadsheet {
            Spreadsheet::Id(id) => id.clone(),
            Spreadsheet::Name(name) => find_spreadsheet_id(name, &token_provider).await?,
        };
        let client = create_sheets_client(&token_provider).await?;
        Ok(Self {
            spreadsheet_id,
            token_provider,
            client,
        })
    }

    /// Refreshes the sheets client with a new access token if needed
    async fn refresh_client(&mut self) -> Res<()> {
        self.client = create_sheets_client(&self.token_provider).await?;
        Ok(())
    }

    async fn values(&mut self, range: &str, dimension: Dimension) -> Res<Vec<Vec<String>>> {
        trace!("values_get {range}");
        self.refresh_client().await?;
        let response = self
            .client
            .spreadsheets()
            .values_get(
                &self.spreadsheet_id,
                range,
                DateTimeRenderOption::FormattedString,
                dimension,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to fetch {range}"))?;
        Ok(response.body.values)
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&mut self, sheet_name: &str) -> Res<Vec<Vec<String>>> {
        let range = format!("{sheet_name}!A:ZZ"); // Get all columns
        self.values(&range, Dimension::Rows).await
    }

    async fn get_row(&mut self, sheet_name: &str, row: usize) -> Res<Vec<String>> {
        let range = format!("{sheet_name}!{row}:{row}");
        let values = self.values(&range, Dimension::Rows).await?;
        Ok(values.into_iter().next().unwrap_or_default())
    }

    async fn get_column(&mut self, sheet_name: &str, column: usize) -> Res<Vec<String>> {
        let letter = column_letter(column);
        let range = format!("{sheet_name}!{letter}:{letter}");
        let values = self.values(&range, Dimension::Columns).await?;
        Ok(values.into_iter().next().unwrap_or_default())
    }

    async fn write_ranges(&mut self, data: &[SheetRange]) -> Res<()> {
        self.refresh_client().await?;
        let value_ranges: Vec<ValueRange> = data
            .iter()
            .map(|sr| ValueRange {
                major_dimension: Some(Dimension::Rows),
                range: sr.range.clone(),
                values: sr.values.clone(),
            })
            .collect();

        let request = BatchUpdateValuesRequest {
            data: value_ranges,
            include_values_in_response: Some(false),
            response_date_time_render_option: None,
            response_value_render_option: None,
            value_input_option: Some(ValueInputOption::UserEntered),
        };

        self.client
            .spreadsheets()
            .values_batch_update(&self.spreadsheet_id, &request)
            .await
            .map_err(map_client_error)
            .with_context(|| "Failed to write ranges")?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

/// Finds the ID of the spreadsheet called `name` using the Google Drive files API. When more than
/// one spreadsheet has the name, the first one Drive returns is used.
async fn find_spreadsheet_id(name: &str, token_provider: &TokenProvider) -> Res<String> {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    let query =
        format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME_TYPE}' and trashed = false");
    let mut url = Url::parse(DRIVE_FILES_URL).context("Invalid Google Drive URL")?;
    url.query_pairs_mut()
        .append_pair("q", &query)
        .append_pair("fields", "files(id,name)")
        .append_pair("supportsAllDrives", "true")
        .append_pair("includeItemsFromAllDrives", "true");

    let access_token = token_provider.token().await?;
    let response = reqwest::Client::new()
        .get(url)
        .bearer_auth(access_token)
        .send()
        .await
        .context("Failed to send the spreadsheet search to the Google Drive API")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        bail!("Google Drive API search failed with status {status}: {body}");
    }

    let list: DriveFileList = response
        .json()
        .await
        .context("Failed to parse the Google Drive API response")?;

    let mut files = list.files.into_iter();
    let Some(first) = files.next() else {
        bail!("No spreadsheet named '{name}' is shared with the service account");
    };
    if files.next().is_some() {
        warn!("More than one spreadsheet is named '{name}', using {}", first.id);
    }
    debug!("Spreadsheet '{}' has ID {}", first.name, first.id);
    Ok(first.id)
}

/// Creates a new sheets client with a fresh access token.
async fn create_sheets_client(token_provider: &TokenProvider) -> Res<sheets::Client> {
    let access_token = token_provider.token().await?;

    // The sheets crate wants OAuth client settings, but with a bearer token only the token is used.
    Ok(sheets::Client::new(
        String::new(), // client_id
        String::new(), // client_secret
        String::new(), // redirect_uri
        access_token,
        String::new(), // refresh_token
    ))
}

fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::HttpError { .. } => "HttpError".to_string(),
        other => other.to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}
