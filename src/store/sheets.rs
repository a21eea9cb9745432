use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use moka::future::Cache;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{AppendOutcome, RecordsStore, Row, StoreError, StoreErrorKind};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// access tokens are issued for an hour
const TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

/// The fields we need from a Google service-account key file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let key: Self =
            serde_json::from_str(raw).context("service account key is not valid JSON")?;

        if key.client_email.trim().is_empty() {
            bail!("service account key has an empty client_email");
        }
        if key.private_key.trim().is_empty() {
            bail!("service account key has an empty private_key");
        }

        Ok(key)
    }
}

#[derive(Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct ValueRangeBody<'a> {
    values: &'a [Row],
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendValuesResponse {
    #[serde(default)]
    updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    updated_range: Option<String>,
    updated_rows: Option<u64>,
}

/// Google Sheets v4 backend. Rows live in `range` (e.g. `Sheet1!A:C`) of one
/// spreadsheet; appends insert new rows after the last non-empty one.
pub struct SheetsStore {
    http: Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    spreadsheet_id: String,
    range: String,
    api_base: String,
    tokens: Cache<&'static str, String>,
}

impl SheetsStore {
    pub fn new(
        key: ServiceAccountKey,
        spreadsheet_id: String,
        range: String,
    ) -> anyhow::Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("service account private key is not a valid RSA PEM")?;

        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            key,
            signing_key,
            spreadsheet_id,
            range,
            api_base: SHEETS_API_BASE.to_string(),
            tokens: Cache::builder()
                .max_capacity(1)
                .time_to_live(TOKEN_TTL)
                .build(),
        })
    }

    /// Talk to another Sheets-compatible endpoint instead of Google's.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn grant_assertion(&self, now: i64) -> Result<String, StoreError> {
        let claims = GrantClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key).map_err(|e| {
            StoreError::permission_denied(format!("failed to sign token request: {e}"))
        })
    }

    #[instrument(skip(self), fields(client = %self.key.client_email))]
    async fn fetch_access_token(&self) -> Result<String, StoreError> {
        let assertion = self.grant_assertion(Utc::now().timestamp())?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let token: TokenResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::malformed(format!("token response: {e}")))?;

        debug!("Obtained Sheets access token");
        Ok(token.access_token)
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        self.tokens
            .try_get_with(SHEETS_SCOPE, self.fetch_access_token())
            .await
            .map_err(|e| (*e).clone())
    }

    fn values_url(&self, range: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| StoreError::unreachable(format!("invalid Sheets API base: {e}")))?;

        url.path_segments_mut()
            .map_err(|_| StoreError::unreachable("Sheets API base cannot carry a path"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);

        Ok(url)
    }
}

#[async_trait]
impl RecordsStore for SheetsStore {
    fn backend_tag(&self) -> &'static str {
        "sheets"
    }

    #[instrument(skip(self, rows), fields(rows = rows.len(), range = %self.range))]
    async fn append_rows(&self, rows: &[Row]) -> Result<AppendOutcome, StoreError> {
        let token = self.access_token().await?;
        let url = self.values_url(&format!("{}:append", self.range))?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&ValueRangeBody { values: rows })
            .send()
            .await
            .map_err(transport_error)?;

        let body: AppendValuesResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::malformed(format!("append response: {e}")))?;

        let updates = body.updates.unwrap_or_default();
        Ok(AppendOutcome {
            updated_range: updates.updated_range,
            updated_rows: updates.updated_rows,
        })
    }

    #[instrument(skip(self), fields(range = %self.range))]
    async fn read_rows(&self) -> Result<Vec<Row>, StoreError> {
        let token = self.access_token().await?;
        let url = self.values_url(&self.range)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(transport_error)?;

        let body: ValueRange = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::malformed(format!("values response: {e}")))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        return StoreError::unreachable(format!("request to Sheets API timed out: {err}"));
    }
    StoreError::unreachable(err.to_string())
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> StoreError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreErrorKind::PermissionDenied,
        StatusCode::NOT_FOUND => StoreErrorKind::NotFound,
        s if s.is_client_error() => StoreErrorKind::Rejected,
        _ => StoreErrorKind::Unreachable,
    };

    let message =
        google_error_message(body).unwrap_or_else(|| format!("Sheets API answered {status}"));
    StoreError::new(kind, message).with_code(status.as_u16().to_string())
}

/// Sheets errors nest under `error.message`; the token endpoint uses
/// `error_description`.
fn google_error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .pointer("/error/message")
        .or_else(|| parsed.get("error_description"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
