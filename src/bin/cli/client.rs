use cardwise::dto::{CardListQuery, CardPage, CollectionStats, StartScanDto, WishlistItemDto, WishlistRequest};
use cardwise::models::{Card, ScanJob, ScanProgress, WishlistItem};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
    /// The server answered with a body we could not make sense of
    Decode(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
            ClientError::Decode(message) => write!(f, "Unexpected response: {}", message),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Server { .. } | ClientError::Decode(_) => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;

    /// Reads the JSON body and pulls out one top-level field
    async fn field<T: DeserializeOwned>(self, key: &str) -> Result<T, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }

    async fn field<T: DeserializeOwned>(self, key: &str) -> Result<T, ClientError> {
        let mut body: Value = self.json().await.map_err(ClientError::Request)?;
        let value = body
            .get_mut(key)
            .map(Value::take)
            .ok_or_else(|| ClientError::Decode(format!("missing `{}`", key)))?;
        serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Builds query parameters from a CardListQuery
fn build_query_params(query: &CardListQuery) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();

    if let Some(page) = query.page {
        params.push(("page", page.to_string()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    if let Some(ref search) = query.search {
        params.push(("search", search.clone()));
    }
    if let Some(ref sport) = query.sport {
        params.push(("sport", sport.clone()));
    }
    if let Some(year) = query.year {
        params.push(("year", year.to_string()));
    }
    if let Some(for_trade) = query.for_trade {
        params.push(("forTrade", for_trade.to_string()));
    }

    params
}

/// HTTP client wrapper for communicating with the CardWise server
pub struct CardwiseClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// The underlying HTTP client
    client: Client,
}

impl CardwiseClient {
    /// Creates a new CardwiseClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the CardWise server
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        self.client.get(self.url(path)).send().await.map_err(ClientError::Request)?.check().await
    }

    async fn post_empty(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        self.client.post(self.url(path)).send().await.map_err(ClientError::Request)?.check().await
    }

    async fn delete(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        self.client.delete(self.url(path)).send().await.map_err(ClientError::Request)?.check().await
    }

    // ── Collection endpoints ─────────────────────────────────────────

    /// Lists one page of cards
    pub async fn list_cards(&self, query: &CardListQuery) -> Result<CardPage, ClientError> {
        let response = self.client.get(self.url("/api/cards"))
            .query(&build_query_params(query))
            .send().await.map_err(ClientError::Request)?
            .check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Gets a specific card by ID
    pub async fn get_card(&self, id: &str) -> Result<Card, ClientError> {
        self.get(&format!("/api/cards/{}", id)).await?.field("card").await
    }

    /// Deletes a card, returning the server's confirmation
    pub async fn delete_card(&self, id: &str) -> Result<String, ClientError> {
        self.delete(&format!("/api/cards/{}", id)).await?.field("message").await
    }

    /// Fetches the collection summary
    pub async fn card_stats(&self) -> Result<CollectionStats, ClientError> {
        self.get("/api/cards/stats").await?.field("stats").await
    }

    // ── Wishlist endpoints ───────────────────────────────────────────

    pub async fn list_wishlist(&self) -> Result<Vec<WishlistItem>, ClientError> {
        self.get("/api/wishlist").await?.field("items").await
    }

    pub async fn add_wishlist_item(&self, item: WishlistItemDto) -> Result<WishlistItem, ClientError> {
        let response = self.client.post(self.url("/api/wishlist"))
            .json(&WishlistRequest { item })
            .send().await.map_err(ClientError::Request)?
            .check().await?;
        response.field("item").await
    }

    pub async fn remove_wishlist_item(&self, id: &str) -> Result<String, ClientError> {
        self.delete(&format!("/api/wishlist/{}", id)).await?.field("message").await
    }

    // ── Scan endpoints ───────────────────────────────────────────────

    /// Starts a scan job over a folder on the server's machine
    pub async fn start_scan(&self, dto: &StartScanDto) -> Result<ScanJob, ClientError> {
        let response = self.client.post(self.url("/api/scan/start"))
            .json(dto)
            .send().await.map_err(ClientError::Request)?
            .check().await?;
        response.field("job").await
    }

    pub async fn list_scan_jobs(&self) -> Result<Vec<ScanJob>, ClientError> {
        self.get("/api/scan/jobs").await?.field("jobs").await
    }

    pub async fn scan_progress(&self, job_id: &str) -> Result<ScanProgress, ClientError> {
        self.get(&format!("/api/scan/progress/{}", job_id)).await?.field("progress").await
    }

    /// Sends a pause, resume or cancel request for a job
    pub async fn control_scan(&self, action: &str, job_id: &str) -> Result<String, ClientError> {
        self.post_empty(&format!("/api/scan/{}/{}", action, job_id)).await?.field("message").await
    }

    // ── Settings endpoints ───────────────────────────────────────────

    /// Fetches one settings section as raw JSON
    pub async fn get_settings(&self, section: &str) -> Result<Value, ClientError> {
        let response = self.get(&format!("/api/settings/{}", section)).await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Downloads the collection export as text
    pub async fn export_collection(&self, format: &str) -> Result<String, ClientError> {
        let response = self.client.get(self.url("/api/settings/export"))
            .query(&[("format", format)])
            .send().await.map_err(ClientError::Request)?
            .check().await?;
        response.text().await.map_err(ClientError::Request)
    }

    /// Asks the server to write a database backup, returning its path
    pub async fn backup(&self) -> Result<String, ClientError> {
        self.post_empty("/api/settings/backup").await?.field("path").await
    }

    // ── Seed endpoints ───────────────────────────────────────────────

    /// Runs one seeding step (`admin` or `cards`) and returns the server's report
    pub async fn seed(&self, what: &str) -> Result<Value, ClientError> {
        let response = self.post_empty(&format!("/api/seed/{}", what)).await?;
        response.json().await.map_err(ClientError::Request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_params_skips_unset_fields() {
        let query = CardListQuery {
            page: Some(2),
            sport: Some("Baseball".to_string()),
            for_trade: Some(true),
            ..Default::default()
        };
        let params = build_query_params(&query);
        assert_eq!(
            params,
            vec![
                ("page", "2".to_string()),
                ("sport", "Baseball".to_string()),
                ("forTrade", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = CardwiseClient::new("http://localhost:3000/".to_string());
        assert_eq!(client.url("/api/cards"), "http://localhost:3000/api/cards");
    }
}
