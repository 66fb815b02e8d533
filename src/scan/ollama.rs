//! Ollama API client for card photo analysis

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::analyzer::{CardAnalysis, CardImageAnalyzer};
use super::{Result, ScanError};

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);

const CARD_PROMPT: &str = r#"Analyze this trading card image and extract the following information in JSON format:
{
  "playerName": "player's full name",
  "sport": "sport type (Baseball, Basketball, Football, Hockey, etc.)",
  "year": "card year as number",
  "manufacturer": "card manufacturer/brand",
  "setName": "set or product name",
  "cardNumber": "card number",
  "isRookieCard": "true if rookie card, false otherwise",
  "isAutograph": "true if autographed, false otherwise",
  "isMemorabilia": "true if contains memorabilia/patch, false otherwise",
  "condition": {
    "centering": "rate 1-10",
    "corners": "rate 1-10",
    "edges": "rate 1-10",
    "surface": "rate 1-10",
    "overall": "Poor, Fair, Good, Very Good, Excellent, Near Mint, Mint, or Gem Mint"
  },
  "estimatedValue": "estimated value in dollars as number",
  "confidence": "confidence level 0-1"
}

Only return valid JSON, no other text."#;

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    name: String,
}

impl OllamaClient {
    /// Creates a client for the Ollama server at `base_url`
    ///
    /// ### Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let client = Client::builder().timeout(ANALYSIS_TIMEOUT).build()?;

        // Accept hosts pasted with the endpoint still attached
        let base_url = base_url
            .trim_end_matches('/')
            .trim_end_matches("/api/generate")
            .trim_end_matches('/')
            .to_string();

        info!("Ollama client for {} using model {}", base_url, model);

        Ok(Self {
            client,
            base_url,
            model: model.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists the models the server has pulled
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(CONNECTION_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScanError::OllamaUnavailable(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Sends one card photo to the vision model
    #[instrument(skip(self))]
    pub async fn analyze_card_image(&self, image: &Path) -> Result<CardAnalysis> {
        let bytes = tokio::fs::read(image).await?;
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt: CARD_PROMPT,
            images: vec![STANDARD.encode(bytes)],
            stream: false,
            options: GenerateOptions {
                temperature: 0.1,
                top_p: 0.9,
            },
        };

        debug!("Sending vision request to Ollama: model={}", self.model);

        let response = self
            .client
            .post(&url)
            .timeout(ANALYSIS_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScanError::OllamaUnavailable(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let result: GenerateResponse = response.json().await?;
        debug!("Raw model response: {}", result.response);

        Ok(CardAnalysis::from_model_output(&result.response))
    }
}

#[async_trait]
impl CardImageAnalyzer for OllamaClient {
    async fn test_connection(&self) -> bool {
        match self.list_models().await {
            Ok(models) => {
                info!("Ollama is reachable, available models: {:?}", models);
                true
            }
            Err(e) => {
                warn!("Cannot connect to Ollama at {}: {}", self.base_url, e);
                false
            }
        }
    }

    async fn analyze(&self, image: &Path) -> Result<CardAnalysis> {
        self.analyze_card_image(image).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    /// Serves `app` on a random local port and returns its base URL
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn image_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("card.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        path
    }

    #[test]
    fn test_base_url_normalisation() {
        let client = OllamaClient::new("http://ollama:11434/api/generate/", "llava").unwrap();
        assert_eq!(client.base_url(), "http://ollama:11434");

        let client = OllamaClient::new("http://ollama:11434/", "llava").unwrap();
        assert_eq!(client.base_url(), "http://ollama:11434");
        assert_eq!(client.model(), "llava");
    }

    #[tokio::test]
    async fn test_connection_against_stub() {
        let app = Router::new().route(
            "/api/tags",
            get(|| async { Json(json!({"models": [{"name": "llava:latest"}]})) }),
        );
        let url = serve(app).await;

        let client = OllamaClient::new(&url, "llava:latest").unwrap();
        assert!(client.test_connection().await);
        assert_eq!(client.list_models().await.unwrap(), vec!["llava:latest".to_string()]);
    }

    #[tokio::test]
    async fn test_connection_fails_on_error_status() {
        let app = Router::new().route("/api/tags", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let url = serve(app).await;

        let client = OllamaClient::new(&url, "llava:latest").unwrap();
        assert!(!client.test_connection().await);
    }

    #[tokio::test]
    async fn test_connection_fails_when_nothing_listens() {
        // Bind then drop to get a port with no listener
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OllamaClient::new(&format!("http://{}", addr), "llava:latest").unwrap();
        assert!(!client.test_connection().await);
    }

    #[tokio::test]
    async fn test_analyze_sends_image_and_parses_answer() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::default();
        let app = Router::new()
            .route(
                "/api/generate",
                post(|State(seen): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                    *seen.lock().unwrap() = Some(body);
                    Json(json!({
                        "response": "```json\n{\"playerName\": \"Mike Trout\", \"year\": \"2011\", \"confidence\": 0.9}\n```"
                    }))
                }),
            )
            .with_state(seen.clone());
        let url = serve(app).await;
        let dir = tempfile::tempdir().unwrap();

        let client = OllamaClient::new(&url, "llava:latest").unwrap();
        let analysis = client.analyze_card_image(&image_file(&dir)).await.unwrap();

        assert_eq!(analysis.player_name.as_deref(), Some("Mike Trout"));
        assert_eq!(analysis.year, Some(2011));
        assert_eq!(analysis.confidence, 0.9);

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "llava:latest");
        assert_eq!(body["stream"], false);
        assert_eq!(body["images"][0], STANDARD.encode(b"not really a jpeg"));
        assert!((body["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert!((body["options"]["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert!(body["prompt"].as_str().unwrap().ends_with("Only return valid JSON, no other text."));
    }

    #[tokio::test]
    async fn test_analyze_error_status_is_an_error() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
        );
        let url = serve(app).await;
        let dir = tempfile::tempdir().unwrap();

        let client = OllamaClient::new(&url, "llava:latest").unwrap();
        let result = client.analyze_card_image(&image_file(&dir)).await;
        assert!(matches!(result, Err(ScanError::OllamaUnavailable(_))));
    }

    #[tokio::test]
    async fn test_analyze_missing_file_is_an_error() {
        let client = OllamaClient::new("http://127.0.0.1:9", "llava:latest").unwrap();
        let result = client.analyze_card_image(Path::new("/definitely/not/here.jpg")).await;
        assert!(matches!(result, Err(ScanError::FileSystem(_))));
    }
}
