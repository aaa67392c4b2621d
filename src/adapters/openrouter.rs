use crate::domain::model::ModelChoice;
use crate::domain::ports::{ConfigProvider, TextGenerator};
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::usable_api_key;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Chat-completions client for OpenRouter (or any compatible endpoint).
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
    settings: GenerationSettings,
}

impl OpenRouterClient {
    pub fn new(base_url: &str, api_key: &str, settings: GenerationSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| DashboardError::AiUnexpected(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            settings,
        })
    }

    /// 沒有可用的 API 金鑰時回傳 `None`
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Option<Self>> {
        let Some(api_key) = usable_api_key(config.api_key()) else {
            return Ok(None);
        };

        let settings = GenerationSettings {
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
            timeout: Duration::from_secs(config.request_timeout_seconds()),
        };
        Self::new(config.base_url(), api_key, settings).map(Some)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for OpenRouterClient {
    async fn generate(&self, prompt: &str, model: ModelChoice) -> Result<String> {
        let body = ChatRequest {
            model: model.model_id(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        tracing::debug!("Making chat completion request to: {}", self.endpoint());
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        tracing::debug!("AI response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::AiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::AiUnexpected(format!("invalid response body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| DashboardError::AiUnexpected("response contained no completion".into()))
    }
}

/// 連線或逾時歸為連線錯誤，其餘為非預期錯誤
fn classify_send_error(error: reqwest::Error) -> DashboardError {
    if error.is_connect() || error.is_timeout() {
        DashboardError::AiConnectivity(error.to_string())
    } else {
        DashboardError::AiUnexpected(error.to_string())
    }
}
