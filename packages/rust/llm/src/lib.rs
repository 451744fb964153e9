//! Language-model client for the research and writing stages.
//!
//! Each call is a single request/response round trip. When search is enabled
//! the `web_search` tool schema is declared and the model decides whether to
//! use it; this client never executes tools and never loops. Only the text
//! blocks of the reply are kept.

mod types;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use sheetwriter_shared::{ModelSettings, Result, Secret, SheetWriterError};

pub use types::{
    ContentBlock, Message, MessagesRequest, MessagesResponse, ToolDefinition, Usage,
    WEB_SEARCH_TOOL, web_search_tool,
};

/// Pinned Messages API version header.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// User-Agent string for model requests.
const USER_AGENT: &str = concat!("SheetWriter/", env!("CARGO_PKG_VERSION"));

/// Text generation, optionally with web search available to the model.
#[allow(async_fn_in_trait)]
pub trait Generator {
    async fn generate(&self, prompt: &str, enable_search: bool) -> Result<String>;
}

/// Client for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    endpoint: Url,
    api_key: Secret,
    model: String,
    max_tokens: u32,
    search_system_prompt: String,
}

impl AnthropicClient {
    pub fn new(api_key: Secret, settings: &ModelSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| SheetWriterError::Network(format!("failed to build HTTP client: {e}")))?;

        let base = if settings.base_url.ends_with('/') {
            settings.base_url.clone()
        } else {
            format!("{}/", settings.base_url)
        };
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join("v1/messages"))
            .map_err(|e| {
                SheetWriterError::config(format!(
                    "invalid model base_url {:?}: {e}",
                    settings.base_url
                ))
            })?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            model: settings.id.clone(),
            max_tokens: settings.max_tokens,
            search_system_prompt: settings.search_system_prompt.clone(),
        })
    }

    /// Build the request body for one call.
    pub fn build_request(&self, prompt: &str, enable_search: bool) -> MessagesRequest {
        let (system, tools) = if enable_search {
            (Some(self.search_system_prompt.clone()), vec![web_search_tool()])
        } else {
            (None, Vec::new())
        };
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message::user(prompt)],
            system,
            tools,
        }
    }

    /// Send one request and return the parsed reply.
    pub async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| SheetWriterError::Network(format!("model request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetWriterError::api("anthropic", status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| SheetWriterError::Generation(format!("malformed model response: {e}")))
    }
}

impl Generator for AnthropicClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.chars().count()))]
    async fn generate(&self, prompt: &str, enable_search: bool) -> Result<String> {
        let request = self.build_request(prompt, enable_search);
        debug!(tools = request.tools.len(), "sending model request");

        let response = self.send(&request).await?;
        let text = response.text();

        if response.stop_reason.as_deref() == Some("tool_use") {
            warn!("model stopped to call a tool; keeping only the text it produced");
        }
        let usage = response.usage.unwrap_or_default();
        info!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            chars = text.chars().count(),
            "model call complete"
        );

        Ok(text)
    }
}
