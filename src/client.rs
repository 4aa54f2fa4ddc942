//! Secure transport client and chat request orchestration
//!
//! Attestation verification and transport encryption are performed by the
//! secure layer the client connects through (the enclave endpoint itself or
//! a deployment proxy in front of it); this client treats that layer as
//! opaque. What lives here is the request glue: channel setup, the chat
//! completion calls, and driving the SSE decoder for streamed responses.

use futures_util::StreamExt;
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::error::{Error, Result};
use crate::sse::SseDecoder;

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-oss-120b";

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Client for a confidential inference endpoint
///
/// Channel setup happens once, on first use:
/// 1. [`ready`](Self::ready) builds the underlying HTTP session
/// 2. All later requests reuse that session
///
/// The base URL may point at the enclave endpoint directly or at a proxy
/// that injects authentication; in the proxy deployment no API key is
/// needed on this side.
pub struct SecureClient {
    /// Endpoint or proxy base URL
    base_url: String,

    /// Bearer token, when talking to the endpoint directly
    api_key: Option<String>,

    /// HTTP session (built by `ready`)
    http: Option<reqwest::Client>,
}

impl SecureClient {
    /// Create a client for the given base URL, without credentials
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            http: None,
        }
    }

    /// Create a client that authenticates with a bearer API key
    pub fn with_api_key(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
            http: None,
        }
    }

    /// Get the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check whether channel setup has completed
    pub fn is_ready(&self) -> bool {
        self.http.is_some()
    }

    /// Complete channel setup
    ///
    /// Resolves once the transport is usable. Idempotent; every request
    /// path calls it implicitly, so calling it up front is optional and
    /// only moves the setup cost ahead of the first message.
    pub async fn ready(&mut self) -> Result<()> {
        if self.http.is_none() {
            let http = reqwest::Client::builder().build()?;
            debug!(base_url = %self.base_url, "transport ready");
            self.http = Some(http);
        }
        Ok(())
    }

    /// Get the HTTP session, requiring that setup has been done
    fn get_http(&self) -> Result<&reqwest::Client> {
        self.http.as_ref().ok_or(Error::NotReady)
    }

    async fn ensure_ready(&mut self) -> Result<()> {
        if !self.is_ready() {
            self.ready().await?;
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// POST a completion request and return the response after the status check
    async fn post_completions(
        &mut self,
        request: &ChatRequest,
        accept: &str,
    ) -> Result<reqwest::Response> {
        self.ensure_ready().await?;

        let url = self.endpoint(COMPLETIONS_PATH);
        let mut builder = self
            .get_http()?
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", accept)
            .json(request);

        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        Ok(response)
    }

    /// Make a chat completion request with the default model
    pub async fn chat(&mut self, messages: Vec<ChatMessage>) -> Result<ChatResponse> {
        self.chat_request(ChatRequest::new(DEFAULT_CHAT_MODEL, messages))
            .await
    }

    /// Make a non-streamed chat completion request
    pub async fn chat_request(&mut self, mut request: ChatRequest) -> Result<ChatResponse> {
        request.stream = false;
        let response = self.post_completions(&request, "application/json").await?;
        Ok(response.json().await?)
    }

    /// Make a streamed chat completion request
    ///
    /// The callback receives each content fragment in arrival order; an
    /// upstream error payload arrives as a final `\nError: ...` fragment.
    /// Decoding is tied to the response: dropping the returned future
    /// aborts the request and no further callback invocations occur.
    ///
    /// Servers that ignore the stream flag and answer with a plain JSON
    /// body get a full-body parse instead; the message content is then
    /// delivered as a single fragment.
    pub async fn chat_stream<F>(&mut self, mut request: ChatRequest, mut on_fragment: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        request.stream = true;
        let response = self.post_completions(&request, "text/event-stream").await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        if !content_type.contains("text/event-stream") {
            let parsed: ChatResponse = serde_json::from_str(&response.text().await?)?;
            if let Some(content) = parsed.content() {
                on_fragment(content);
            }
            return Ok(());
        }

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            for fragment in decoder.feed(&chunk?) {
                on_fragment(&fragment);
            }
            if decoder.is_finished() {
                debug!("stream terminated by event payload");
                return Ok(());
            }
        }

        // End of input without a sentinel: flush the buffered remainder
        for fragment in decoder.finish() {
            on_fragment(&fragment);
        }
        Ok(())
    }
}
