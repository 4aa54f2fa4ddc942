//! # Enclave Chat Client
//!
//! Streaming chat client for confidential inference endpoints.
//!
//! The endpoints this crate talks to run inside hardware enclaves behind a
//! secure transport layer (remote attestation, encrypted channel, proxy
//! authentication). That layer is external and opaque here: this crate
//! connects to the endpoint or its proxy over plain HTTPS and concerns
//! itself with the chat protocol on top.
//!
//! ## What it does
//!
//! - **Chat completions** over the OpenAI-compatible wire format, streamed
//!   (`text/event-stream`) or whole-body JSON
//! - **Incremental SSE decoding**: the response body arrives in arbitrary
//!   byte chunks; [`SseDecoder`] reassembles events across chunk and UTF-8
//!   boundaries and yields content fragments in order, exactly once
//! - **Stream termination**: the `[DONE]` sentinel, an upstream error
//!   payload, or end of input each close the stream; malformed events are
//!   logged and skipped without killing it
//!
//! ## Example
//!
//! ```rust,ignore
//! use enclave_chat::{ChatMessage, ChatRequest, SecureClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Point at the enclave endpoint or a local proxy in front of it
//!     let mut client = SecureClient::new("http://localhost:8080");
//!     client.ready().await?;
//!
//!     let request = ChatRequest::new(
//!         "gpt-oss-120b",
//!         vec![ChatMessage::user("Say hello in exactly 5 words.")],
//!     );
//!
//!     client
//!         .chat_stream(request, |fragment| print!("{fragment}"))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod sse;

pub use api::{ChatChunk, ChatMessage, ChatRequest, ChatResponse, Role};
pub use client::SecureClient;
pub use error::{Error, Result};
pub use sse::SseDecoder;
