//! Structured-generation knowledge source for drug verification.
//!
//! This crate builds the prompts and JSON output schemas for the two lookup modes
//! (simulated regulatory record, general knowledge), talks to the generation
//! backend, and parses its JSON text back into raw drug details.

pub mod client;
pub mod prompts;
pub mod request;
pub mod response;

pub use client::*;
pub use prompts::*;
pub use request::*;
pub use response::*;

use thiserror::Error;

/// Errors from the generation backend or from parsing its output.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation service unreachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Generation service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Generation service returned no text")]
    EmptyResponse,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

pub type LlmResult<T> = Result<T, LlmError>;
