//! Generative model outbound adapters.
//!
//! Provides a reqwest implementation of the `GenerativeModel` port against
//! the Gemini `generateContent` REST endpoint.

mod dto;
mod http_model;

pub use http_model::{DEFAULT_GEMINI_BASE_URL, GeminiHttpModel};
