//! Client for the multimodal generation service.
//!
//! The pipeline talks to the model only through the [`GenerativeModel`]
//! trait; [`GeminiClient`] is the production implementation backed by the
//! Gemini `generateContent` REST endpoint with inlined JPEG images.

pub mod client;
pub mod error;
mod types;

pub use client::{GeminiClient, GenerativeClientConfig, GenerativeModel};
pub use error::{MlError, MlResult};
