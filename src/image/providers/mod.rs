//! Image generation providers.

mod gemini;

pub use gemini::{GeminiModel, GeminiProvider, GeminiProviderBuilder, API_KEY_ENV, MODEL_ENV};
