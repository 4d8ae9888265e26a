//! The collaborator seam the first-view job talks to.
//!
//! [`ImageGenerator`] answers two questions with a plain `bool`: is the
//! session authenticated, and did the image get written. Everything a
//! provider can report beyond that is logged and dropped here.

use crate::image::{GenerationRequest, ImageFormat, ImageProvider};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Inputs for one generation call besides the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Where the image file is written.
    pub output_path: PathBuf,
    /// Whether an interactive browser window may be shown.
    pub show_browser: bool,
    /// Upper bound on the whole generation, including the write.
    pub timeout: Duration,
}

/// Authentication check plus image generation, each reduced to success or failure.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns true if the generation service session is valid.
    async fn is_authenticated(&self) -> bool;

    /// Generates an image for `prompt` and writes it to `options.output_path`.
    async fn generate_image(&self, prompt: &str, options: &GenerateOptions) -> bool;
}

/// Adapts an [`ImageProvider`] to [`ImageGenerator`].
pub struct ProviderGenerator<P> {
    provider: P,
}

impl<P: ImageProvider> ProviderGenerator<P> {
    /// Wraps a provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns the wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn generate_and_save(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> crate::Result<usize> {
        let mut request = GenerationRequest::new(prompt);
        if let Some(format) = ImageFormat::from_path(&options.output_path) {
            request = request.with_format(format);
        }

        let image = self.provider.generate(&request).await?;
        if let Some(requested) = request.format {
            if requested != image.format {
                tracing::debug!(
                    requested = requested.extension(),
                    received = image.format.extension(),
                    "provider returned a different format than the output extension"
                );
            }
        }
        image.save(&options.output_path)?;
        Ok(image.size())
    }
}

#[async_trait]
impl<P: ImageProvider> ImageGenerator for ProviderGenerator<P> {
    async fn is_authenticated(&self) -> bool {
        match self.provider.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), "authentication check failed: {e}");
                false
            }
        }
    }

    async fn generate_image(&self, prompt: &str, options: &GenerateOptions) -> bool {
        // API providers render headless; the flag only matters to browser-driven ones.
        tracing::debug!(
            provider = self.provider.name(),
            show_browser = options.show_browser,
            timeout_secs = options.timeout.as_secs(),
            output = %options.output_path.display(),
            "starting image generation"
        );

        match tokio::time::timeout(options.timeout, self.generate_and_save(prompt, options)).await
        {
            Ok(Ok(bytes)) => {
                tracing::info!(
                    bytes,
                    output = %options.output_path.display(),
                    "image written"
                );
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(provider = self.provider.name(), "image generation failed: {e}");
                false
            }
            Err(_) => {
                let e = crate::FirstViewError::Timeout(options.timeout);
                tracing::warn!(provider = self.provider.name(), "image generation failed: {e}");
                false
            }
        }
    }
}

/// Stands in for a backend that could not be configured, e.g. no API key.
///
/// Reports unauthenticated and never generates.
#[derive(Debug, Clone)]
pub struct Unconfigured {
    reason: String,
}

impl Unconfigured {
    /// Records why the real backend is unavailable.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns why the backend is unavailable.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl ImageGenerator for Unconfigured {
    async fn is_authenticated(&self) -> bool {
        tracing::warn!(reason = %self.reason, "image generator is not configured");
        false
    }

    async fn generate_image(&self, _prompt: &str, _options: &GenerateOptions) -> bool {
        false
    }
}
