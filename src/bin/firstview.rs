//! Generates the AI advisory service first-view hero image.
//!
//! Takes no arguments. Reads `GOOGLE_API_KEY` (and optionally
//! `FIRSTVIEW_GEMINI_MODEL`), exits 0 when the image was written and 1
//! otherwise.

use anyhow::Context;
use firstview::image::providers::API_KEY_ENV;
use firstview::{first_view, GeminiProvider, ImageGenerator, ProviderGenerator, Unconfigured};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    firstview::logging::init_cli_logger();

    let generator: Box<dyn ImageGenerator> = match GeminiProvider::builder().build() {
        Ok(provider) => {
            tracing::debug!(model = provider.model().as_str(), "using Gemini provider");
            Box::new(ProviderGenerator::new(provider))
        }
        Err(e) => Box::new(Unconfigured::new(e.to_string())),
    };

    let hint = format!("Run: export {API_KEY_ENV}=<your Gemini API key>");
    let outcome = first_view::run(generator.as_ref(), &hint, &mut std::io::stdout())
        .await
        .context("failed to write status output")?;

    Ok(outcome.into())
}
