#![warn(missing_docs)]
//! firstview - generates the landing-page first-view hero image.
//!
//! The job itself lives in [`first_view`]: a fixed prompt, a fixed output
//! path, one authentication check and one generation call. It talks to the
//! outside world only through the [`ImageGenerator`] trait, so any backend
//! that can answer "authenticated?" and "generated?" can drive it.
//!
//! The crate ships one backend, [`ProviderGenerator`] over the Gemini image
//! API.
//!
//! # Quick Start
//!
//! ```no_run
//! use firstview::{first_view, GeminiProvider, ProviderGenerator};
//!
//! #[tokio::main]
//! async fn main() -> firstview::Result<()> {
//!     let generator = ProviderGenerator::new(GeminiProvider::builder().build()?);
//!     let outcome = first_view::run(&generator, "set GOOGLE_API_KEY", &mut std::io::stdout()).await?;
//!     std::process::exit(outcome.exit_code().into());
//! }
//! ```

mod error;
pub mod first_view;
pub mod generator;
pub mod image;

#[cfg(feature = "cli")]
#[doc(hidden)]
pub mod logging;

pub use error::{FirstViewError, Result};
pub use first_view::Outcome;
pub use generator::{GenerateOptions, ImageGenerator, ProviderGenerator, Unconfigured};
pub use image::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};
pub use image::{GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, ImageProvider};
