//! The AI advisory service first-view hero image job.
//!
//! Builds a fixed Japanese brief for the landing-page hero, checks the
//! generator's session and asks it for one image at a fixed location.

use crate::error::Result;
use crate::generator::{GenerateOptions, ImageGenerator};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Prompt sent to the generator.
pub const FIRST_VIEW_PROMPT: &str = "以下の画像を生成してください:

日本のビジネスランディングページ用の高品質なヒーロー画像

【シーン設定】
- 40代の自信に満ちた日本人男性経営者
- スマートカジュアルな白いシャツを着用
- モダンでクリーンなオフィス環境（背景はぼかし）
- AIやテクノロジーを象徴する要素（青い光、デジタルグラフィック）

【構図】
- 正面やや斜めから
- 上半身のショット
- 視線はカメラに向ける
- 明るく前向きな表情

【カラーパレット】
- 主要色: 信頼感のある青（#3B82F6系）
- 背景: 白・ライトグレーのグラデーション
- アクセント: テクノロジーを表す青い光

【イメージスタイル】
- プロフェッショナルで信頼感がある
- 現代的でテクノロジー先進的
- 親しみやすさと専門性のバランス
- ランディングページの右側に配置する想定

テキストは入れないでください。人物メインの画像にしてください。";

/// Where the hero image is written.
pub const FIRST_VIEW_OUTPUT_PATH: &str =
    "/srv/ala28/test/ai_komon_service/images/first_view_hero.png";

/// Upper bound on one generation.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// The job never asks for an interactive browser window.
pub const SHOW_BROWSER: bool = false;

const TITLE: &str = "AI advisory service first-view image generation";
const BANNER_WIDTH: usize = 60;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The image was generated and written.
    Generated,
    /// The session check failed; nothing was generated.
    NotAuthenticated,
    /// The generator reported failure.
    GenerationFailed,
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Generated => 0,
            Self::NotAuthenticated | Self::GenerationFailed => 1,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

/// Options the job passes alongside [`FIRST_VIEW_PROMPT`].
pub fn generate_options() -> GenerateOptions {
    GenerateOptions {
        output_path: PathBuf::from(FIRST_VIEW_OUTPUT_PATH),
        show_browser: SHOW_BROWSER,
        timeout: GENERATION_TIMEOUT,
    }
}

/// Runs the job against `generator`, writing status text to `out`.
///
/// `setup_hint` is printed under the not-authenticated message and should
/// tell the user how to establish a session for this generator.
pub async fn run<G, W>(generator: &G, setup_hint: &str, out: &mut W) -> Result<Outcome>
where
    G: ImageGenerator + ?Sized,
    W: Write,
{
    if !generator.is_authenticated().await {
        writeln!(out, "❌ Not authenticated")?;
        writeln!(out, "   {setup_hint}")?;
        return Ok(Outcome::NotAuthenticated);
    }

    let rule = "=".repeat(BANNER_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "{TITLE}")?;
    writeln!(out, "{rule}")?;
    out.flush()?;

    let options = generate_options();
    if generator.generate_image(FIRST_VIEW_PROMPT, &options).await {
        writeln!(out, "\n✅ Generated the first-view image")?;
        writeln!(out, "   output: {}", options.output_path.display())?;
        Ok(Outcome::Generated)
    } else {
        writeln!(out, "\n❌ Image generation failed")?;
        Ok(Outcome::GenerationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const HINT: &str = "set GOOGLE_API_KEY";

    struct FakeGenerator {
        authenticated: bool,
        succeeds: bool,
        calls: Mutex<Vec<(String, GenerateOptions)>>,
    }

    impl FakeGenerator {
        fn new(authenticated: bool, succeeds: bool) -> Self {
            Self {
                authenticated,
                succeeds,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, GenerateOptions)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageGenerator for FakeGenerator {
        async fn is_authenticated(&self) -> bool {
            self.authenticated
        }

        async fn generate_image(&self, prompt: &str, options: &GenerateOptions) -> bool {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), options.clone()));
            self.succeeds
        }
    }

    async fn run_capture(generator: &FakeGenerator) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = run(generator, HINT, &mut out).await.unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_unauthenticated_skips_generation() {
        let generator = FakeGenerator::new(false, true);
        let (outcome, output) = run_capture(&generator).await;

        assert_eq!(outcome, Outcome::NotAuthenticated);
        assert_eq!(outcome.exit_code(), 1);
        assert!(generator.calls().is_empty());
        assert!(output.contains("Not authenticated"));
        assert!(output.contains(HINT));
    }

    #[tokio::test]
    async fn test_success_reports_output_path() {
        let generator = FakeGenerator::new(true, true);
        let (outcome, output) = run_capture(&generator).await;

        assert_eq!(outcome, Outcome::Generated);
        assert_eq!(outcome.exit_code(), 0);
        assert!(output.contains(FIRST_VIEW_OUTPUT_PATH));
        assert!(output.contains(TITLE));
        assert!(output.contains(&"=".repeat(60)));
    }

    #[tokio::test]
    async fn test_failure_reports_and_exits_nonzero() {
        let generator = FakeGenerator::new(true, false);
        let (outcome, output) = run_capture(&generator).await;

        assert_eq!(outcome, Outcome::GenerationFailed);
        assert_eq!(outcome.exit_code(), 1);
        assert!(output.contains("Image generation failed"));
        assert_eq!(generator.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_generator_receives_fixed_inputs() {
        let generator = FakeGenerator::new(true, true);
        run_capture(&generator).await;

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        let (prompt, options) = &calls[0];
        assert_eq!(prompt, FIRST_VIEW_PROMPT);
        assert_eq!(options.output_path, PathBuf::from(FIRST_VIEW_OUTPUT_PATH));
        assert_eq!(options.timeout, Duration::from_secs(300));
        assert!(!options.show_browser);
    }

    #[test]
    fn test_prompt_literal_unchanged() {
        assert!(FIRST_VIEW_PROMPT.starts_with("以下の画像を生成してください:"));
        assert!(FIRST_VIEW_PROMPT.contains("40代の自信に満ちた日本人男性経営者"));
        assert!(FIRST_VIEW_PROMPT.contains("#3B82F6"));
        assert!(FIRST_VIEW_PROMPT
            .ends_with("テキストは入れないでください。人物メインの画像にしてください。"));
    }

    #[test]
    fn test_output_path_is_absolute_png() {
        let path = PathBuf::from(FIRST_VIEW_OUTPUT_PATH);
        assert!(path.is_absolute());
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("first_view_hero.png")
        );
    }
}
