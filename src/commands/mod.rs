use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use zai_vision::{
    AnalysisResult, AnalyzeOptions, ChatOptions, ChatResult, OcrOptions, OcrResult, Result,
    SearchOptions, SearchResult, VisionError, VisionService, WebSearchOptions, WebSearchResult,
};

#[derive(Parser)]
#[command(name = "zai-vision")]
#[command(about = "Image analysis, OCR and visual search with the Z.ai GLM-4V model")]
#[command(version)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Describe an image and optionally list the objects in it
    AnalyzeImage {
        /// Image file (jpg, png, gif, webp, bmp)
        path: PathBuf,
        /// Detail level: low, high or auto
        #[arg(long, default_value = "high")]
        detail: String,
        /// Ask for an object list with confidence scores
        #[arg(long)]
        detect_objects: bool,
    },
    /// Extract the text visible in an image
    ExtractText {
        path: PathBuf,
        /// Language hint, or "auto"
        #[arg(long, default_value = "auto")]
        language: String,
        /// Keep line breaks, lists and tables
        #[arg(long)]
        preserve_formatting: bool,
    },
    /// Describe a video (not supported yet)
    ProcessVideo { path: PathBuf },
    /// Suggest a search query for an image
    VisionSearch {
        path: PathBuf,
        /// Search type: web, products or similar
        #[arg(long, default_value = "web")]
        search_type: String,
        /// Number of results, 1 to 20
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=20))]
        max_results: u32,
    },
    /// Analyze an image for information, shopping or entertainment lookups
    VisionWebSearch {
        path: PathBuf,
        /// Query type: information, shopping or entertainment
        #[arg(long, default_value = "information")]
        query_type: String,
        /// Number of results, 1 to 20
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=20))]
        max_results: u32,
    },
    /// Ask a free-form question about an image
    VisionChat {
        path: PathBuf,
        /// Question to ask; defaults to a general description request
        #[arg(default_value = "")]
        prompt: String,
        /// Model to use instead of ZAI_MODEL_VISION
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
    },
}

/// Exit status for a failed argument parse. `--help` and `--version` succeed,
/// every usage error exits 1 like any other failed command.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Run one command against `service` and return the text to print.
pub async fn run_command<S: VisionService>(
    service: &S,
    command: Commands,
    json: bool,
) -> Result<String> {
    match command {
        Commands::AnalyzeImage {
            path,
            detail,
            detect_objects,
        } => {
            let options = AnalyzeOptions {
                detail: detail.parse()?,
                detect_objects,
            };
            let result = service.analyze(&path, &options).await?;
            render(&result, json, format_analysis)
        }
        Commands::ExtractText {
            path,
            language,
            preserve_formatting,
        } => {
            let options = OcrOptions {
                language,
                preserve_formatting,
            };
            let result = service.extract_text(&path, &options).await?;
            render(&result, json, format_ocr)
        }
        Commands::ProcessVideo { path } => {
            let result = service.process_video(&path).await?;
            render(&result, json, format_analysis)
        }
        Commands::VisionSearch {
            path,
            search_type,
            max_results,
        } => {
            let options = SearchOptions {
                search_type: search_type.parse()?,
                max_results,
            };
            let result = service.vision_search(&path, &options).await?;
            render(&result, json, format_search)
        }
        Commands::VisionWebSearch {
            path,
            query_type,
            max_results,
        } => {
            let options = WebSearchOptions {
                query_type: query_type.parse()?,
                max_results,
            };
            let result = service.vision_web_search(&path, &options).await?;
            render(&result, json, format_web_search)
        }
        Commands::VisionChat {
            path,
            prompt,
            model,
            temperature,
        } => {
            let options = ChatOptions { model, temperature };
            let result = service.vision_chat(&path, &prompt, &options).await?;
            render(&result, json, format_chat)
        }
    }
}

fn render<T: Serialize>(result: &T, json: bool, text: fn(&T) -> String) -> Result<String> {
    if json {
        serde_json::to_string_pretty(result)
            .map_err(|e| VisionError::processing(format!("failed to serialize result: {e}")))
    } else {
        Ok(text(result))
    }
}

fn format_analysis(result: &AnalysisResult) -> String {
    let mut out = format!("Scene:\n{}", result.scene.trim());
    if let Some(objects) = &result.objects {
        out.push_str("\n\nDetected objects:");
        if objects.is_empty() {
            out.push_str("\n  (none)");
        }
        for object in objects {
            out.push_str(&format!(
                "\n  - {} ({:.0}%)",
                object.label,
                object.confidence * 100.0
            ));
        }
    }
    out
}

fn format_ocr(result: &OcrResult) -> String {
    match &result.language {
        Some(language) => format!("Language: {language}\n\n{}", result.text),
        None => result.text.clone(),
    }
}

fn format_search(result: &SearchResult) -> String {
    let mut out = format!("Query:\n{}\n\nResults:", result.query.trim());
    for (i, hit) in result.results.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, hit.title));
        if let Some(description) = &hit.description {
            out.push_str(&format!("\n     {}", description.trim()));
        }
    }
    out
}

fn format_web_search(result: &WebSearchResult) -> String {
    let mut out = format!("Analysis:\n{}\n\nSuggestions:", result.analysis.trim());
    for suggestion in &result.suggestions {
        out.push_str(&format!("\n  - {suggestion}"));
    }
    out
}

fn format_chat(result: &ChatResult) -> String {
    match &result.usage {
        Some(usage) => format!(
            "{}\n\nTokens: {} prompt + {} completion = {} total",
            result.response.trim(),
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        ),
        None => result.response.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;
    use zai_vision::llm::Usage;
    use zai_vision::{DetailLevel, DetectedObject, ErrorKind, SearchHit, SearchType};

    /// Canned backend that records the options it was called with.
    #[derive(Default)]
    struct FakeVision {
        seen_detail: Mutex<Option<DetailLevel>>,
        seen_search: Mutex<Option<SearchType>>,
    }

    impl VisionService for FakeVision {
        async fn analyze(&self, _: &Path, options: &AnalyzeOptions) -> Result<AnalysisResult> {
            *self.seen_detail.lock().unwrap() = Some(options.detail);
            Ok(AnalysisResult {
                scene: "A cat on a mat.".to_string(),
                objects: options.detect_objects.then(|| {
                    vec![DetectedObject {
                        label: "cat".to_string(),
                        confidence: 0.95,
                    }]
                }),
            })
        }

        async fn extract_text(&self, _: &Path, options: &OcrOptions) -> Result<OcrResult> {
            Ok(OcrResult {
                text: "EXIT".to_string(),
                language: (options.language != "auto").then(|| options.language.clone()),
            })
        }

        async fn process_video(&self, _: &Path) -> Result<AnalysisResult> {
            Err(VisionError::processing("Video processing is not supported"))
        }

        async fn vision_search(&self, _: &Path, options: &SearchOptions) -> Result<SearchResult> {
            *self.seen_search.lock().unwrap() = Some(options.search_type);
            Ok(SearchResult {
                query: "tabby cat".to_string(),
                results: vec![SearchHit {
                    title: "Visual search query".to_string(),
                    description: Some("tabby cat".to_string()),
                }],
            })
        }

        async fn vision_web_search(
            &self,
            _: &Path,
            _: &WebSearchOptions,
        ) -> Result<WebSearchResult> {
            Ok(WebSearchResult {
                analysis: "A domestic cat.".to_string(),
                suggestions: vec!["Search for similar images online".to_string()],
            })
        }

        async fn vision_chat(&self, _: &Path, prompt: &str, _: &ChatOptions) -> Result<ChatResult> {
            Ok(ChatResult {
                response: format!("You asked: {prompt}"),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
            })
        }
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("zai-vision").chain(args.iter().copied())).unwrap()
    }

    async fn run(service: &FakeVision, args: &[&str]) -> Result<String> {
        let cli = parse(args);
        run_command(service, cli.command, cli.json).await
    }

    #[tokio::test]
    async fn test_analyze_image_text_output() {
        let fake = FakeVision::default();
        let out = run(&fake, &["analyze-image", "cat.jpg", "--detail", "low", "--detect-objects"])
            .await
            .unwrap();

        assert_eq!(*fake.seen_detail.lock().unwrap(), Some(DetailLevel::Low));
        assert!(out.starts_with("Scene:\nA cat on a mat."));
        assert!(out.contains("  - cat (95%)"));
    }

    #[tokio::test]
    async fn test_json_output() {
        let fake = FakeVision::default();
        let out = run(&fake, &["--json", "extract-text", "sign.png", "--language", "en"])
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!({"text": "EXIT", "language": "en"}));
    }

    #[tokio::test]
    async fn test_invalid_option_is_rejected() {
        let fake = FakeVision::default();
        let err = run(&fake, &["vision-search", "cat.jpg", "--search-type", "maps"])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(*fake.seen_search.lock().unwrap(), None);
    }

    #[tokio::test]
    async fn test_vision_search_output() {
        let fake = FakeVision::default();
        let out = run(&fake, &["vision-search", "cat.jpg", "--search-type", "similar"])
            .await
            .unwrap();

        assert_eq!(*fake.seen_search.lock().unwrap(), Some(SearchType::Similar));
        assert!(out.contains("Query:\ntabby cat"));
        assert!(out.contains("1. Visual search query"));
    }

    #[tokio::test]
    async fn test_process_video_propagates_error() {
        let fake = FakeVision::default();
        let err = run(&fake, &["process-video", "clip.mp4"]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Processing);
    }

    #[tokio::test]
    async fn test_vision_chat_prints_usage() {
        let fake = FakeVision::default();
        let out = run(&fake, &["vision-chat", "cat.jpg", "Is it sleeping?"])
            .await
            .unwrap();

        assert!(out.starts_with("You asked: Is it sleeping?"));
        assert!(out.ends_with("Tokens: 10 prompt + 5 completion = 15 total"));
    }

    #[tokio::test]
    async fn test_web_search_output() {
        let fake = FakeVision::default();
        let out = run(&fake, &["vision-web-search", "cat.jpg", "--query-type", "shopping"])
            .await
            .unwrap();

        assert!(out.contains("Analysis:\nA domestic cat."));
        assert!(out.contains("  - Search for similar images online"));
    }

    fn parse_error(args: &[&str]) -> clap::Error {
        match Cli::try_parse_from(std::iter::once("zai-vision").chain(args.iter().copied())) {
            Ok(_) => panic!("expected {args:?} to be rejected"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_max_results_range() {
        for command in ["vision-search", "vision-web-search"] {
            for bad in ["0", "21"] {
                let err = parse_error(&[command, "cat.jpg", "--max-results", bad]);
                assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
            }
        }

        match parse(&["vision-search", "cat.jpg", "--max-results", "20"]).command {
            Commands::VisionSearch { max_results, .. } => assert_eq!(max_results, 20),
            _ => panic!("expected vision-search"),
        }
        match parse(&["vision-web-search", "cat.jpg"]).command {
            Commands::VisionWebSearch { max_results, .. } => assert_eq!(max_results, 5),
            _ => panic!("expected vision-web-search"),
        }
    }

    #[test]
    fn test_usage_errors_exit_one() {
        assert_eq!(usage_exit_code(&parse_error(&["analyze-image"])), 1);
        assert_eq!(usage_exit_code(&parse_error(&["no-such-command"])), 1);
        assert_eq!(usage_exit_code(&parse_error(&["--help"])), 0);
        assert_eq!(usage_exit_code(&parse_error(&["--version"])), 0);
    }

    #[test]
    fn test_format_analysis_empty_objects() {
        let out = format_analysis(&AnalysisResult {
            scene: "A sunny park.".to_string(),
            objects: Some(vec![]),
        });
        assert_eq!(out, "Scene:\nA sunny park.\n\nDetected objects:\n  (none)");
    }
}
