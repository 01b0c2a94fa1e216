use super::parser::parse_objects;
use super::prompts::{self, DEFAULT_CHAT_PROMPT};
use super::types::{
    AnalysisResult, AnalyzeOptions, ChatOptions, ChatResult, OcrOptions, OcrResult,
    SearchHit, SearchOptions, SearchResult, WebSearchOptions, WebSearchResult,
};
use crate::config::ClientConfig;
use crate::error::{Result, VisionError};
use crate::llm::{Message, ProviderResponse, Sleeper, VisionService, ZaiClient};
use crate::utils::encode_as_data_url;
use std::path::Path;
use std::sync::Arc;

const ANALYZE_MAX_TOKENS: u32 = 1500;
const OCR_MAX_TOKENS: u32 = 4096;
const SEARCH_MAX_TOKENS: u32 = 500;
const WEB_SEARCH_MAX_TOKENS: u32 = 1000;
const CHAT_MAX_TOKENS: u32 = 2000;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const OCR_TEMPERATURE: f32 = 0.1;

const SEARCH_RESULT_TITLE: &str = "Visual search query";

const WEB_SEARCH_SUGGESTIONS: [&str; 3] = [
    "Search for similar images online",
    "Look up product details and pricing",
    "Find related articles and information",
];

const VIDEO_UNSUPPORTED: &str =
    "Video processing is not supported: frame extraction requires external media tooling";

/// Vision operations over the Z.ai chat completions API.
///
/// Every operation encodes one image, sends one message through the shared retry
/// pipeline and shapes the reply into an operation-specific result.
pub struct VisionClient {
    zai: ZaiClient,
}

impl VisionClient {
    /// Fails with an authentication error if `config.api_key` is empty.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            zai: ZaiClient::new(config)?,
        })
    }

    /// Build a client from `ZAI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.zai = self.zai.with_sleeper(sleeper);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        self.zai.config()
    }

    async fn ask(
        &self,
        image_path: &Path,
        prompt: &str,
        model: Option<&str>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderResponse> {
        let data_url = encode_as_data_url(image_path).await?;
        let request = self.zai.build_request(
            model,
            Message::user_with_image(data_url, prompt),
            max_tokens,
            temperature,
        );
        self.zai.create_chat_completion(&request).await
    }
}

impl VisionService for VisionClient {
    async fn analyze(&self, image_path: &Path, options: &AnalyzeOptions) -> Result<AnalysisResult> {
        tracing::info!(
            image = %image_path.display(),
            detail = %options.detail,
            detect_objects = options.detect_objects,
            "Analyzing image"
        );

        let prompt = prompts::analyze_prompt(options.detail, options.detect_objects);
        let response = self
            .ask(image_path, &prompt, None, ANALYZE_MAX_TOKENS, DEFAULT_TEMPERATURE)
            .await?;
        let scene = response.first_content().to_string();

        let objects = if options.detect_objects {
            let objects = parse_objects(&scene).unwrap_or_default();
            tracing::debug!(count = objects.len(), "Parsed objects");
            Some(objects)
        } else {
            None
        };

        Ok(AnalysisResult { scene, objects })
    }

    async fn extract_text(&self, image_path: &Path, options: &OcrOptions) -> Result<OcrResult> {
        tracing::info!(
            image = %image_path.display(),
            language = %options.language,
            "Extracting text"
        );

        let prompt = prompts::ocr_prompt(&options.language, options.preserve_formatting);
        let response = self
            .ask(image_path, &prompt, None, OCR_MAX_TOKENS, OCR_TEMPERATURE)
            .await?;

        let language = Some(options.language.trim())
            .filter(|lang| !lang.is_empty() && !lang.eq_ignore_ascii_case("auto"))
            .map(str::to_string);

        Ok(OcrResult {
            text: response.first_content().trim().to_string(),
            language,
        })
    }

    async fn process_video(&self, video_path: &Path) -> Result<AnalysisResult> {
        tracing::warn!(video = %video_path.display(), "Video processing requested");
        Err(VisionError::Processing {
            message: VIDEO_UNSUPPORTED.to_string(),
            details: Some(video_path.display().to_string()),
            code: None,
        })
    }

    async fn vision_search(&self, image_path: &Path, options: &SearchOptions) -> Result<SearchResult> {
        tracing::info!(
            image = %image_path.display(),
            search_type = %options.search_type,
            "Running vision search"
        );

        let prompt = prompts::search_prompt(options.search_type, options.max_results);
        let response = self
            .ask(image_path, &prompt, None, SEARCH_MAX_TOKENS, DEFAULT_TEMPERATURE)
            .await?;
        let query = response.first_content().to_string();

        // No real search backend: the model's suggested query is the only hit.
        Ok(SearchResult {
            results: vec![SearchHit {
                title: SEARCH_RESULT_TITLE.to_string(),
                description: Some(query.clone()),
            }],
            query,
        })
    }

    async fn vision_web_search(
        &self,
        image_path: &Path,
        options: &WebSearchOptions,
    ) -> Result<WebSearchResult> {
        tracing::info!(
            image = %image_path.display(),
            query_type = %options.query_type,
            "Running vision web search"
        );

        let prompt = prompts::web_search_prompt(options.query_type, options.max_results);
        let response = self
            .ask(image_path, &prompt, None, WEB_SEARCH_MAX_TOKENS, DEFAULT_TEMPERATURE)
            .await?;

        Ok(WebSearchResult {
            analysis: response.first_content().to_string(),
            suggestions: WEB_SEARCH_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        })
    }

    async fn vision_chat(
        &self,
        image_path: &Path,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<ChatResult> {
        let prompt = if prompt.trim().is_empty() {
            DEFAULT_CHAT_PROMPT
        } else {
            prompt
        };
        tracing::info!(image = %image_path.display(), model = ?options.model, "Vision chat");

        let response = self
            .ask(
                image_path,
                prompt,
                options.model.as_deref(),
                CHAT_MAX_TOKENS,
                options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            )
            .await?;

        Ok(ChatResult {
            response: response.first_content().to_string(),
            usage: response.usage,
        })
    }
}
