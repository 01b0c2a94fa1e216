use crate::error::Result;
use crate::vision::types::{
    AnalysisResult, AnalyzeOptions, ChatOptions, ChatResult, OcrOptions, OcrResult,
    SearchOptions, SearchResult, WebSearchOptions, WebSearchResult,
};
use std::path::Path;

/// The operations a vision backend offers.
///
/// Implemented by [`crate::vision::VisionClient`]; front-ends take `impl VisionService`
/// so a canned implementation can stand in for the network.
pub trait VisionService {
    async fn analyze(&self, image_path: &Path, options: &AnalyzeOptions) -> Result<AnalysisResult>;

    async fn extract_text(&self, image_path: &Path, options: &OcrOptions) -> Result<OcrResult>;

    async fn process_video(&self, video_path: &Path) -> Result<AnalysisResult>;

    async fn vision_search(&self, image_path: &Path, options: &SearchOptions)
        -> Result<SearchResult>;

    async fn vision_web_search(
        &self,
        image_path: &Path,
        options: &WebSearchOptions,
    ) -> Result<WebSearchResult>;

    async fn vision_chat(
        &self,
        image_path: &Path,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<ChatResult>;
}
