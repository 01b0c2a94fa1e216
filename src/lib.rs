//! # zai-vision
//!
//! Client for the Z.ai (Zhipu AI) GLM-4V vision model: scene analysis, OCR and
//! image-driven search prompts over the chat completions API.
//!
//! ```rust,no_run
//! use zai_vision::{AnalyzeOptions, VisionClient, VisionService};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads ZAI_API_KEY, ZAI_BASE_URL, ZAI_MODEL_VISION, ...
//!     let client = VisionClient::from_env()?;
//!
//!     let options = AnalyzeOptions {
//!         detect_objects: true,
//!         ..Default::default()
//!     };
//!     let analysis = client.analyze(Path::new("photo.jpg"), &options).await?;
//!     println!("{}", analysis.scene);
//!     Ok(())
//! }
//! ```
//!
//! Rate-limited and unreachable requests are retried up to `ZAI_MAX_RETRIES` times.
//! Authentication and request errors fail on the first attempt.

pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod utils;
pub mod vision;

pub use config::ClientConfig;
pub use error::{ErrorKind, Result, VisionError};
pub use llm::{RetryPolicy, VisionService};
pub use vision::{
    AnalysisResult, AnalyzeOptions, ChatOptions, ChatResult, DetailLevel, DetectedObject,
    OcrOptions, OcrResult, QueryType, SearchHit, SearchOptions, SearchResult, SearchType,
    VisionClient, WebSearchOptions, WebSearchResult,
};
