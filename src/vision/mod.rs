pub mod client;
pub mod parser;
pub mod prompts;
pub mod types;

pub use client::VisionClient;
pub use parser::parse_objects;
pub use types::{
    AnalysisResult, AnalyzeOptions, ChatOptions, ChatResult, DetailLevel, DetectedObject,
    OcrOptions, OcrResult, QueryType, SearchHit, SearchOptions, SearchResult, SearchType,
    WebSearchOptions, WebSearchResult,
};
