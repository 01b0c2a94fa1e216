use crate::error::VisionError;
use crate::llm::Usage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much detail `analyze` asks the model for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Low,
    #[default]
    High,
    Auto,
}

/// Prompt family for `vision_search`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Web,
    Products,
    Similar,
}

/// Prompt family for `vision_web_search`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    #[default]
    Information,
    Shopping,
    Entertainment,
}

macro_rules! lowercase_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = VisionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(VisionError::InvalidRequest {
                        message: format!("unknown {}: {other}", $what),
                        details: Some(format!("expected one of: {}", [$($name),+].join(", "))),
                        code: None,
                    }),
                }
            }
        }
    };
}

lowercase_enum!(DetailLevel, "detail level", {
    Low => "low",
    High => "high",
    Auto => "auto",
});

lowercase_enum!(SearchType, "search type", {
    Web => "web",
    Products => "products",
    Similar => "similar",
});

lowercase_enum!(QueryType, "query type", {
    Information => "information",
    Shopping => "shopping",
    Entertainment => "entertainment",
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeOptions {
    pub detail: DetailLevel,
    /// Ask for an "Objects:" list and parse it into `AnalysisResult::objects`
    pub detect_objects: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrOptions {
    /// Language hint, or "auto" to let the model decide
    pub language: String,
    pub preserve_formatting: bool,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            preserve_formatting: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub search_type: SearchType,
    pub max_results: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_type: SearchType::default(),
            max_results: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebSearchOptions {
    pub query_type: QueryType,
    pub max_results: u32,
}

impl Default for WebSearchOptions {
    fn default() -> Self {
        Self {
            query_type: QueryType::default(),
            max_results: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Overrides the configured model for this call
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    /// In `[0, 1]`
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub scene: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<DetectedObject>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub analysis: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}
