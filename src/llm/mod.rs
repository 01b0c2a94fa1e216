pub mod llm_client;
pub mod retry;
pub mod zai;

pub use llm_client::VisionService;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use zai::{ChatRequest, Message, ProviderResponse, Usage, ZaiClient};
