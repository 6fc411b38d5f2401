//! perftrack-ai: the generate-proxy client and the AI-backed helpers built on it.

pub mod assistant;
pub mod error;
pub mod proxy;

pub use assistant::{AchievementInsight, MilestoneDraft, generate_report, or_fallback};
pub use error::AiError;
pub use proxy::{DEFAULT_ENDPOINT, DEFAULT_MODEL, GenerateRequest, ProxyClient, TextGenerator};
