//! Shared LLM service used by the tutor.
//!
//! Two logical profiles are exposed through [`LlmServiceProfiles`]:
//! - **chat**: text generation for rephrasing and open-ended replies;
//! - **embedding**: optional embedding model for semantic corpus search.
//!
//! Providers: local Ollama and any OpenAI-compatible endpoint (OpenAI,
//! OpenRouter, vLLM, ...).

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, ConfigError, Result};
pub use health_service::{HealthService, HealthStatus};
pub use service_profiles::LlmServiceProfiles;
