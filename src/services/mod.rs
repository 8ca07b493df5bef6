// src/services/mod.rs
//
// Outbound integrations: social identity providers and error monitoring

pub mod monitoring;
pub mod naver;
pub mod social;

// Re-export commonly used types for convenience
pub use naver::{NaverConfig, NaverProvider};
pub use social::ProviderRegistry;
