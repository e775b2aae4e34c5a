mod channel;
mod context;
mod extractor;
mod llm;
mod memory;
mod quota;
mod server;

pub use channel::*;
pub use context::*;
pub use extractor::*;
pub use llm::*;
pub use memory::*;
pub use quota::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        // Server port must be non-zero.
        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        // Server host must not be empty.
        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        // Memory service base_url must not be empty.
        if self.memory.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "memory.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        }

        // The splitter cannot make progress when the overlap swallows
        // the whole window.
        if self.context.chunk_overlap >= self.context.chunk_size {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "context.chunk_overlap".into(),
                message: format!(
                    "chunk_overlap ({}) must be smaller than chunk_size ({})",
                    self.context.chunk_overlap, self.context.chunk_size
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.context.similarity_threshold) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "context.similarity_threshold".into(),
                message: "similarity_threshold must be within [0.0, 1.0]".into(),
            });
        }

        // Warn when the webhook handshake cannot be completed.
        if self.channel.verify_token.is_none() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "channel.verify_token".into(),
                message: "no verify_token set — GET /webhook verification will always fail".into(),
            });
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)"
                    .into(),
            });
        }

        errors
    }
}
