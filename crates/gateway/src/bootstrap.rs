//! AppState construction and background-task spawning extracted from
//! `main.rs`, shared by `serve` and any future one-shot commands.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};

use sf_domain::config::{Config, ConfigSeverity};
use sf_memory::RestScriptMemoryClient;
use sf_providers::OpenAiCompatProvider;
use sf_quota::QuotaTracker;

use crate::delivery::ChannelClient;
use crate::extract::RestTextExtractor;
use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Quota tracker ────────────────────────────────────────────────
    let quota = Arc::new(QuotaTracker::new(config.quota.clone()));
    tracing::info!(state_path = %config.quota.state_path.display(), "quota tracker ready");

    // ── Similarity-search client ─────────────────────────────────────
    let memory = Arc::new(
        RestScriptMemoryClient::new(&config.memory).context("creating memory client")?,
    );
    tracing::info!(url = %config.memory.base_url, "memory client ready");

    // ── LLM provider ─────────────────────────────────────────────────
    let llm = Arc::new(
        OpenAiCompatProvider::from_config(&config.llm).context("initializing LLM provider")?,
    );
    tracing::info!(model = %config.llm.default_model, "LLM provider ready");

    // ── Text extractor ───────────────────────────────────────────────
    let extractor = Arc::new(
        RestTextExtractor::new(&config.extractor).context("creating extraction client")?,
    );
    tracing::info!(url = %config.extractor.base_url, "extraction client ready");

    // ── Message delivery ─────────────────────────────────────────────
    let delivery =
        Arc::new(ChannelClient::new(&config.channel).context("creating channel client")?);
    tracing::info!(graph_url = %config.channel.graph_url, "channel client ready");

    // ── API token (read once, hash for constant-time comparison) ────
    // Priority: config.server.api_token > env var (config.server.api_token_env)
    let api_token_hash = {
        let env_var = &config.server.api_token_env;
        let token = config
            .server
            .api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| ("config".to_string(), t.to_string()))
            .or_else(|| {
                std::env::var(env_var)
                    .ok()
                    .filter(|t| !t.is_empty())
                    .map(|t| (format!("env:{env_var}"), t))
            });
        match token {
            Some((source, t)) => {
                tracing::info!(source = %source, "API bearer-token auth enabled");
                Some(Sha256::digest(t.as_bytes()).to_vec())
            }
            None => {
                tracing::warn!(
                    "API bearer-token auth DISABLED — set server.api_token in config.toml or {env_var} env var"
                );
                None
            }
        }
    };

    Ok(AppState {
        config,
        quota,
        memory,
        llm,
        extractor,
        delivery,
        api_token_hash,
    })
}

/// Spawn the long-running background tokio tasks.
///
/// Call this **after** [`build_app_state`] when running the HTTP server.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Periodic usage-store flush (safety net) ──────────────────────
    {
        let quota = state.quota.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                quota.flush();
            }
        });
    }
    tracing::info!("background tasks spawned");
}
