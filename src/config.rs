use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use explorer_types::LlmProviderKind;

use explorer_engine::EngineConfig;

/// Layered configuration load: built-in defaults < config file < `EXPLORER_*`
/// environment variables. Built once at startup and handed to session
/// construction as an immutable record — the engine itself never reads the
/// environment.
#[derive(Debug, serde::Deserialize, Default)]
struct RawConfig {
    llm_provider: Option<String>,
    llm_model: Option<String>,
    llm_api_key: Option<String>,
    llm_temperature: Option<f32>,
    graph_store_uri: Option<String>,
    graph_store_user: Option<String>,
    graph_store_password: Option<String>,
    headless: Option<bool>,
    recursion_limit: Option<u32>,
    log_level: Option<String>,
    log_file: Option<String>,
}

pub struct LoadedConfig {
    pub engine: EngineConfig,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

pub fn load(config_path: Option<&Path>) -> Result<LoadedConfig> {
    let mut builder = config::Config::builder();

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
    } else {
        let default_local = Path::new("config/explorer.toml");
        if default_local.exists() {
            builder = builder.add_source(config::File::from(default_local.to_path_buf()).required(false));
        } else if let Some(mut dir) = dirs::config_dir() {
            dir.push("explorer-agent");
            dir.push("config.toml");
            builder = builder.add_source(config::File::from(dir).required(false));
        }
    }

    let raw: RawConfig = builder
        .add_source(config::Environment::with_prefix("EXPLORER").separator("_"))
        .build()
        .context("failed to assemble configuration layers")?
        .try_deserialize()
        .unwrap_or_default();

    let defaults = EngineConfig::default();

    let llm_provider = match raw.llm_provider.as_deref() {
        Some("anthropic") => LlmProviderKind::Anthropic,
        Some("gemini") => LlmProviderKind::Gemini,
        _ => LlmProviderKind::OpenAi,
    };

    let engine = EngineConfig {
        llm_provider,
        llm_model: raw.llm_model.unwrap_or(defaults.llm_model),
        llm_api_key: raw.llm_api_key.unwrap_or_default(),
        llm_temperature: raw.llm_temperature.unwrap_or(defaults.llm_temperature),
        graph_store_uri: raw.graph_store_uri.unwrap_or_default(),
        graph_store_user: raw.graph_store_user.unwrap_or_default(),
        graph_store_password: raw.graph_store_password.unwrap_or_default(),
        headless: raw.headless.unwrap_or(defaults.headless),
        recursion_limit: raw.recursion_limit.unwrap_or(defaults.recursion_limit),
        ..defaults
    };

    Ok(LoadedConfig {
        engine,
        log_level: raw.log_level.unwrap_or_else(|| "info".to_string()),
        log_file: raw.log_file.map(PathBuf::from),
    })
}
