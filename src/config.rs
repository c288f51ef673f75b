use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub import: ImportConfig,
    pub chat: ChatConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persistent store
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Uploads larger than this are rejected before parsing
    pub max_file_size_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Lower bound for the simulated reply delay
    pub reply_min_delay_ms: u64,
    /// Upper bound for the simulated reply delay
    pub reply_max_delay_ms: u64,
    /// Per-character scaling of the reply delay
    pub reply_per_char_ms: u64,
    /// Conversation created when none exists yet
    pub default_conversation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Directory the render command writes fragments into
    pub output_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: "data/pharmacare".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            import: ImportConfig {
                max_file_size_mb: 10,
            },
            chat: ChatConfig {
                reply_min_delay_ms: 300,
                reply_max_delay_ms: 1200,
                reply_per_char_ms: 30,
                default_conversation: "Support Team".to_string(),
            },
            render: RenderConfig {
                output_dir: "./output".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// defaults, then optional config files, then `PHARMACARE_*` env vars.
    pub fn load() -> Result<Self> {
        let defaults = AppConfig::default();
        let config = Config::builder()
            .set_default("storage.data_dir", defaults.storage.data_dir)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default("import.max_file_size_mb", defaults.import.max_file_size_mb as i64)?
            .set_default("chat.reply_min_delay_ms", defaults.chat.reply_min_delay_ms as i64)?
            .set_default("chat.reply_max_delay_ms", defaults.chat.reply_max_delay_ms as i64)?
            .set_default("chat.reply_per_char_ms", defaults.chat.reply_per_char_ms as i64)?
            .set_default("chat.default_conversation", defaults.chat.default_conversation)?
            .set_default("render.output_dir", defaults.render.output_dir)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("PHARMACARE").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("storage.data_dir must not be empty"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        if self.import.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("max_file_size_mb must be greater than 0"));
        }

        if self.chat.reply_min_delay_ms > self.chat.reply_max_delay_ms {
            return Err(anyhow::anyhow!(
                "reply_min_delay_ms must not exceed reply_max_delay_ms"
            ));
        }

        if self.chat.default_conversation.trim().is_empty() {
            return Err(anyhow::anyhow!("default_conversation must not be empty"));
        }

        if self.render.output_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("render.output_dir must not be empty"));
        }

        Ok(())
    }
}
