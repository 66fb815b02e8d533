use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use tracing::{info, warn};

/// Configuration for the CardWise server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server binds to
    pub host: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Base URL of the Ollama server used to label card photos
    pub ollama_host: String,
    /// Vision model asked to label card photos
    pub ollama_model: String,
    /// Directory database backups are written to
    pub backup_dir: String,
    /// Duration between periodic backups in minutes, 0 disables them
    pub backup_interval_minutes: u64,
    /// Number of periodic backups to keep
    pub backup_count: u32,
    /// Whether the admin user and sample cards are created at startup
    pub seed_on_startup: bool,
    /// Directory for daily rolling log files; logs go to stdout only when unset
    pub log_dir: Option<String>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub ollama_host: Option<String>,
    #[serde(default)]
    pub ollama_model: Option<String>,
    #[serde(default)]
    pub backup_dir: Option<String>,
    /// Optional update for backup interval (in minutes)
    #[serde(default)]
    pub backup_interval_minutes: Option<u64>,
    #[serde(default)]
    pub backup_count: Option<u32>,
    #[serde(default)]
    pub seed_on_startup: Option<bool>,
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Base URL `cardwise-cli` talks to; the server ignores it
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "cardwise", about = "Sports card collection server")]
pub struct CliArgs {
    /// Config file to read instead of the one in the user config directory
    #[clap(long, env = "CARDWISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to bind
    #[clap(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[clap(long, env = "PORT")]
    pub port: Option<u16>,

    /// Ollama server URL
    #[clap(long, env = "OLLAMA_HOST")]
    pub ollama_host: Option<String>,

    /// Ollama vision model
    #[clap(long, env = "OLLAMA_MODEL")]
    pub ollama_model: Option<String>,

    /// Backup directory
    #[clap(long, env = "BACKUP_DIR")]
    pub backup_dir: Option<String>,

    /// Backup interval in minutes
    #[clap(long, env = "BACKUP_INTERVAL_MINUTES")]
    pub backup_interval_minutes: Option<u64>,

    /// Number of backups to keep
    #[clap(long, env = "BACKUP_COUNT")]
    pub backup_count: Option<u32>,

    /// Seed the admin user and sample cards at startup
    #[clap(long, env = "SEED_ON_STARTUP")]
    pub seed_on_startup: Option<bool>,

    /// Directory for rolling log files
    #[clap(long, env = "LOG_DIR")]
    pub log_dir: Option<String>,

    /// Debug mode
    #[clap(long, env = "CARDWISE_DEBUG", default_value_t = false)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[clap(long, env = "CARDWISE_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            host: update.host.unwrap_or(self.host),
            port: update.port.unwrap_or(self.port),
            ollama_host: update.ollama_host.unwrap_or(self.ollama_host),
            ollama_model: update.ollama_model.unwrap_or(self.ollama_model),
            backup_dir: update.backup_dir.unwrap_or(self.backup_dir),
            backup_interval_minutes: update.backup_interval_minutes.unwrap_or(self.backup_interval_minutes),
            backup_count: update.backup_count.unwrap_or(self.backup_count),
            seed_on_startup: update.seed_on_startup.unwrap_or(self.seed_on_startup),
            log_dir: update.log_dir.or(self.log_dir),
        }
    }

    /// Returns the backup interval as a Duration, or `None` when periodic backups are off
    pub fn backup_interval(&self) -> Option<Duration> {
        (self.backup_interval_minutes > 0).then(|| Duration::from_secs(self.backup_interval_minutes * 60))
    }

    /// The `host:port` pair the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Returns the base (default) configuration
///
/// When a data directory is known, the database and backups live under it.
pub fn base_config(data_dir: Option<PathBuf>) -> Config {
    let in_data_dir = |name: &str| {
        data_dir
            .as_ref()
            .map_or(name.to_string(), |path| path.join(name).to_string_lossy().to_string())
    };

    Config {
        database_url: in_data_dir("cardwise.db"),
        host: "0.0.0.0".to_string(),
        port: 3000,
        ollama_host: crate::scan::DEFAULT_OLLAMA_HOST.to_string(),
        ollama_model: crate::scan::DEFAULT_OLLAMA_MODEL.to_string(),
        backup_dir: in_data_dir("backups"),
        backup_interval_minutes: 20,
        backup_count: 10,
        seed_on_startup: false,
        log_dir: None,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments and environment variables
pub fn config_from_args(args: &CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url.clone(),
        host: args.host.clone(),
        port: args.port,
        ollama_host: args.ollama_host.clone(),
        ollama_model: args.ollama_model.clone(),
        backup_dir: args.backup_dir.clone(),
        backup_interval_minutes: args.backup_interval_minutes,
        backup_count: args.backup_count,
        seed_on_startup: args.seed_on_startup,
        log_dir: args.log_dir.clone(),
        server_url: None,
    }
}

/// The `config.toml` under the platform config directory, if one is known
pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("com", "cardwise", "cardwise").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
///
/// ### Errors
///
/// Fails when the config file exists but cannot be read or parsed, or when
/// the merged configuration is unusable (`backup_count` of 0).
pub fn get_config(args: &CliArgs) -> Result<Config, String> {
    let project_dirs = ProjectDirs::from("com", "cardwise", "cardwise");
    if project_dirs.is_none() {
        warn!("Could not determine XDG directories, using the working directory");
    }

    let data_dir = project_dirs
        .as_ref()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .filter(|path| {
            if !path.exists() {
                info!("Data directory not found at {:?}, using the working directory", path);
            }
            path.exists()
        });

    let config_file = args.config.clone().or_else(default_config_file);

    let config = base_config(data_dir)
        .apply_update(config_from_file(config_file)?)
        .apply_update(config_from_args(args));

    if config.backup_count == 0 {
        return Err("backup_count must be at least 1".to_string());
    }

    info!(
        "Final configuration: database_url={}, bind={}, ollama={} ({}), backup_interval={}min, backup_count={}",
        config.database_url,
        config.bind_address(),
        config.ollama_host,
        config.ollama_model,
        config.backup_interval_minutes,
        config.backup_count
    );

    Ok(config)
}
