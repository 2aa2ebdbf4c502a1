use clap::Parser;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPIRED_MESSAGE: &str = "This has expired";

/* =======================
CLI ARGS
======================= */

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// JSON file listing the targets to keep updated
    #[arg(short, long)]
    pub targets: PathBuf,

    /// Label shown once a target has expired
    #[arg(short, long)]
    pub expired_message: Option<String>,

    /// Render a single tick and exit
    #[arg(long)]
    pub once: bool,
}

/* =======================
WIDGET CONFIG
======================= */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub expired_message: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            expired_message: DEFAULT_EXPIRED_MESSAGE.to_string(),
        }
    }
}

impl WidgetConfig {
    pub fn with_expired_message(message: impl Into<String>) -> Self {
        Self {
            expired_message: message.into(),
        }
    }
}

/* =======================
POLLING CONFIG
======================= */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    // used while nothing is about to expire
    pub relaxed_interval_ms: u64,
    pub urgent_interval_ms: u64,

    // a target is urgent when 0 < seconds remaining < this
    pub urgent_window_secs: i64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            relaxed_interval_ms: 5000,
            urgent_interval_ms: 1000,
            urgent_window_secs: 60,
        }
    }
}

impl PollingConfig {
    /// A zero interval would make the monitor spin without sleeping.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.relaxed_interval_ms == 0 {
            anyhow::bail!("relaxed_interval_ms must be greater than zero");
        }
        if self.urgent_interval_ms == 0 {
            anyhow::bail!("urgent_interval_ms must be greater than zero");
        }
        Ok(())
    }
}

/* =======================
MAIN CONFIG
======================= */

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub widget: WidgetConfig,
    pub polling: PollingConfig,
}

/* =======================
LOAD / CREATE CONFIG
======================= */

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let cfg: Config = serde_json::from_str(&content)?;
            cfg.polling.validate()?;
            Ok(cfg)
        } else {
            let cfg = Config::default();
            let content = serde_json::to_string_pretty(&cfg)?;
            std::fs::write(path, content)?;
            Ok(cfg)
        }
    }

    /// Apply `EXPIRED_MESSAGE`, `RELAXED_INTERVAL_MS` and `URGENT_INTERVAL_MS`
    /// on top of whatever was loaded. Unparseable or zero intervals are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(message) = env::var("EXPIRED_MESSAGE") {
            self.widget.expired_message = message;
        }

        if let Some(ms) = env::var("RELAXED_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
        {
            self.polling.relaxed_interval_ms = ms;
        }

        if let Some(ms) = env::var("URGENT_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
        {
            self.polling.urgent_interval_ms = ms;
        }

        self
    }

    /// CLI flags win over the file and the environment.
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(message) = &args.expired_message {
            self.widget.expired_message = message.clone();
        }
        self
    }
}
