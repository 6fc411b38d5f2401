use anyhow::{Context, Result};
use perftrack_ai::{DEFAULT_ENDPOINT, DEFAULT_MODEL, ProxyClient};
use perftrack_core::{DEFAULT_TONE, ReportType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_perftrack_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ai: AiSection,
    #[serde(default)]
    pub report: ReportSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSection {
    /// Generate proxy URL; the proxy holds the model credential.
    pub endpoint: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub tone: String,
    /// weekly, monthly or quarterly
    pub default_type: String,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            tone: DEFAULT_TONE.to_string(),
            default_type: ReportType::default().to_string(),
        }
    }
}

impl Config {
    pub fn proxy_client(&self) -> ProxyClient {
        ProxyClient::new(&self.ai.endpoint, &self.ai.model)
    }

    pub fn default_report_type(&self) -> Result<ReportType> {
        self.report
            .default_type
            .parse()
            .context("config.toml [report] default_type")
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_perftrack_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
