use anyhow::{Context, Result, bail};
use perftrack_core::Session;
use perftrack_core::time::parse_tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// `$PERFTRACK_HOME`, or `~/.perftrack`.
pub fn perftrack_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("PERFTRACK_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".perftrack"))
}

pub fn ensure_perftrack_home() -> Result<PathBuf> {
    let dir = perftrack_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_utc: Option<String>,
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            user_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            department: None,
            timezone: default_timezone(),
            created_at_utc: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn session(&self) -> Session {
        let session = Session::new(&self.user_id);
        match self.department.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(d) => session.with_department(d),
            None => session,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            bail!("profile has no user id");
        }
        parse_tz(&self.timezone)?;
        Ok(())
    }
}

pub fn profile_path() -> Result<PathBuf> {
    Ok(ensure_perftrack_home()?.join("profile.json"))
}

pub fn store_path() -> Result<PathBuf> {
    Ok(ensure_perftrack_home()?.join("store.json"))
}

pub fn write_profile(profile: &Profile) -> Result<()> {
    let p = profile_path()?;
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// The saved profile, or `None` before `perftrack setup` has run.
pub fn read_profile() -> Result<Option<Profile>> {
    let p = profile_path()?;
    if !p.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let profile: Profile = serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    profile.validate().with_context(|| format!("invalid profile {}", p.display()))?;
    Ok(Some(profile))
}

pub fn require_profile() -> Result<Profile> {
    match read_profile()? {
        Some(p) => Ok(p),
        None => bail!("No profile found. Run: perftrack setup"),
    }
}
