use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use perftrack_ai::ProxyClient;
use perftrack_core::Session;
use perftrack_core::time::today_in;

use crate::config::{Config, load_config};
use crate::file_store::JsonFileStore;
use crate::state::{Profile, require_profile, store_path};

/// Everything a data command needs: who is acting, where records live, and
/// how to reach the AI proxy.
pub struct App {
    pub profile: Profile,
    pub session: Session,
    pub config: Config,
    pub store: JsonFileStore,
    pub ai: ProxyClient,
}

impl App {
    pub async fn load() -> Result<Self> {
        let profile = require_profile()?;
        let config = load_config()?;
        let store = JsonFileStore::open(store_path()?).await?;
        Ok(Self {
            session: profile.session(),
            ai: config.proxy_client(),
            profile,
            config,
            store,
        })
    }

    /// Today's date in the profile timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        today_in(&self.profile.timezone, Utc::now())
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Find the one record whose id equals or starts with `needle`.
pub fn resolve<'a, T>(items: &'a [T], id_of: impl Fn(&T) -> &str, needle: &str, what: &str) -> Result<&'a T> {
    if let Some(exact) = items.iter().find(|i| id_of(i) == needle) {
        return Ok(exact);
    }
    let matches: Vec<&T> = items.iter().filter(|i| id_of(i).starts_with(needle)).collect();
    match matches.as_slice() {
        [one] => Ok(*one),
        [] => bail!("no {what} with id {needle}"),
        _ => bail!("{what} id {needle} is ambiguous ({} matches)", matches.len()),
    }
}
