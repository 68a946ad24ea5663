//! REST server configuration.
//!
//! Read from the environment once at startup. Handlers only ever see the resolved values.

use discharge_core::config::roster_path_from_env_value;
use discharge_core::constants::{
    DEFAULT_CHAT_DELAY_MS, DEFAULT_LOGIN_DELAY_MS, DEFAULT_MAIL_RELAY_TIMEOUT_MS,
    DEFAULT_MAIL_RELAY_URL, DEFAULT_REST_ADDR,
};
use discharge_core::CoreConfig;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct RestConfig {
    pub addr: String,
    pub mail_relay_url: String,
    pub mail_relay_timeout: Duration,
    /// Pause before an assistant answer is returned.
    pub chat_delay: Duration,
    pub login_delay: Duration,
    pub core: CoreConfig,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_REST_ADDR.into(),
            mail_relay_url: DEFAULT_MAIL_RELAY_URL.into(),
            mail_relay_timeout: Duration::from_millis(DEFAULT_MAIL_RELAY_TIMEOUT_MS),
            chat_delay: Duration::from_millis(DEFAULT_CHAT_DELAY_MS),
            login_delay: Duration::from_millis(DEFAULT_LOGIN_DELAY_MS),
            core: CoreConfig::default(),
        }
    }
}

impl RestConfig {
    /// # Environment Variables
    /// - `DC_REST_ADDR`: server address (default: "0.0.0.0:3000")
    /// - `DC_MAIL_RELAY_URL`: mail relay base URL (default: "http://localhost:5000")
    /// - `DC_MAIL_RELAY_TIMEOUT_MS`: relay call timeout (default: 10000)
    /// - `DC_CHAT_DELAY_MS`: pause before chat answers (default: 1200)
    /// - `DC_LOGIN_DELAY_MS`: pause before login answers (default: 500)
    /// - `DC_PATIENT_ROSTER`: optional roster YAML file
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_owned())
        };
        let millis = |key: &str, default: u64| -> anyhow::Result<Duration> {
            match lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) {
                Some(v) => v
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| anyhow::anyhow!("{key} must be a number of milliseconds: {e}")),
                None => Ok(Duration::from_millis(default)),
            }
        };

        Ok(Self {
            addr: text("DC_REST_ADDR", DEFAULT_REST_ADDR),
            mail_relay_url: text("DC_MAIL_RELAY_URL", DEFAULT_MAIL_RELAY_URL),
            mail_relay_timeout: millis("DC_MAIL_RELAY_TIMEOUT_MS", DEFAULT_MAIL_RELAY_TIMEOUT_MS)?,
            chat_delay: millis("DC_CHAT_DELAY_MS", DEFAULT_CHAT_DELAY_MS)?,
            login_delay: millis("DC_LOGIN_DELAY_MS", DEFAULT_LOGIN_DELAY_MS)?,
            core: CoreConfig::new(roster_path_from_env_value(lookup("DC_PATIENT_ROSTER")))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = RestConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.addr, "0.0.0.0:3000");
        assert_eq!(cfg.mail_relay_url, "http://localhost:5000");
        assert_eq!(cfg.chat_delay, Duration::from_millis(1200));
        assert_eq!(cfg.login_delay, Duration::from_millis(500));
        assert_eq!(cfg.mail_relay_timeout, Duration::from_secs(10));
        assert!(cfg.core.roster_path().is_none());
    }

    #[test]
    fn default_matches_unset_environment() {
        let from_env = RestConfig::from_lookup(lookup(&[])).unwrap();
        let default = RestConfig::default();
        assert_eq!(default.addr, from_env.addr);
        assert_eq!(default.mail_relay_url, from_env.mail_relay_url);
        assert_eq!(default.mail_relay_timeout, from_env.mail_relay_timeout);
        assert_eq!(default.chat_delay, from_env.chat_delay);
        assert_eq!(default.login_delay, from_env.login_delay);
    }

    #[test]
    fn reads_overrides() {
        let cfg = RestConfig::from_lookup(lookup(&[
            ("DC_REST_ADDR", "127.0.0.1:8080"),
            ("DC_CHAT_DELAY_MS", "0"),
            ("DC_MAIL_RELAY_URL", " http://relay:5000 "),
        ]))
        .unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:8080");
        assert_eq!(cfg.chat_delay, Duration::ZERO);
        assert_eq!(cfg.mail_relay_url, "http://relay:5000");
    }

    #[test]
    fn rejects_bad_delay_and_missing_roster() {
        assert!(RestConfig::from_lookup(lookup(&[("DC_LOGIN_DELAY_MS", "soon")])).is_err());
        assert!(
            RestConfig::from_lookup(lookup(&[("DC_PATIENT_ROSTER", "/no/such/roster.yaml")]))
                .is_err()
        );
    }
}
