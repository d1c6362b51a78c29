//! Broker connection and topic configuration.
//!
//! Loaded once at startup from a TOML file under the user config directory,
//! with per-key environment overrides, then validated and passed into the
//! core by reference. Core logic never reads the environment itself.

use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

const CONFIG_DIR: &str = "wifi-presence";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming the config file, overriding the default path.
const CONFIG_PATH_VAR: &str = "WIFI_PRESENCE_CONFIG";

/// Broker endpoint, credentials, and the topic namespace prefix for state
/// topics. Immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublishTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Namespace prefix for state topics, e.g. `wifi/clients`
    pub topic: String,
}

impl Default for PublishTarget {
    fn default() -> Self {
        PublishTarget {
            host: String::new(),
            port: 1883,
            user: String::new(),
            password: String::new(),
            topic: String::new(),
        }
    }
}

impl PublishTarget {
    /// Loads the configuration file if present, applies environment
    /// overrides, and validates the result. A missing file is not an error
    /// as long as the environment supplies a complete configuration.
    pub async fn load() -> Result<Self> {
        let path = config_path();

        let mut target = if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| eyre!("Failed to check config file {}: {}", path.display(), e))?
        {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

            debug!("loaded configuration from {}", path.display());
            toml::from_str(&content)
                .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?
        } else {
            warn!(
                "config file {} does not exist, relying on environment variables",
                path.display()
            );
            PublishTarget::default()
        };

        target.apply_env_overrides()?;
        target.validate()?;
        Ok(target)
    }

    /// Earlier deployments configured everything through MQTT_* process
    /// variables; each one still takes precedence over the file.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = env::var("MQTT_HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("MQTT_PORT") {
            self.port = port
                .parse()
                .map_err(|_| eyre!("MQTT_PORT must be numeric, got {:?}", port))?;
        }
        if let Ok(user) = env::var("MQTT_USER") {
            self.user = user;
        }
        if let Ok(password) = env::var("MQTT_PASS") {
            self.password = password;
        }
        if let Ok(topic) = env::var("MQTT_TOPIC") {
            self.topic = topic;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.host.is_empty() {
            return Err(eyre!("Malformed configuration: broker host missing"));
        }
        if self.port == 0 {
            return Err(eyre!("Malformed configuration: broker port must be nonzero"));
        }
        if self.user.is_empty() {
            return Err(eyre!("Malformed configuration: broker user missing"));
        }
        // Topics are joined with '/', so a trailing separator would produce
        // empty path segments.
        self.topic = self.topic.trim_end_matches('/').to_string();
        if self.topic.is_empty() {
            return Err(eyre!("Malformed configuration: topic prefix missing"));
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_VAR) {
        return PathBuf::from(path);
    }

    let mut path = dirs::config_dir().unwrap_or_else(|| {
        warn!("Could not determine config directory, using current directory");
        PathBuf::from(".")
    });
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global, so every test touching them
    // runs under this lock and removes what it set.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: [&str; 5] =
        ["MQTT_HOST", "MQTT_PORT", "MQTT_USER", "MQTT_PASS", "MQTT_TOPIC"];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    fn valid_target() -> PublishTarget {
        PublishTarget {
            host: "broker.local".into(),
            port: 1883,
            user: "wifi".into(),
            password: "secret".into(),
            topic: "wifi/clients".into(),
        }
    }

    #[test]
    fn parses_a_complete_config_file() {
        let parsed: PublishTarget = toml::from_str(
            r#"
                host = "broker.local"
                port = 1883
                user = "wifi"
                password = "secret"
                topic = "wifi/clients"
            "#,
        )
        .unwrap();
        assert_eq!(parsed, valid_target());
    }

    #[test]
    fn missing_port_falls_back_to_mqtt_default() {
        let parsed: PublishTarget = toml::from_str(
            r#"
                host = "broker.local"
                user = "wifi"
                password = "secret"
                topic = "wifi/clients"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.port, 1883);
    }

    #[test]
    fn validation_rejects_missing_keys() {
        for strip in ["host", "user", "topic"] {
            let mut target = valid_target();
            match strip {
                "host" => target.host.clear(),
                "user" => target.user.clear(),
                _ => target.topic.clear(),
            }
            assert!(target.validate().is_err(), "expected {strip} to be required");
        }

        let mut target = valid_target();
        target.port = 0;
        assert!(target.validate().is_err());
    }

    #[test]
    fn validation_accepts_an_empty_password() {
        let mut target = valid_target();
        target.password.clear();
        assert!(target.validate().is_ok());
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        env::set_var("MQTT_HOST", "attic.local");
        env::set_var("MQTT_PORT", "8883");
        env::set_var("MQTT_USER", "presence");
        env::set_var("MQTT_PASS", "hunter2");
        env::set_var("MQTT_TOPIC", "net/wifi");

        let mut target = valid_target();
        let result = target.apply_env_overrides();
        clear_override_vars();
        result.unwrap();

        assert_eq!(
            target,
            PublishTarget {
                host: "attic.local".into(),
                port: 8883,
                user: "presence".into(),
                password: "hunter2".into(),
                topic: "net/wifi".into(),
            }
        );
    }

    #[test]
    fn unset_env_leaves_file_values_untouched() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_override_vars();

        let mut target = valid_target();
        target.apply_env_overrides().unwrap();
        assert_eq!(target, valid_target());
    }

    #[test]
    fn non_numeric_port_override_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        env::set_var("MQTT_PORT", "not-a-port");
        let mut target = valid_target();
        let result = target.apply_env_overrides();
        clear_override_vars();

        assert!(result.is_err());
        assert_eq!(target.port, 1883, "a rejected override must not change the port");
    }

    #[test]
    fn validation_trims_trailing_topic_separator() {
        let mut target = valid_target();
        target.topic = "wifi/clients/".into();
        target.validate().unwrap();
        assert_eq!(target.topic, "wifi/clients");
    }
}
