pub mod api;
pub mod classify;
pub mod dispatch;
pub mod error;
pub mod github;
pub mod logging;
pub mod message;
pub mod routes;
pub mod signature;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::dispatch::Deliver;
use crate::error::RelayError;
use crate::routes::{DEFAULT_ROUTE, RouteTable};

pub const SECRET_ENV: &str = "WEBHOOK_SECRET";
pub const REPOSITORY_URL_ENV: &str = "REPOSITORY_URL";
const DEFAULT_WEBHOOK_ENV: &str = "DISCORD_WEBHOOK_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Subpath -> route. `"/"` is the fallback for unmatched paths.
    #[serde(default)]
    pub routes: BTreeMap<String, RouteConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RouteConfig {
    /// Name of the environment variable holding the Discord webhook URL.
    pub discord_webhook_env: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        let mut routes = BTreeMap::new();
        routes.insert(
            DEFAULT_ROUTE.to_string(),
            RouteConfig {
                discord_webhook_env: DEFAULT_WEBHOOK_ENV.to_string(),
            },
        );
        Self { routes }
    }
}

/// Load and parse the configuration file.
///
/// A missing file yields the built-in table that sends everything to
/// `$DISCORD_WEBHOOK_URL`.
pub fn load_config(path: impl AsRef<Path>) -> Result<RelayConfig, RelayError> {
    let path = path.as_ref();
    let config_str = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No config file at {:?}, using the default route table", path);
            return Ok(RelayConfig::default());
        }
        Err(e) => {
            return Err(RelayError::ConfigError(format!(
                "Failed to read config file {:?}: {}",
                path, e
            )));
        }
    };

    toml::from_str(&config_str).map_err(|e| {
        RelayError::ConfigError(format!("Failed to parse config file {:?}: {}", path, e))
    })
}

pub struct AppState {
    pub routes: RouteTable,
    pub webhook_secret: Option<String>,
    /// Where non-POST requests are redirected.
    pub repository_url: String,
    pub deliverer: Arc<dyn Deliver>,
}

impl AppState {
    /// Resolves everything that comes from the environment, once.
    pub fn from_config<F>(
        config: &RelayConfig,
        lookup: F,
        deliverer: Arc<dyn Deliver>,
    ) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let routes = RouteTable::from_config(config, &lookup)?;

        let webhook_secret = lookup(SECRET_ENV).filter(|s| !s.is_empty());
        if webhook_secret.is_none() {
            warn!("{} not set -- every webhook will be rejected as unauthorized", SECRET_ENV);
        }

        let repository_url = lookup(REPOSITORY_URL_ENV)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RelayError::ConfigError(format!("{} is not set", REPOSITORY_URL_ENV)))?;

        Ok(Self {
            routes,
            webhook_secret,
            repository_url,
            deliverer,
        })
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DeliveryError;
    use crate::message::WebhookMessage;

    struct NoopDeliverer;

    #[async_trait::async_trait]
    impl Deliver for NoopDeliverer {
        async fn deliver(&self, _: &str, _: &WebhookMessage) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    fn env(key: &str) -> Option<String> {
        match key {
            "DISCORD_WEBHOOK_URL" => Some("https://discord.test/hook".into()),
            "WEBHOOK_SECRET" => Some("s3cret".into()),
            "REPOSITORY_URL" => Some("https://github.com/octocat/hello-world".into()),
            _ => None,
        }
    }

    #[test]
    fn state_resolves_from_environment() {
        let state = AppState::from_config(&RelayConfig::default(), env, Arc::new(NoopDeliverer))
            .unwrap();
        assert_eq!(state.webhook_secret.as_deref(), Some("s3cret"));
        assert_eq!(state.repository_url, "https://github.com/octocat/hello-world");
        assert_eq!(state.routes.resolve("/x"), Some("https://discord.test/hook"));
    }

    #[test]
    fn missing_secret_is_tolerated() {
        let lookup = |key: &str| if key == SECRET_ENV { None } else { env(key) };
        let state =
            AppState::from_config(&RelayConfig::default(), lookup, Arc::new(NoopDeliverer))
                .unwrap();
        assert!(state.webhook_secret.is_none());
    }

    #[test]
    fn missing_repository_url_fails() {
        let lookup = |key: &str| if key == REPOSITORY_URL_ENV { None } else { env(key) };
        let result = AppState::from_config(&RelayConfig::default(), lookup, Arc::new(NoopDeliverer));
        assert!(matches!(result, Err(RelayError::ConfigError(_))));
    }

    #[test]
    fn missing_config_file_uses_default_table() {
        let config = load_config("/nonexistent/relay_config.toml").unwrap();
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes["/"].discord_webhook_env, "DISCORD_WEBHOOK_URL");
    }

    #[test]
    fn invalid_config_file_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "discord_push_relay_invalid_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "routes = 3").unwrap();
        let result = load_config(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(RelayError::ConfigError(_))));
    }
}
