//! Maps request paths to Discord webhook URLs.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::RelayConfig;
use crate::error::RelayError;

pub const DEFAULT_ROUTE: &str = "/";

/// Strips a single trailing slash, keeping the root path as is.
pub fn normalize_path(path: &str) -> &str {
    if path.is_empty() || path == DEFAULT_ROUTE {
        return DEFAULT_ROUTE;
    }
    path.strip_suffix('/').unwrap_or(path)
}

/// Route table with every destination already resolved to a URL.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    /// Resolves each configured route's environment variable through `lookup`.
    ///
    /// A variable that is unset or empty is a configuration error. A missing
    /// default route is only warned about: unmatched paths will then be
    /// answered with 404.
    pub fn from_config<F>(config: &RelayConfig, lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut routes = HashMap::new();
        for (path, route) in &config.routes {
            let url = lookup(&route.discord_webhook_env)
                .filter(|url| !url.is_empty())
                .ok_or_else(|| {
                    RelayError::ConfigError(format!(
                        "Route '{}' needs environment variable '{}', which is not set",
                        path, route.discord_webhook_env
                    ))
                })?;

            let key = normalize_path(path).to_string();
            if routes.insert(key.clone(), url).is_some() {
                return Err(RelayError::ConfigError(format!(
                    "Route '{}' is configured more than once",
                    key
                )));
            }
            info!("Route '{}' -> ${}", key, route.discord_webhook_env);
        }

        if !routes.contains_key(DEFAULT_ROUTE) {
            warn!(
                "No default route '{}' configured; unmatched paths will be rejected",
                DEFAULT_ROUTE
            );
        }

        Ok(Self { routes })
    }

    /// Looks up the destination for `path`, falling back to the default route.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.routes
            .get(normalize_path(path))
            .or_else(|| self.routes.get(DEFAULT_ROUTE))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}
