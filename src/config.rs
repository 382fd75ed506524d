use {
    std::{collections::HashMap, fmt},
    thiserror::Error,
    url::Url,
};

pub const PORT: &str = "PORT";
pub const STRIPE_SECRET: &str = "STRIPE_SECRET";
pub const STRIPE_SUCCESS_URL: &str = "STRIPE_SUCCESS_URL";
pub const STRIPE_CANCEL_URL: &str = "STRIPE_CANCEL_URL";
pub const STRIPE_ENDPOINT_SECRET: &str = "STRIPE_ENDPOINT_SECRET";
pub const STRIPE_WEBHOOK_TOLERANCE_SECS: &str = "STRIPE_WEBHOOK_TOLERANCE_SECS";
pub const NATS_SERVERS: &str = "NATS_SERVERS";

/// Matches the processor's own default.
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigViolation {
    pub key: &'static str,
    pub problem: String,
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.problem)
    }
}

#[derive(Debug, Error)]
#[error("config validation error: {}", join(.violations))]
pub struct ConfigError {
    pub violations: Vec<ConfigViolation>,
}

fn join(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Redirect targets for the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectUrls {
    pub success: Url,
    pub cancel: Url,
}

/// Process configuration. Built once at startup and shared read-only.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub stripe_secret: String,
    pub redirects: RedirectUrls,
    pub webhook_secret: String,
    pub webhook_tolerance_secs: u64,
    pub nats_servers: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("stripe_secret", &"<redacted>")
            .field("redirects", &self.redirects)
            .field("webhook_secret", &"<redacted>")
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .field("nats_servers", &self.nats_servers)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Builds the config from key/value pairs. Unknown keys are ignored and
    /// every missing or malformed key is reported in one error.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut violations = Vec::new();

        let port = required(&vars, PORT, &mut violations).and_then(|raw| {
            match raw.trim().parse::<u16>() {
                Ok(p) if p >= 1 => Some(p),
                _ => {
                    violations.push(ConfigViolation {
                        key: PORT,
                        problem: format!("must be an integer in 1..=65535, got {raw:?}"),
                    });
                    None
                }
            }
        });

        let stripe_secret = required(&vars, STRIPE_SECRET, &mut violations);
        let success = required_url(&vars, STRIPE_SUCCESS_URL, &mut violations);
        let cancel = required_url(&vars, STRIPE_CANCEL_URL, &mut violations);
        let webhook_secret = required(&vars, STRIPE_ENDPOINT_SECRET, &mut violations);

        let webhook_tolerance_secs = match vars.get(STRIPE_WEBHOOK_TOLERANCE_SECS) {
            None => Some(DEFAULT_WEBHOOK_TOLERANCE_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    violations.push(ConfigViolation {
                        key: STRIPE_WEBHOOK_TOLERANCE_SECS,
                        problem: format!("must be a non-negative integer, got {raw:?}"),
                    });
                    None
                }
            },
        };

        let nats_servers = required(&vars, NATS_SERVERS, &mut violations).and_then(|raw| {
            let servers: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if servers.is_empty() {
                violations.push(ConfigViolation {
                    key: NATS_SERVERS,
                    problem: "must list at least one server".into(),
                });
                return None;
            }
            Some(servers)
        });

        match (
            port,
            stripe_secret,
            success,
            cancel,
            webhook_secret,
            webhook_tolerance_secs,
            nats_servers,
        ) {
            (
                Some(port),
                Some(stripe_secret),
                Some(success),
                Some(cancel),
                Some(webhook_secret),
                Some(webhook_tolerance_secs),
                Some(nats_servers),
            ) if violations.is_empty() => Ok(Self {
                port,
                stripe_secret,
                redirects: RedirectUrls { success, cancel },
                webhook_secret,
                webhook_tolerance_secs,
                nats_servers,
            }),
            _ => Err(ConfigError { violations }),
        }
    }
}

fn required(
    vars: &HashMap<String, String>,
    key: &'static str,
    violations: &mut Vec<ConfigViolation>,
) -> Option<String> {
    match vars.get(key) {
        Some(v) if !v.trim().is_empty() => Some(v.clone()),
        Some(_) => {
            violations.push(ConfigViolation {
                key,
                problem: "must not be empty".into(),
            });
            None
        }
        None => {
            violations.push(ConfigViolation {
                key,
                problem: "is required".into(),
            });
            None
        }
    }
}

fn required_url(
    vars: &HashMap<String, String>,
    key: &'static str,
    violations: &mut Vec<ConfigViolation>,
) -> Option<Url> {
    let raw = required(vars, key, violations)?;
    match Url::parse(raw.trim()) {
        Ok(url) if url.has_host() => Some(url),
        Ok(_) => {
            violations.push(ConfigViolation {
                key,
                problem: format!("must be an absolute URL with a host, got {raw:?}"),
            });
            None
        }
        Err(e) => {
            violations.push(ConfigViolation {
                key,
                problem: format!("invalid URL {raw:?}: {e}"),
            });
            None
        }
    }
}
