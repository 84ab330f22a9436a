use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub twilio: TwilioConfig,
    #[serde(default)]
    pub refund_policy: RefundPolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_phone: String,
}

/// Tiered cancellation schedule. Tiers are matched top-down against the
/// number of whole days left before the event; requests inside
/// `cancelable_until_days` of the event refund nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundPolicyConfig {
    pub cancelable_until_days: i64,
    pub tiers: Vec<RefundTier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundTier {
    pub days_before: i64,
    pub rate: u32,
}

impl Default for RefundPolicyConfig {
    fn default() -> Self {
        Self {
            cancelable_until_days: 1,
            tiers: vec![
                RefundTier {
                    days_before: 30,
                    rate: 100,
                },
                RefundTier {
                    days_before: 14,
                    rate: 90,
                },
                RefundTier {
                    days_before: 7,
                    rate: 80,
                },
                RefundTier {
                    days_before: 3,
                    rate: 50,
                },
                RefundTier {
                    days_before: 1,
                    rate: 20,
                },
            ],
        }
    }
}

impl RefundPolicyConfig {
    /// Sorts tiers by descending threshold and rejects rates above 100%.
    pub fn normalize(mut self) -> Result<Self, String> {
        if self.cancelable_until_days < 0 {
            return Err("refund_policy.cancelable_until_days must be >= 0".to_string());
        }
        for tier in &self.tiers {
            if tier.rate > 100 {
                return Err(format!(
                    "refund_policy tier at {} days has rate {}% (max 100)",
                    tier.days_before, tier.rate
                ));
            }
        }
        self.tiers.sort_by(|a, b| b.days_before.cmp(&a.days_before));
        Ok(self)
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str)
                    .map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: build from environment variables and defaults
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    twilio: TwilioConfig {
                        account_sid: get_env("TWILIO_ACCOUNT_SID").unwrap_or_default(),
                        auth_token: get_env("TWILIO_AUTH_TOKEN").unwrap_or_default(),
                        from_phone: get_env("TWILIO_FROM_PHONE").unwrap_or_default(),
                    },
                    refund_policy: RefundPolicyConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Environment variables override file values
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("TWILIO_ACCOUNT_SID") {
            config.twilio.account_sid = v;
        }
        if let Ok(v) = env::var("TWILIO_AUTH_TOKEN") {
            config.twilio.auth_token = v;
        }
        if let Ok(v) = env::var("TWILIO_FROM_PHONE") {
            config.twilio.from_phone = v;
        }

        config.refund_policy = config.refund_policy.normalize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_sorted_descending() {
        let policy = RefundPolicyConfig::default().normalize().unwrap();
        let thresholds: Vec<i64> = policy.tiers.iter().map(|t| t.days_before).collect();
        let mut sorted = thresholds.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(thresholds, sorted);
    }

    #[test]
    fn test_normalize_rejects_rate_above_100() {
        let policy = RefundPolicyConfig {
            cancelable_until_days: 1,
            tiers: vec![RefundTier {
                days_before: 7,
                rate: 120,
            }],
        };
        assert!(policy.normalize().is_err());
    }
}
