use std::time::Duration;

/// Public EOS API nodes serving `get_table_rows`. Any of them will do.
pub const EOS_API_ENDPOINTS: &[&str] = &[
    "https://eos.greymass.com",
    "https://api.eosnewyork.io",
    "https://eos.eosphere.io",
    "https://api.main.alohaeos.com",
    "https://eos.api.eosnation.io",
];

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Runtime settings for fetching markets.
#[derive(Clone, Debug)]
pub struct MarketsConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Equivalent EOS nodes; table reads race across all of them
    pub eos_endpoints: Vec<String>,
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: concat!("crypto-markets/", env!("CARGO_PKG_VERSION")).to_string(),
            eos_endpoints: EOS_API_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl MarketsConfig {
    /// Read overrides from `CRYPTO_MARKETS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let timeout_ms: u64 = lookup("CRYPTO_MARKETS_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let user_agent = lookup("CRYPTO_MARKETS_USER_AGENT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.user_agent);
        let eos_endpoints: Vec<String> = lookup("CRYPTO_MARKETS_EOS_ENDPOINTS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            request_timeout: Duration::from_millis(timeout_ms),
            user_agent,
            eos_endpoints: if eos_endpoints.is_empty() {
                defaults.eos_endpoints
            } else {
                eos_endpoints
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = MarketsConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("crypto-markets/"));
        assert_eq!(config.eos_endpoints.len(), EOS_API_ENDPOINTS.len());
    }

    #[test]
    fn test_overrides() {
        let config = MarketsConfig::from_lookup(lookup_from(&[
            ("CRYPTO_MARKETS_REQUEST_TIMEOUT_MS", "5000"),
            ("CRYPTO_MARKETS_USER_AGENT", "probe/1.0"),
            (
                "CRYPTO_MARKETS_EOS_ENDPOINTS",
                "https://a.example/, https://b.example ,",
            ),
        ]));
        assert_eq!(config.request_timeout, Duration::from_millis(5000));
        assert_eq!(config.user_agent, "probe/1.0");
        assert_eq!(
            config.eos_endpoints,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let config = MarketsConfig::from_lookup(lookup_from(&[(
            "CRYPTO_MARKETS_REQUEST_TIMEOUT_MS",
            "soon",
        )]));
        assert_eq!(config.request_timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }
}
