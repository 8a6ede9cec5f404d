use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory repository is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Maximum pooled Postgres connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest `count` accepted by `/recommendations/popular`
    #[serde(default = "default_popular_max_count")]
    pub popular_max_count: i64,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_popular_max_count() -> i64 {
    5
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: default_db_max_connections(),
            host: default_host(),
            port: default_port(),
            popular_max_count: default_popular_max_count(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.popular_max_count < 1 {
            anyhow::bail!(
                "POPULAR_MAX_COUNT must be at least 1, got {}",
                config.popular_max_count
            );
        }

        Ok(config)
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.popular_max_count, 5);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_overrides_from_variables() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgres://localhost/recs"),
            ("PORT", "9000"),
            ("POPULAR_MAX_COUNT", "10"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/recs")
        );
        assert_eq!(config.port, 9000);
        assert_eq!(config.popular_max_count, 10);
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn test_rejects_non_positive_popular_max() {
        let result = Config::from_vars(vars(&[("POPULAR_MAX_COUNT", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unparseable_port() {
        let result = Config::from_vars(vars(&[("PORT", "eighty")]));
        assert!(result.is_err());
    }
}
