use crate::domain::Decimal;
use crate::engine::SplitMode;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub pricing: PricingSettings,
    pub currency: Currency,
}

/// Parameters for costing and taxing an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingSettings {
    pub tax_rate: Decimal,
    /// Margin assumed when no lot history is usable; cost = proceeds * (1 - rate).
    pub default_margin_rate: Decimal,
    pub split_mode: SplitMode,
    pub ledger_timeout: Duration,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(rust_decimal::Decimal::new(18, 2)),
            default_margin_rate: Decimal::new(rust_decimal::Decimal::new(5, 2)),
            split_mode: SplitMode::ReverseInclusive,
            ledger_timeout: Duration::from_millis(5000),
        }
    }
}

/// Currency used for amount-in-words rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Inr,
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
        }
    }

    /// Major and minor unit names as used in amount-in-words.
    pub fn unit_names(&self) -> (&'static str, &'static str) {
        match self {
            Currency::Inr => ("Rupees", "Paise"),
            Currency::Usd => ("Dollars", "Cents"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let tax_rate = parse_rate(&env_map, "TAX_RATE", "0.18")?;
        let default_margin_rate = parse_rate(&env_map, "DEFAULT_MARGIN_RATE", "0.05")?;
        if default_margin_rate > Decimal::one() {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_MARGIN_RATE".to_string(),
                "must be between 0 and 1".to_string(),
            ));
        }

        let split_mode = env_map
            .get("SPLIT_MODE")
            .map(|s| s.as_str())
            .unwrap_or("reverse_inclusive")
            .parse::<SplitMode>()
            .map_err(|e| ConfigError::InvalidValue("SPLIT_MODE".to_string(), e))?;

        let ledger_timeout_ms = env_map
            .get("LEDGER_TIMEOUT_MS")
            .map(|s| s.as_str())
            .unwrap_or("5000")
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "LEDGER_TIMEOUT_MS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let currency = match env_map
            .get("CURRENCY")
            .map(|s| s.trim().to_ascii_uppercase())
            .as_deref()
            .unwrap_or("INR")
        {
            "INR" => Currency::Inr,
            "USD" => Currency::Usd,
            other => {
                return Err(ConfigError::InvalidValue(
                    "CURRENCY".to_string(),
                    format!("must be INR or USD, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            database_path,
            pricing: PricingSettings {
                tax_rate,
                default_margin_rate,
                split_mode,
                ledger_timeout: Duration::from_millis(ledger_timeout_ms),
            },
            currency,
        })
    }
}

fn parse_rate(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<Decimal, ConfigError> {
    let raw = env_map.get(key).map(|s| s.as_str()).unwrap_or(default);
    let rate = Decimal::from_str_canonical(raw).map_err(|_| {
        ConfigError::InvalidValue(key.to_string(), "must be a decimal number".to_string())
    })?;
    if rate.is_negative() {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.pricing, PricingSettings::default());
        assert_eq!(config.pricing.tax_rate, Decimal::from_str("0.18").unwrap());
        assert_eq!(
            config.pricing.default_margin_rate,
            Decimal::from_str("0.05").unwrap()
        );
        assert_eq!(config.currency, Currency::Inr);
    }

    #[test]
    fn test_missing_database_path() {
        let result = Config::from_env_map(HashMap::new());
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_overrides() {
        let mut env_map = setup_required_env();
        env_map.insert("TAX_RATE".to_string(), "0.12".to_string());
        env_map.insert("DEFAULT_MARGIN_RATE".to_string(), "0.02".to_string());
        env_map.insert("SPLIT_MODE".to_string(), "simple".to_string());
        env_map.insert("LEDGER_TIMEOUT_MS".to_string(), "250".to_string());
        env_map.insert("CURRENCY".to_string(), "usd".to_string());

        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.pricing.tax_rate, Decimal::from_str("0.12").unwrap());
        assert_eq!(
            config.pricing.default_margin_rate,
            Decimal::from_str("0.02").unwrap()
        );
        assert_eq!(config.pricing.split_mode, SplitMode::Simple);
        assert_eq!(config.pricing.ledger_timeout, Duration::from_millis(250));
        assert_eq!(config.currency, Currency::Usd);
    }

    #[test]
    fn test_margin_rate_out_of_range() {
        let mut env_map = setup_required_env();
        env_map.insert("DEFAULT_MARGIN_RATE".to_string(), "1.5".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "DEFAULT_MARGIN_RATE"),
            _ => panic!("Expected InvalidValue error"),
        }

        let mut env_map = setup_required_env();
        env_map.insert("DEFAULT_MARGIN_RATE".to_string(), "-0.05".to_string());
        assert!(Config::from_env_map(env_map).is_err());
    }

    #[test]
    fn test_invalid_split_mode() {
        let mut env_map = setup_required_env();
        env_map.insert("SPLIT_MODE".to_string(), "gross".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SPLIT_MODE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("LEDGER_TIMEOUT_MS".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "LEDGER_TIMEOUT_MS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
