use crate::core::identity::SubjectClaim;
use crate::utils::error::ConfigError;
use crate::utils::validation::{self, Validate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub identity: IdentityConfig,
    pub pricing: PricingConfig,
    pub booking: Option<BookingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub region: String,
    pub user_pool_id: String,
    /// Override for the derived well-known JWKS endpoint; used by tests
    /// and non-standard deployments.
    pub jwks_url: Option<String>,
    /// Which token claim carries the subject: "email" or "username".
    pub subject_claim: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub distance_matrix_url: String,
    pub api_key: Option<String>,
    /// Decimal string, e.g. "0.165"; parsed exactly, never through a float.
    pub fuel_price_coefficient: Decimal,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    pub max_attempts: Option<u32>,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let processed = Self::substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| ConfigError::Parse {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` placeholders with environment values.
    /// Unset variables are left as-is so validation can report them.
    fn substitute_env_vars(content: &str) -> String {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl IdentityConfig {
    /// The provider's published key endpoint, derived from region and pool
    /// identifiers unless explicitly overridden.
    pub fn jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) => url.clone(),
            None => format!(
                "https://cognito-idp.{}.amazonaws.com/{}/.well-known/jwks.json",
                self.region, self.user_pool_id
            ),
        }
    }

    pub fn subject_claim(&self) -> Result<SubjectClaim, ConfigError> {
        self.subject_claim.parse()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS))
    }
}

impl PricingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS))
    }
}

impl BookingConfig {
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
            .unwrap_or(crate::core::ledger::DEFAULT_MAX_BOOKING_ATTEMPTS)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_non_empty_string("identity.region", &self.identity.region)?;
        validation::validate_non_empty_string(
            "identity.user_pool_id",
            &self.identity.user_pool_id,
        )?;
        validation::validate_url("identity.jwks_url", &self.identity.jwks_url())?;
        validation::validate_one_of(
            "identity.subject_claim",
            &self.identity.subject_claim,
            &["email", "username"],
        )?;

        validation::validate_url(
            "pricing.distance_matrix_url",
            &self.pricing.distance_matrix_url,
        )?;
        if self.pricing.fuel_price_coefficient <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "pricing.fuel_price_coefficient".to_string(),
                value: self.pricing.fuel_price_coefficient.to_string(),
                reason: "Coefficient must be positive".to_string(),
            });
        }

        if let Some(booking) = &self.booking {
            if let Some(max_attempts) = booking.max_attempts {
                validation::validate_range("booking.max_attempts", max_attempts, 1, 10)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const BASE_CONFIG: &str = r#"
[identity]
region = "eu-central-1"
user_pool_id = "eu-central-1_abc123"
subject_claim = "email"

[pricing]
distance_matrix_url = "https://maps.example.com/distancematrix"
fuel_price_coefficient = "0.165"

[booking]
max_attempts = 3
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = AppConfig::from_toml_str(BASE_CONFIG).unwrap();

        assert_eq!(config.identity.region, "eu-central-1");
        assert_eq!(config.pricing.fuel_price_coefficient, dec!(0.165));
        assert_eq!(config.booking.as_ref().unwrap().max_attempts(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jwks_url_is_derived_from_region_and_pool() {
        let config = AppConfig::from_toml_str(BASE_CONFIG).unwrap();

        assert_eq!(
            config.identity.jwks_url(),
            "https://cognito-idp.eu-central-1.amazonaws.com/eu-central-1_abc123/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_jwks_url_override_wins() {
        let toml = BASE_CONFIG.replace(
            "subject_claim = \"email\"",
            "subject_claim = \"email\"\njwks_url = \"http://localhost:9999/jwks.json\"",
        );
        let config = AppConfig::from_toml_str(&toml).unwrap();

        assert_eq!(config.identity.jwks_url(), "http://localhost:9999/jwks.json");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RIDE_POOL_TEST_REGION", "us-east-1");
        let toml = BASE_CONFIG.replace("\"eu-central-1\"", "\"${RIDE_POOL_TEST_REGION}\"");

        let config = AppConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.identity.region, "us-east-1");

        std::env::remove_var("RIDE_POOL_TEST_REGION");
    }

    #[test]
    fn test_subject_claim_accessor() {
        let config = AppConfig::from_toml_str(BASE_CONFIG).unwrap();

        assert_eq!(
            config.identity.subject_claim().unwrap(),
            crate::core::identity::SubjectClaim::Email
        );
    }

    #[test]
    fn test_invalid_subject_claim_fails_validation() {
        let toml = BASE_CONFIG.replace("\"email\"", "\"phone\"");
        let config = AppConfig::from_toml_str(&toml).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_coefficient_fails_validation() {
        let toml = BASE_CONFIG.replace("\"0.165\"", "\"0\"");
        let config = AppConfig::from_toml_str(&toml).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_max_attempts_fails_validation() {
        let toml = BASE_CONFIG.replace("max_attempts = 3", "max_attempts = 50");
        let config = AppConfig::from_toml_str(&toml).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_coefficient_is_parsed_exactly() {
        let config = AppConfig::from_toml_str(BASE_CONFIG).unwrap();

        // "0.165" survives as an exact decimal, not a float approximation.
        assert_eq!(config.pricing.fuel_price_coefficient.to_string(), "0.165");
    }
}
