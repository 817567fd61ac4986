use crate::domain::ports::DistanceProvider;
use crate::utils::error::{ConfigError, PricingError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    duration: Option<MatrixDuration>,
}

#[derive(Debug, Deserialize)]
struct MatrixDuration {
    value: u64,
}

/// HTTP client for the external distance-matrix provider. Returns the
/// duration of the first matched element; every failure mode (network,
/// provider-side error, malformed body) normalizes to
/// `PricingError::UpstreamUnavailable`.
pub struct MatrixDistanceProvider {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl MatrixDistanceProvider {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "pricing.timeout_seconds".to_string(),
                value: format!("{:?}", timeout),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn unavailable(reason: impl Into<String>) -> PricingError {
        PricingError::UpstreamUnavailable {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DistanceProvider for MatrixDistanceProvider {
    async fn travel_duration_seconds(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<u64, PricingError> {
        let mut query: Vec<(&str, &str)> =
            vec![("origins", origin), ("destinations", destination)];
        if let Some(key) = &self.api_key {
            query.push(("key", key));
        }

        tracing::debug!(origin, destination, "requesting travel duration");
        let response = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Self::unavailable(e.to_string()))?;
        let body: MatrixResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable(format!("malformed response: {}", e)))?;

        if body.status != "OK" {
            return Err(Self::unavailable(format!(
                "provider status {}",
                body.status
            )));
        }

        let element = body
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .ok_or_else(|| Self::unavailable("no matrix element in response"))?;
        if element.status != "OK" {
            return Err(Self::unavailable(format!(
                "element status {}",
                element.status
            )));
        }

        element
            .duration
            .as_ref()
            .map(|d| d.value)
            .ok_or_else(|| Self::unavailable("element carries no duration"))
    }
}
