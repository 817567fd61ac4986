use crate::domain::model::{Identity, SigningKey};
use crate::domain::ports::KeyCache;
use crate::utils::error::{AuthError, ConfigError};
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Which payload claim carries the stable subject identifier. The provider
/// issues both; callers pick per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectClaim {
    Email,
    Username,
}

impl SubjectClaim {
    pub fn claim_name(self) -> &'static str {
        match self {
            SubjectClaim::Email => "email",
            SubjectClaim::Username => "cognito:username",
        }
    }
}

impl std::str::FromStr for SubjectClaim {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(SubjectClaim::Email),
            "username" => Ok(SubjectClaim::Username),
            other => Err(ConfigError::InvalidValue {
                field: "identity.subject_claim".to_string(),
                value: other.to_string(),
                reason: "Allowed values: email, username".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

/// Verifies externally issued RS256 bearer credentials against the
/// provider's published key set. Signing keys are resolved through the
/// injected cache and fetched from the well-known JWKS endpoint on a miss;
/// nothing else is mutated.
pub struct IdentityVerifier<C: KeyCache> {
    keys: C,
    http: Client,
    jwks_url: String,
    subject_claim: SubjectClaim,
}

impl<C: KeyCache> IdentityVerifier<C> {
    pub fn new(
        keys: C,
        jwks_url: String,
        subject_claim: SubjectClaim,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "identity.timeout_seconds".to_string(),
                value: format!("{:?}", timeout),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            keys,
            http,
            jwks_url,
            subject_claim,
        })
    }

    /// Verify a bearer credential and extract the subject's identity.
    /// Expiry is checked by this core against the `exp` claim so that a
    /// credential expiring at or before the current second is rejected.
    pub async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Malformed {
                reason: "empty credential".to_string(),
            });
        }

        let header = decode_header(token).map_err(|e| AuthError::Malformed {
            reason: format!("undecodable header: {}", e),
        })?;
        let kid = header.kid.ok_or_else(|| AuthError::Malformed {
            reason: "credential header carries no key id".to_string(),
        })?;

        let key = match self.keys.get(&kid) {
            Some(key) => key,
            None => self.fetch_key(&kid).await?,
        };
        let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e)
            .map_err(|_| AuthError::InvalidSignature)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        // Expiry is compared manually below, exact to the second.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<serde_json::Value>(token, &decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::InvalidSignature
                }
                _ => AuthError::Malformed {
                    reason: format!("undecodable payload: {}", e),
                },
            },
        )?;

        let exp = data
            .claims
            .get("exp")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| AuthError::Malformed {
                reason: "missing exp claim".to_string(),
            })?;
        if exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired { expired_at: exp });
        }

        let claim_name = self.subject_claim.claim_name();
        let subject = data
            .claims
            .get(claim_name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AuthError::Malformed {
                reason: format!("missing {} claim", claim_name),
            })?;

        tracing::debug!(kid = %kid, claim = claim_name, "credential verified");
        Ok(Identity::new(subject))
    }

    /// Resolve an unseen key id by refreshing from the provider's JWKS
    /// endpoint. Fetched keys are cached with no forced expiry.
    async fn fetch_key(&self, kid: &str) -> Result<SigningKey, AuthError> {
        tracing::debug!(kid = %kid, url = %self.jwks_url, "key cache miss, fetching JWKS");

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeyUnavailable {
                reason: e.to_string(),
            })?;
        let jwks: JwkSet = response.json().await.map_err(|e| AuthError::KeyUnavailable {
            reason: format!("unreadable key set: {}", e),
        })?;

        let jwk = jwks
            .keys
            .into_iter()
            .find(|k| k.kid == kid && k.kty == "RSA")
            .ok_or(AuthError::InvalidSignature)?;
        let (n, e) = match (jwk.n, jwk.e) {
            (Some(n), Some(e)) => (n, e),
            _ => return Err(AuthError::InvalidSignature),
        };

        let key = SigningKey {
            kid: kid.to_string(),
            n,
            e,
        };
        self.keys.put(key.clone());
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryKeyCache;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn verifier(jwks_url: &str) -> IdentityVerifier<InMemoryKeyCache> {
        IdentityVerifier::new(
            InMemoryKeyCache::new(),
            jwks_url.to_string(),
            SubjectClaim::Email,
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_token_is_malformed() {
        let v = verifier("http://localhost:1/jwks.json");

        assert!(matches!(
            v.verify("").await,
            Err(AuthError::Malformed { .. })
        ));
        assert!(matches!(
            v.verify("   ").await,
            Err(AuthError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_garbage_token_is_malformed() {
        let v = verifier("http://localhost:1/jwks.json");

        assert!(matches!(
            v.verify("not-a-jwt").await,
            Err(AuthError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_token_without_key_id_is_malformed() {
        // A structurally valid token whose header has no kid.
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "email": "a@example.com", "exp": 4102444800i64 }),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let v = verifier("http://localhost:1/jwks.json");

        assert!(matches!(
            v.verify(&token).await,
            Err(AuthError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_key_endpoint_is_key_unavailable() {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("kid-1".to_string());
        let token = encode(
            &header,
            &serde_json::json!({ "email": "a@example.com", "exp": 4102444800i64 }),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        // Nothing listens on port 1.
        let v = verifier("http://127.0.0.1:1/jwks.json");

        assert!(matches!(
            v.verify(&token).await,
            Err(AuthError::KeyUnavailable { .. })
        ));
    }

    #[test]
    fn test_subject_claim_parsing() {
        assert_eq!("email".parse::<SubjectClaim>().unwrap(), SubjectClaim::Email);
        assert_eq!(
            "username".parse::<SubjectClaim>().unwrap(),
            SubjectClaim::Username
        );
        assert!("phone".parse::<SubjectClaim>().is_err());
    }

    #[test]
    fn test_claim_names() {
        assert_eq!(SubjectClaim::Email.claim_name(), "email");
        assert_eq!(SubjectClaim::Username.claim_name(), "cognito:username");
    }
}
