use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Token claims issued by the identity provider
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Owner identity
    pub sub: String,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// Identity resolution over bearer tokens. Token issuance belongs to the
/// external identity provider; this service only verifies.
pub struct AuthService;

impl AuthService {
    /// Validate a bearer token and return its claims.
    pub fn validate_token(token: &str, config: &Config) -> Result<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.auth.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config_with_secret(secret: &str) -> Config {
        let mut config = Config::default();
        config.auth.secret = secret.to_string();
        config
    }

    fn token_for(sub: &str, exp: i64, secret: &str) -> String {
        encode(
            &Header::default(),
            &Claims {
                sub: sub.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_resolves_owner() {
        let config = config_with_secret("s3cret");
        let exp = chrono::Utc::now().timestamp() + 600;
        let token = token_for("u1", exp, "s3cret");

        let claims = AuthService::validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "u1");
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let config = config_with_secret("s3cret");
        let exp = chrono::Utc::now().timestamp() + 600;
        let token = token_for("u1", exp, "other-secret");

        let err = AuthService::validate_token(&token, &config).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let config = config_with_secret("s3cret");
        let exp = chrono::Utc::now().timestamp() - 600;
        let token = token_for("u1", exp, "s3cret");

        let err = AuthService::validate_token(&token, &config).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
