//! JWT token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub is_super_admin: bool,
    pub user_group: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::ValidationError(e.to_string()))
    }
}

/// The user facts embedded in an issued token.
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub user_id: Uuid,
    pub username: &'a str,
    pub role: &'a str,
    pub is_super_admin: bool,
    pub user_group: &'a str,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    pub fn generate_token(&self, subject: &TokenSubject<'_>) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.user_id.to_string(),
            username: subject.username.to_string(),
            role: subject.role.to_string(),
            is_super_admin: subject.is_super_admin,
            user_group: subject.user_group.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_seconds)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::ValidationError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: Uuid) -> TokenSubject<'static> {
        TokenSubject {
            user_id: id,
            username: "alice",
            role: "admin",
            is_super_admin: false,
            user_group: "physics",
        }
    }

    #[test]
    fn test_generate_and_validate() {
        let service = JwtService::new("secret", 3600);
        let id = Uuid::new_v4();
        let token = service.generate_token(&subject(id)).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.user_group, "physics");
        assert!(!claims.is_super_admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new("secret", 3600);
        let other = JwtService::new("other-secret", 3600);
        let token = issuer.generate_token(&subject(Uuid::new_v4())).unwrap();

        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        // Past the default 60s leeway
        let service = JwtService::new("secret", -600);
        let token = service.generate_token(&subject(Uuid::new_v4())).unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token() {
        let service = JwtService::new("secret", 3600);
        assert!(service.validate_token("not.a.token").is_err());
    }
}
