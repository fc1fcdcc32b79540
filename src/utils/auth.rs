use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{Duration, Utc};

use crate::models::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, username: String, role: Role, ttl_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(ttl_hours);

        Self {
            sub: user_id.to_string(),
            username,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_carries_identity_and_role() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "cashier".into(), Role::Cashier, 1);
        let token = create_token(&claims, SECRET).unwrap();

        let decoded = verify_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, id.to_string());
        assert_eq!(decoded.username, "cashier");
        assert_eq!(decoded.role, Role::Cashier);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), "manager".into(), Role::Manager, 1);
        let token = create_token(&claims, "other-secret").unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), "manager".into(), Role::Manager, -2);
        let token = create_token(&claims, SECRET).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("managerpass", 4).unwrap();
        assert!(verify_password("managerpass", &hash).unwrap());
        assert!(!verify_password("cashierpass", &hash).unwrap());
    }
}
