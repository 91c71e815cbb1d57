use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::{model::role::Role, models::Claims};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn generate_access_token(
    employee_id: i64,
    username: String,
    role: Role,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    let claims = Claims {
        sub: username,
        employee_id,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_identity() {
        let token = generate_access_token(42, "fgarcia".into(), Role::Administrator, "secret", 60)
            .unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.employee_id, 42);
        assert_eq!(claims.sub, "fgarcia");
        assert_eq!(claims.role, Role::Administrator);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(1, "a".into(), Role::Employee, "one", 60).unwrap();
        assert!(verify_token(&token, "two").is_err());
    }
}
