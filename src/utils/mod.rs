use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// Bearer-token claims. `jti` is the id of the session row backing the
/// token; the row is the source of truth for revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub jti: Uuid,
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

pub fn generate_token(
    session_id: Uuid,
    user_login: &str,
    expiration: i64,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        jti: session_id,
        sub: user_login.to_string(),
        exp: expiration,
        iat: Utc::now().timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Login format shared by registration, friend requests and path params.
pub fn is_valid_login(login: &str) -> bool {
    !login.is_empty()
        && login.chars().count() <= 30
        && login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Passwords must carry a digit, an uppercase and a lowercase letter.
pub fn is_valid_password(password: &str) -> bool {
    let length = password.chars().count();
    if !(6..=100).contains(&length) {
        return false;
    }
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    digit && upper && lower
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn password_hash_round_trip() {
        let hashed = hash_password("Qwerty1").unwrap();
        assert!(verify_password("Qwerty1", &hashed).unwrap());
        assert!(!verify_password("Qwerty2", &hashed).unwrap());
    }

    #[test]
    fn token_round_trip() {
        let session_id = Uuid::new_v4();
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = generate_token(session_id, "alice", exp, "secret").unwrap();

        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.jti, session_id);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = generate_token(Uuid::new_v4(), "alice", exp, "secret").unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn token_rejects_expired() {
        let exp = (Utc::now() - Duration::hours(1)).timestamp();
        let token = generate_token(Uuid::new_v4(), "alice", exp, "secret").unwrap();
        assert!(verify_token(&token, "secret").is_err());
    }

    #[test]
    fn token_rejects_garbage() {
        assert!(verify_token("not-a-token", "secret").is_err());
    }

    #[test]
    fn login_format() {
        assert!(is_valid_login("alice-01"));
        assert!(!is_valid_login(""));
        assert!(!is_valid_login("bad login"));
        assert!(!is_valid_login(&"a".repeat(31)));
    }

    #[test]
    fn password_policy() {
        assert!(is_valid_password("Qwerty1"));
        assert!(!is_valid_password("short"));
        assert!(!is_valid_password("alllowercase1"));
        assert!(!is_valid_password("ALLUPPERCASE1"));
        assert!(!is_valid_password("NoDigitsHere"));
    }

    #[test]
    fn password_length_counts_characters() {
        // 94 characters plus the required classes; more than 100 bytes.
        let password = format!("Aa1{}", "ё".repeat(94));
        assert!(password.len() > 100);
        assert!(is_valid_password(&password));
        assert!(!is_valid_password(&format!("Aa1{}", "ё".repeat(98))));
    }
}
