use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::error::AppError;
use crate::utils::{hash_password, is_valid_login, is_valid_password, verify_password};

use crate::routes::country::model::Country;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub login: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub country_code: String,
    pub is_public: bool,
    pub phone: Option<String>,
    pub image: Option<String>,
}

/// Wire form of a profile: camelCase keys, no nulls, never the hash.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub login: String,
    pub email: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            login: user.login,
            email: user.email,
            country_code: user.country_code,
            is_public: user.is_public,
            phone: user.phone,
            image: user.image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub login: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
    pub phone: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
}

/// Keeps "field absent" (outer `None`) apart from "field explicitly null"
/// (`Some(None)`), which plain `Option` deserialization collapses.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial profile update. Absent fields are left untouched; explicit null
/// clears the nullable fields and is rejected for the rest.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(rename = "countryCode", default, deserialize_with = "double_option")]
    pub country_code: Option<Option<String>>,
    #[serde(rename = "isPublic", default, deserialize_with = "double_option")]
    pub is_public: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

impl UpdateProfileRequest {
    /// Applies the patch field-by-field on top of the current profile.
    pub fn apply_to(&self, user: &User) -> Result<User, AppError> {
        let mut updated = user.clone();
        match &self.country_code {
            None => {}
            Some(None) => {
                return Err(AppError::Validation(
                    "countryCode cannot be null".to_string(),
                ));
            }
            Some(Some(v)) => updated.country_code = v.clone(),
        }
        match self.is_public {
            None => {}
            Some(None) => {
                return Err(AppError::Validation("isPublic cannot be null".to_string()));
            }
            Some(Some(v)) => updated.is_public = v,
        }
        if let Some(v) = &self.phone {
            updated.phone = v.clone();
        }
        if let Some(v) = &self.image {
            updated.image = v.clone();
        }
        Ok(updated)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        StatusResponse {
            status: "ok".to_string(),
        }
    }
}

pub fn validate_register(req: &RegisterRequest) -> Result<(), AppError> {
    if !is_valid_login(&req.login) {
        return Err(AppError::Validation(
            "Login may only contain letters, digits and dashes".to_string(),
        ));
    }
    if req.email.is_empty() || req.email.chars().count() > 50 || !req.email.contains('@') {
        return Err(AppError::Validation("Invalid email".to_string()));
    }
    if !is_valid_password(&req.password) {
        return Err(AppError::Validation(
            "Password does not meet the requirements".to_string(),
        ));
    }
    validate_optional_fields(req.phone.as_deref(), req.image.as_deref())
}

pub fn validate_optional_fields(
    phone: Option<&str>,
    image: Option<&str>,
) -> Result<(), AppError> {
    if let Some(phone) = phone {
        let digits_ok = phone
            .strip_prefix('+')
            .is_some_and(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()));
        if phone.chars().count() > 20 || !digits_ok {
            return Err(AppError::Validation("Invalid phone number".to_string()));
        }
    }
    if let Some(image) = image {
        let length = image.chars().count();
        if length == 0 || length > 200 {
            return Err(AppError::Validation("Invalid image link".to_string()));
        }
    }
    Ok(())
}

pub fn validate_sign_in(req: &SignInRequest) -> Result<(), AppError> {
    if !is_valid_login(&req.login) {
        return Err(AppError::Validation(
            "Login may only contain letters, digits and dashes".to_string(),
        ));
    }
    if !is_valid_password(&req.password) {
        return Err(AppError::Validation(
            "Password does not meet the requirements".to_string(),
        ));
    }
    Ok(())
}

impl User {
    pub async fn create(pool: &PgPool, req: &RegisterRequest) -> Result<Self, AppError> {
        if !Country::exists(pool, &req.country_code).await? {
            return Err(AppError::Validation("Country not found".to_string()));
        }

        let hashed_password = hash_password(&req.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, email, hashed_password, country_code, is_public, phone, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING login, email, hashed_password, country_code, is_public, phone, image
            "#,
        )
        .bind(&req.login)
        .bind(&req.email)
        .bind(&hashed_password)
        .bind(&req.country_code)
        .bind(req.is_public)
        .bind(&req.phone)
        .bind(&req.image)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT login, email, hashed_password, country_code, is_public, phone, image
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(pool)
        .await
    }

    /// Checks login/password, answering the same way for unknown logins and
    /// wrong passwords so the response doesn't reveal which one it was.
    pub async fn authenticate(pool: &PgPool, login: &str, password: &str) -> Result<Self, AppError> {
        let invalid = || AppError::Unauthorized("Invalid login or password".to_string());

        let user = Self::find_by_login(pool, login).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.hashed_password)? {
            return Err(invalid());
        }
        Ok(user)
    }

    pub async fn update_profile(
        pool: &PgPool,
        current: &User,
        req: &UpdateProfileRequest,
    ) -> Result<Self, AppError> {
        let updated = req.apply_to(current)?;

        if let Some(Some(ref country_code)) = req.country_code {
            if !Country::exists(pool, country_code).await? {
                return Err(AppError::Validation("Country not found".to_string()));
            }
        }
        validate_optional_fields(updated.phone.as_deref(), updated.image.as_deref())?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET country_code = $2, is_public = $3, phone = $4, image = $5
            WHERE login = $1
            RETURNING login, email, hashed_password, country_code, is_public, phone, image
            "#,
        )
        .bind(&current.login)
        .bind(&updated.country_code)
        .bind(updated.is_public)
        .bind(&updated.phone)
        .bind(&updated.image)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn update_password(
        executor: impl PgExecutor<'_>,
        login: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let hashed_password = hash_password(new_password)?;

        sqlx::query("UPDATE users SET hashed_password = $2 WHERE login = $1")
            .bind(login)
            .bind(&hashed_password)
            .execute(executor)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            login: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "Qwerty1".to_string(),
            country_code: "US".to_string(),
            is_public: true,
            phone: None,
            image: None,
        }
    }

    #[test]
    fn register_validation_accepts_well_formed_input() {
        assert!(validate_register(&register_request()).is_ok());
    }

    #[test]
    fn register_validation_rejects_bad_login() {
        let mut req = register_request();
        req.login = "bad login!".to_string();
        assert!(validate_register(&req).is_err());
    }

    #[test]
    fn register_validation_rejects_weak_password() {
        let mut req = register_request();
        req.password = "password".to_string();
        assert!(validate_register(&req).is_err());
    }

    #[test]
    fn register_validation_rejects_bad_phone() {
        let mut req = register_request();
        req.phone = Some("12345".to_string());
        assert!(validate_register(&req).is_err());

        req.phone = Some("+123a5".to_string());
        assert!(validate_register(&req).is_err());

        req.phone = Some("+12345".to_string());
        assert!(validate_register(&req).is_ok());
    }

    #[test]
    fn phone_validation_handles_multibyte_input() {
        // Must reject, not panic, when the first character is multi-byte.
        assert!(validate_optional_fields(Some("ñ123"), None).is_err());
        assert!(validate_optional_fields(Some("+"), None).is_err());
    }

    #[test]
    fn field_limits_count_characters_not_bytes() {
        let mut req = register_request();
        req.email = format!("{}@x.ру", "a".repeat(45));
        assert_eq!(req.email.chars().count(), 50);
        assert!(validate_register(&req).is_ok());

        assert!(validate_optional_fields(None, Some(&"ё".repeat(200))).is_ok());
        assert!(validate_optional_fields(None, Some(&"ё".repeat(201))).is_err());
    }

    #[test]
    fn sign_in_validation_enforces_formats() {
        let ok = SignInRequest {
            login: "alice".to_string(),
            password: "Qwerty1".to_string(),
        };
        assert!(validate_sign_in(&ok).is_ok());

        let bad_login = SignInRequest {
            login: "bad login!".to_string(),
            password: "Qwerty1".to_string(),
        };
        assert!(validate_sign_in(&bad_login).is_err());

        let weak_password = SignInRequest {
            login: "alice".to_string(),
            password: "password".to_string(),
        };
        assert!(validate_sign_in(&weak_password).is_err());
    }

    #[test]
    fn profile_patch_distinguishes_null_from_absent() {
        let req: UpdateProfileRequest = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(req.phone, Some(None));
        assert!(req.image.is_none());

        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"phone": "+123", "isPublic": false}"#).unwrap();
        assert_eq!(req.phone, Some(Some("+123".to_string())));
        assert_eq!(req.is_public, Some(Some(false)));
    }

    fn stored_user() -> User {
        User {
            login: "alice".to_string(),
            email: "alice@example.com".to_string(),
            hashed_password: "$2b$12$secret".to_string(),
            country_code: "US".to_string(),
            is_public: true,
            phone: Some("+123".to_string()),
            image: None,
        }
    }

    #[test]
    fn profile_patch_applies_field_by_field() {
        let user = stored_user();

        // Absent fields stay untouched.
        let untouched = UpdateProfileRequest::default().apply_to(&user).unwrap();
        assert_eq!(untouched.phone, Some("+123".to_string()));
        assert_eq!(untouched.country_code, "US");

        // Explicit null clears a nullable field.
        let cleared = UpdateProfileRequest {
            phone: Some(None),
            ..Default::default()
        }
        .apply_to(&user)
        .unwrap();
        assert_eq!(cleared.phone, None);

        // Explicit null is rejected for non-nullable fields.
        let bad = UpdateProfileRequest {
            country_code: Some(None),
            ..Default::default()
        };
        assert!(bad.apply_to(&user).is_err());

        let bad = UpdateProfileRequest {
            is_public: Some(None),
            ..Default::default()
        };
        assert!(bad.apply_to(&user).is_err());
    }

    #[test]
    fn profile_serialization_hides_hash_and_nulls() {
        let profile = UserProfile::from(User {
            login: "alice".to_string(),
            email: "alice@example.com".to_string(),
            hashed_password: "$2b$12$secret".to_string(),
            country_code: "US".to_string(),
            is_public: true,
            phone: None,
            image: None,
        });

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["login"], "alice");
        assert_eq!(json["countryCode"], "US");
        assert_eq!(json["isPublic"], true);
        assert!(json.get("hashed_password").is_none());
        assert!(json.get("phone").is_none());
        assert!(json.get("image").is_none());
    }
}
