//! Intern registration and credential checks.
//!
//! Nothing here knows about HTTP: handlers call [`register`] and
//! [`authenticate`] and translate the resulting [`AuthError`].

use rand::Rng;
use rand::distr::Alphanumeric;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tokio::task;
use tracing::{info, warn};
use validator::Validate;

use crate::entities::intern;
use crate::store::interns::{self, NewIntern};
use crate::store::{StoreError, UniqueField};

pub mod password;
pub mod token;

pub use token::{SessionToken, TokenSigner};

pub const REFERRAL_CODE_LEN: usize = 8;
const REFERRAL_CODE_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication required")]
    NotAuthenticated,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Signup {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8 to 128 characters"))]
    pub password: String,
    #[serde(default)]
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Creates an intern with a hashed password. A referral code is generated
/// when the caller does not supply one.
pub async fn register(
    database: &DatabaseConnection,
    signup: Signup,
) -> Result<intern::Model, AuthError> {
    signup.validate().map_err(StoreError::from)?;

    let secret = signup.password.clone();
    let password_hash = task::spawn_blocking(move || password::hash(&secret))
        .await
        .map_err(|err| AuthError::Hashing(err.to_string()))??;

    let requested_code = signup
        .referral_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    let mut attempt = 0;
    loop {
        attempt += 1;
        let referral_code = requested_code
            .clone()
            .unwrap_or_else(generate_referral_code);
        let mut new_intern = NewIntern::new(signup.name.clone(), signup.email.clone(), referral_code);
        new_intern.password_hash = Some(password_hash.clone());

        match interns::create(database, new_intern).await {
            Ok(intern) => {
                info!(intern_id = intern.id, "Intern registered");
                return Ok(intern);
            }
            Err(StoreError::Uniqueness {
                field: UniqueField::ReferralCode,
            }) if requested_code.is_none() && attempt < REFERRAL_CODE_ATTEMPTS => {
                warn!(attempt, "Generated referral code collided, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Checks an intern's credentials and issues a session token.
///
/// Unknown emails, wrong passwords and interns without a stored password all
/// fail with [`AuthError::InvalidCredentials`].
pub async fn authenticate(
    database: &DatabaseConnection,
    signer: &TokenSigner,
    credentials: Credentials,
) -> Result<SessionToken, AuthError> {
    credentials.validate().map_err(StoreError::from)?;

    let intern = interns::find_by_email(database, &credentials.email).await?;
    let stored_hash = intern
        .as_ref()
        .and_then(|intern| intern.password_hash.clone());

    let secret = credentials.password;
    let matches = task::spawn_blocking(move || match stored_hash {
        Some(stored_hash) => password::verify(&secret, &stored_hash),
        None => password::verify_dummy(&secret),
    })
    .await
    .map_err(|err| AuthError::Hashing(err.to_string()))??;

    let intern = match intern {
        Some(intern) if matches => intern,
        Some(intern) if intern.password_hash.is_none() => {
            warn!(intern_id = intern.id, "Login attempted for intern without password");
            return Err(AuthError::InvalidCredentials);
        }
        Some(intern) => {
            warn!(intern_id = intern.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        None => return Err(AuthError::InvalidCredentials),
    };

    let session = signer.issue(intern.id)?;
    info!(intern_id = intern.id, "Intern logged in");
    Ok(session)
}

pub fn generate_referral_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(REFERRAL_CODE_LEN)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::store::test_support::memory_database;

    fn signup(email: &str) -> Signup {
        Signup {
            name: "Jane Doe".to_string(),
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
            referral_code: None,
        }
    }

    fn signer() -> TokenSigner {
        TokenSigner::new(b"auth-test-secret", Duration::minutes(5))
    }

    #[test]
    fn referral_codes_are_uppercase_alphanumerics() {
        let code = generate_referral_code();
        assert_eq!(code.len(), REFERRAL_CODE_LEN);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn register_stores_hash_and_generated_code() {
        let database = memory_database().await;
        let intern = register(&database, signup("jane@example.com")).await.unwrap();

        assert_eq!(intern.referral_code.len(), REFERRAL_CODE_LEN);
        let stored = intern.password_hash.as_deref().unwrap();
        assert_ne!(stored, "hunter2hunter2");
        assert!(password::verify("hunter2hunter2", stored).unwrap());
    }

    #[tokio::test]
    async fn register_keeps_requested_referral_code() {
        let database = memory_database().await;
        let mut request = signup("jane@example.com");
        request.referral_code = Some(" jane2025 ".to_string());

        let intern = register(&database, request).await.unwrap();
        assert_eq!(intern.referral_code, "jane2025");
    }

    #[tokio::test]
    async fn register_rejects_short_password_and_duplicates() {
        let database = memory_database().await;
        let mut weak = signup("jane@example.com");
        weak.password = "short".to_string();
        assert!(matches!(
            register(&database, weak).await,
            Err(AuthError::Store(StoreError::Validation(_)))
        ));

        register(&database, signup("jane@example.com")).await.unwrap();
        assert!(matches!(
            register(&database, signup("jane@example.com")).await,
            Err(AuthError::Store(StoreError::Uniqueness {
                field: UniqueField::Email
            }))
        ));
    }

    #[tokio::test]
    async fn authenticate_issues_token_for_valid_credentials() {
        let database = memory_database().await;
        let intern = register(&database, signup("jane@example.com")).await.unwrap();
        let signer = signer();

        let credentials = Credentials {
            email: "Jane@Example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        };
        let session = authenticate(&database, &signer, credentials).await.unwrap();

        assert_eq!(session.intern_id, intern.id);
        assert_eq!(signer.validate(&session.token).unwrap(), intern.id);
    }

    #[tokio::test]
    async fn authenticate_rejects_bad_credentials_uniformly() {
        let database = memory_database().await;
        register(&database, signup("jane@example.com")).await.unwrap();
        interns::create(
            &database,
            NewIntern::new("No Password", "nopass@example.com", "nopass"),
        )
        .await
        .unwrap();
        let signer = signer();

        for (email, password) in [
            ("jane@example.com", "wrong-password"),
            ("ghost@example.com", "hunter2hunter2"),
            ("nopass@example.com", "hunter2hunter2"),
        ] {
            let credentials = Credentials {
                email: email.to_string(),
                password: password.to_string(),
            };
            assert!(matches!(
                authenticate(&database, &signer, credentials).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
    }

    #[tokio::test]
    async fn placeholder_secret_does_not_open_passwordless_accounts() {
        let database = memory_database().await;
        interns::create(
            &database,
            NewIntern::new("No Password", "nopass@example.com", "nopass"),
        )
        .await
        .unwrap();
        let signer = signer();

        for email in ["nopass@example.com", "ghost@example.com"] {
            let credentials = Credentials {
                email: email.to_string(),
                password: "intern-dashboard-placeholder".to_string(),
            };
            assert!(matches!(
                authenticate(&database, &signer, credentials).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
    }
}
