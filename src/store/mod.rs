//! Persistence for interns and their rewards.
//!
//! Uniqueness of `email` and `referral_code` is backed by unique indexes, so
//! concurrent writers cannot both succeed. Every multi-statement write runs in
//! a transaction that rolls back when dropped on an error path.

use std::fmt;

use sea_orm::{DbErr, SqlErr};

use crate::models::money::Amount;

pub mod interns;
pub mod rewards;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("an intern with this {field} already exists")]
    Uniqueness { field: UniqueField },
    #[error("intern {intern_id} does not exist")]
    ReferentialIntegrity { intern_id: i32 },
    #[error("{entity} {id} violates a stored invariant: {reason}")]
    Invariant {
        entity: &'static str,
        id: i32,
        reason: String,
    },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    ReferralCode,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Email => f.write_str("email"),
            UniqueField::ReferralCode => f.write_str("referral_code"),
        }
    }
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        StoreError::Validation(errors.to_string())
    }
}

fn ensure_total_in_range(amount: Amount) -> Result<(), StoreError> {
    if amount.is_negative() {
        return Err(StoreError::Validation(format!(
            "total_donations cannot be negative, got {amount}"
        )));
    }
    if amount.exceeds_max() {
        return Err(StoreError::Validation(format!(
            "total_donations cannot exceed {}, got {amount}",
            Amount::MAX
        )));
    }
    Ok(())
}

/// Maps constraint failures reported by the database on an `interns` write.
fn intern_write_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            let field = if message.contains("referral_code") {
                UniqueField::ReferralCode
            } else {
                UniqueField::Email
            };
            StoreError::Uniqueness { field }
        }
        _ => StoreError::Database(err),
    }
}

/// Maps constraint failures reported by the database on a `rewards` write.
fn reward_write_error(err: DbErr, intern_id: i32) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            StoreError::ReferentialIntegrity { intern_id }
        }
        _ => StoreError::Database(err),
    }
}
