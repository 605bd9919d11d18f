use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{debug, info};
use validator::Validate;

use crate::entities::{intern, reward};
use crate::models::money::Amount;

use super::{StoreError, UniqueField, ensure_total_in_range, intern_write_error, rewards};

#[derive(Debug, Clone, Validate)]
pub struct NewIntern {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(
        email(message = "email is invalid"),
        length(max = 254, message = "email exceeds 254 characters")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "referral_code must be 1 to 50 characters"))]
    pub referral_code: String,
    pub total_donations: Amount,
    pub password_hash: Option<String>,
}

impl NewIntern {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        referral_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            referral_code: referral_code.into(),
            total_donations: Amount::ZERO,
            password_hash: None,
        }
    }

    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            referral_code: self.referral_code.trim().to_string(),
            ..self
        }
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct InternChanges {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: Option<String>,
    #[validate(
        email(message = "email is invalid"),
        length(max = 254, message = "email exceeds 254 characters")
    )]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 50, message = "referral_code must be 1 to 50 characters"))]
    pub referral_code: Option<String>,
    pub total_donations: Option<Amount>,
    pub password_hash: Option<String>,
}

impl InternChanges {
    fn normalized(self) -> Self {
        Self {
            name: self.name.map(|name| name.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
            referral_code: self.referral_code.map(|code| code.trim().to_string()),
            ..self
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn create<C>(
    database: &C,
    new_intern: NewIntern,
) -> Result<intern::Model, StoreError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let new_intern = new_intern.normalized();
    new_intern.validate()?;
    ensure_total_in_range(new_intern.total_donations)?;

    let txn = database.begin().await?;
    ensure_unique(
        &txn,
        Some(new_intern.email.as_str()),
        Some(new_intern.referral_code.as_str()),
        None,
    )
    .await?;

    let now = Utc::now().fixed_offset();
    let active = intern::ActiveModel {
        id: NotSet,
        name: Set(new_intern.name),
        email: Set(new_intern.email),
        referral_code: Set(new_intern.referral_code),
        total_donations_cents: Set(new_intern.total_donations.cents()),
        password_hash: Set(new_intern.password_hash),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let model = active.insert(&txn).await.map_err(intern_write_error)?;
    txn.commit().await?;

    info!(intern_id = model.id, "Intern created");
    Ok(model)
}

pub async fn find<C: ConnectionTrait>(database: &C, id: i32) -> Result<intern::Model, StoreError> {
    find_in(database, id).await
}

pub async fn find_by_email<C: ConnectionTrait>(
    database: &C,
    email: &str,
) -> Result<Option<intern::Model>, StoreError> {
    let intern = intern::Entity::find()
        .filter(intern::Column::Email.eq(normalize_email(email)))
        .one(database)
        .await?;
    Ok(intern)
}

pub async fn list<C: ConnectionTrait>(database: &C) -> Result<Vec<intern::Model>, StoreError> {
    let interns = intern::Entity::find()
        .order_by_asc(intern::Column::Id)
        .all(database)
        .await?;
    Ok(interns)
}

pub async fn update<C>(
    database: &C,
    id: i32,
    changes: InternChanges,
) -> Result<intern::Model, StoreError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let changes = changes.normalized();
    changes.validate()?;
    if let Some(amount) = changes.total_donations {
        ensure_total_in_range(amount)?;
    }

    let txn = database.begin().await?;
    let current = find_in(&txn, id).await?;
    ensure_unique(
        &txn,
        changes.email.as_deref(),
        changes.referral_code.as_deref(),
        Some(id),
    )
    .await?;

    let mut active = current.into_active_model();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(email) = changes.email {
        active.email = Set(email);
    }
    if let Some(referral_code) = changes.referral_code {
        active.referral_code = Set(referral_code);
    }
    if let Some(amount) = changes.total_donations {
        active.total_donations_cents = Set(amount.cents());
    }
    if let Some(password_hash) = changes.password_hash {
        active.password_hash = Set(Some(password_hash));
    }
    active.updated_at = Set(Utc::now().fixed_offset());

    let model = active.update(&txn).await.map_err(intern_write_error)?;
    txn.commit().await?;

    debug!(intern_id = id, "Intern updated");
    Ok(model)
}

/// Deletes the intern together with every reward it owns.
pub async fn delete<C>(database: &C, id: i32) -> Result<(), StoreError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = database.begin().await?;
    find_in(&txn, id).await?;

    let removed = reward::Entity::delete_many()
        .filter(reward::Column::InternId.eq(id))
        .exec(&txn)
        .await?;
    intern::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        intern_id = id,
        rewards_removed = removed.rows_affected,
        "Intern deleted"
    );
    Ok(())
}

/// Loads an intern and its rewards in id order.
pub async fn with_rewards<C: ConnectionTrait>(
    database: &C,
    id: i32,
) -> Result<(intern::Model, Vec<reward::Model>), StoreError> {
    let intern = find_in(database, id).await?;
    let rewards = rewards::list_for_intern(database, id).await?;
    Ok((intern, rewards))
}

async fn find_in<C: ConnectionTrait>(connection: &C, id: i32) -> Result<intern::Model, StoreError> {
    intern::Entity::find_by_id(id)
        .one(connection)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "intern",
            id,
        })
}

async fn ensure_unique<C: ConnectionTrait>(
    connection: &C,
    email: Option<&str>,
    referral_code: Option<&str>,
    exclude_id: Option<i32>,
) -> Result<(), StoreError> {
    if email.is_none() && referral_code.is_none() {
        return Ok(());
    }

    let mut matches = Condition::any();
    if let Some(email) = email {
        matches = matches.add(intern::Column::Email.eq(email));
    }
    if let Some(code) = referral_code {
        matches = matches.add(intern::Column::ReferralCode.eq(code));
    }

    let mut query = intern::Entity::find().filter(matches);
    if let Some(id) = exclude_id {
        query = query.filter(intern::Column::Id.ne(id));
    }

    let Some(existing) = query.one(connection).await? else {
        return Ok(());
    };
    let field = if email == Some(existing.email.as_str()) {
        UniqueField::Email
    } else {
        UniqueField::ReferralCode
    };
    Err(StoreError::Uniqueness { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::rewards::NewReward;
    use crate::store::test_support::memory_database;

    fn jane() -> NewIntern {
        NewIntern::new("Jane Doe", "jane@example.com", "jane2025")
    }

    #[tokio::test]
    async fn create_defaults_donations_to_zero() {
        let database = memory_database().await;
        let intern = create(&database, jane()).await.unwrap();

        assert_eq!(intern.name, "Jane Doe");
        assert_eq!(intern.total_donations_cents, 0);
        assert_eq!(intern.created_at, intern.updated_at);
        assert!(intern.password_hash.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let database = memory_database().await;
        create(&database, jane()).await.unwrap();

        let duplicate = NewIntern::new("Other Jane", " JANE@example.com ", "other2025");
        let err = create(&database, duplicate).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Uniqueness {
                field: UniqueField::Email
            }
        ));
        assert_eq!(list(&database).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_referral_code_is_rejected() {
        let database = memory_database().await;
        create(&database, jane()).await.unwrap();

        let duplicate = NewIntern::new("John Doe", "john@example.com", "jane2025");
        let err = create(&database, duplicate).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Uniqueness {
                field: UniqueField::ReferralCode
            }
        ));
    }

    #[tokio::test]
    async fn malformed_fields_fail_validation() {
        let database = memory_database().await;

        let bad_email = NewIntern::new("Jane Doe", "not-an-email", "jane2025");
        assert!(matches!(
            create(&database, bad_email).await,
            Err(StoreError::Validation(_))
        ));

        let blank_name = NewIntern::new("   ", "jane@example.com", "jane2025");
        assert!(matches!(
            create(&database, blank_name).await,
            Err(StoreError::Validation(_))
        ));

        let mut negative = jane();
        negative.total_donations = Amount::from_cents(-1);
        assert!(matches!(
            create(&database, negative).await,
            Err(StoreError::Validation(_))
        ));
        assert!(list(&database).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_refreshes_timestamp_and_rejects_negative_totals() {
        let database = memory_database().await;
        let created = create(&database, jane()).await.unwrap();

        let changes = InternChanges {
            total_donations: Some(Amount::from_cents(125_000)),
            ..InternChanges::default()
        };
        let updated = update(&database, created.id, changes).await.unwrap();
        assert_eq!(updated.total_donations_cents, 125_000);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let negative = InternChanges {
            total_donations: Some(Amount::from_cents(-500)),
            ..InternChanges::default()
        };
        let err = update(&database, created.id, negative).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(
            find(&database, created.id).await.unwrap().total_donations_cents,
            125_000
        );
    }

    #[tokio::test]
    async fn update_cannot_steal_another_interns_email() {
        let database = memory_database().await;
        create(&database, jane()).await.unwrap();
        let john = create(
            &database,
            NewIntern::new("John Doe", "john@example.com", "john2025"),
        )
        .await
        .unwrap();

        let changes = InternChanges {
            email: Some("jane@example.com".to_string()),
            ..InternChanges::default()
        };
        let err = update(&database, john.id, changes).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Uniqueness {
                field: UniqueField::Email
            }
        ));

        let same_email = InternChanges {
            email: Some("john@example.com".to_string()),
            ..InternChanges::default()
        };
        assert!(update(&database, john.id, same_email).await.is_ok());
    }

    #[tokio::test]
    async fn missing_interns_are_not_found() {
        let database = memory_database().await;
        assert!(matches!(
            find(&database, 42).await,
            Err(StoreError::NotFound { id: 42, .. })
        ));
        assert!(matches!(
            delete(&database, 42).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(find_by_email(&database, "ghost@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_cascades_to_rewards() {
        let database = memory_database().await;
        let jane = create(&database, jane()).await.unwrap();
        let john = create(
            &database,
            NewIntern::new("John Doe", "john@example.com", "john2025"),
        )
        .await
        .unwrap();
        for owner in [jane.id, jane.id, john.id] {
            rewards::create(&database, NewReward::new(owner, "Bronze Badge", "First", 100))
                .await
                .unwrap();
        }

        delete(&database, jane.id).await.unwrap();

        assert!(find(&database, jane.id).await.is_err());
        assert!(rewards::list_for_intern(&database, jane.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            rewards::list_for_intern(&database, john.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn with_rewards_returns_rewards_in_id_order() {
        let database = memory_database().await;
        let jane = create(&database, jane()).await.unwrap();
        for (name, points) in [("Bronze Badge", 100), ("Silver Badge", 500)] {
            rewards::create(&database, NewReward::new(jane.id, name, "Tier", points))
                .await
                .unwrap();
        }

        let (intern, rewards) = with_rewards(&database, jane.id).await.unwrap();
        assert_eq!(intern.id, jane.id);
        let names: Vec<_> = rewards.iter().map(|reward| reward.name.as_str()).collect();
        assert_eq!(names, ["Bronze Badge", "Silver Badge"]);
    }
}
