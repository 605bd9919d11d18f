use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::debug;
use validator::Validate;

use crate::entities::{intern, reward};

use super::{StoreError, reward_write_error};

#[derive(Debug, Clone, Validate)]
pub struct NewReward {
    pub intern_id: i32,
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0, message = "points_required cannot be negative"))]
    pub points_required: i32,
    pub is_unlocked: bool,
}

impl NewReward {
    pub fn new(
        intern_id: i32,
        name: impl Into<String>,
        description: impl Into<String>,
        points_required: i32,
    ) -> Self {
        Self {
            intern_id,
            name: name.into(),
            description: description.into(),
            points_required,
            is_unlocked: false,
        }
    }

    pub fn unlocked(self) -> Self {
        Self {
            is_unlocked: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RewardChanges {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "points_required cannot be negative"))]
    pub points_required: Option<i32>,
    pub is_unlocked: Option<bool>,
}

/// Creates a reward, checking its owner in the same transaction.
pub async fn create<C>(database: &C, new_reward: NewReward) -> Result<reward::Model, StoreError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let new_reward = NewReward {
        name: new_reward.name.trim().to_string(),
        ..new_reward
    };
    new_reward.validate()?;
    let intern_id = new_reward.intern_id;

    let txn = database.begin().await?;
    let owner = intern::Entity::find_by_id(intern_id).one(&txn).await?;
    if owner.is_none() {
        return Err(StoreError::ReferentialIntegrity { intern_id });
    }

    let active = reward::ActiveModel {
        id: NotSet,
        name: Set(new_reward.name),
        description: Set(new_reward.description),
        points_required: Set(new_reward.points_required),
        is_unlocked: Set(new_reward.is_unlocked),
        intern_id: Set(intern_id),
        created_at: Set(Utc::now().fixed_offset()),
    };
    let model = active
        .insert(&txn)
        .await
        .map_err(|err| reward_write_error(err, intern_id))?;
    txn.commit().await?;

    debug!(reward_id = model.id, intern_id, "Reward created");
    Ok(model)
}

pub async fn find<C: ConnectionTrait>(database: &C, id: i32) -> Result<reward::Model, StoreError> {
    reward::Entity::find_by_id(id)
        .one(database)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "reward",
            id,
        })
}

pub async fn list_for_intern<C: ConnectionTrait>(
    database: &C,
    intern_id: i32,
) -> Result<Vec<reward::Model>, StoreError> {
    let rewards = reward::Entity::find()
        .filter(reward::Column::InternId.eq(intern_id))
        .order_by_asc(reward::Column::Id)
        .all(database)
        .await?;
    Ok(rewards)
}

pub async fn update<C>(
    database: &C,
    id: i32,
    changes: RewardChanges,
) -> Result<reward::Model, StoreError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let changes = RewardChanges {
        name: changes.name.map(|name| name.trim().to_string()),
        ..changes
    };
    changes.validate()?;

    let txn = database.begin().await?;
    let current = reward::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "reward",
            id,
        })?;
    let intern_id = current.intern_id;

    let mut active = current.into_active_model();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(points_required) = changes.points_required {
        active.points_required = Set(points_required);
    }
    if let Some(is_unlocked) = changes.is_unlocked {
        active.is_unlocked = Set(is_unlocked);
    }

    let model = active
        .update(&txn)
        .await
        .map_err(|err| reward_write_error(err, intern_id))?;
    txn.commit().await?;
    Ok(model)
}

pub async fn delete<C: ConnectionTrait>(database: &C, id: i32) -> Result<(), StoreError> {
    let result = reward::Entity::delete_by_id(id).exec(database).await?;
    if result.rows_affected == 0 {
        return Err(StoreError::NotFound {
            entity: "reward",
            id,
        });
    }
    Ok(())
}
