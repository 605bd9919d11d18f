use serde::{Deserialize, Serialize};

use crate::entities::{intern, reward};
use crate::models::money::Amount;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub points_required: i32,
    pub is_unlocked: bool,
}

impl From<&reward::Model> for RewardView {
    fn from(model: &reward::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            description: model.description.clone(),
            points_required: model.points_required,
            is_unlocked: model.is_unlocked,
        }
    }
}

/// Intern as exposed on the wire. Rewards are embedded read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub referral_code: String,
    pub total_donations: Amount,
    pub rewards: Vec<RewardView>,
}

impl InternView {
    /// Builds the view, refusing records that break the stored invariants.
    pub fn from_records(
        intern: &intern::Model,
        rewards: &[reward::Model],
    ) -> Result<Self, StoreError> {
        let total_donations = Amount::from_cents(intern.total_donations_cents);
        if total_donations.is_negative() || total_donations.exceeds_max() {
            return Err(StoreError::Invariant {
                entity: "intern",
                id: intern.id,
                reason: format!("total_donations {total_donations} is out of range"),
            });
        }

        let mut views = Vec::with_capacity(rewards.len());
        for reward in rewards {
            if reward.intern_id != intern.id {
                return Err(StoreError::Invariant {
                    entity: "reward",
                    id: reward.id,
                    reason: format!("owned by intern {}, not {}", reward.intern_id, intern.id),
                });
            }
            views.push(RewardView::from(reward));
        }

        Ok(Self {
            id: intern.id,
            name: intern.name.clone(),
            email: intern.email.clone(),
            referral_code: intern.referral_code.clone(),
            total_donations,
            rewards: views,
        })
    }
}
