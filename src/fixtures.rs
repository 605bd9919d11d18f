//! Demo data, applied only when `demo.seed` is enabled and in tests.

use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::auth::password;
use crate::entities::intern;
use crate::models::money::Amount;
use crate::store::interns::{self, NewIntern};
use crate::store::rewards::{self, NewReward};

pub const DEMO_EMAIL: &str = "john.doe@example.com";
const DEMO_NAME: &str = "John Doe";
const DEMO_REFERRAL_CODE: &str = "johndoe2025";
const DEMO_DONATIONS_CENTS: i64 = 125_000;

pub struct BadgeTier {
    pub name: &'static str,
    pub description: &'static str,
    pub points_required: i32,
    pub unlocked: bool,
}

pub const BADGE_TIERS: [BadgeTier; 5] = [
    BadgeTier {
        name: "Bronze Badge",
        description: "Complete your first donation campaign",
        points_required: 100,
        unlocked: true,
    },
    BadgeTier {
        name: "Silver Badge",
        description: "Raise $500 in donations",
        points_required: 500,
        unlocked: true,
    },
    BadgeTier {
        name: "Gold Badge",
        description: "Raise $1000 in donations",
        points_required: 1000,
        unlocked: true,
    },
    BadgeTier {
        name: "Platinum Badge",
        description: "Raise $2000 in donations",
        points_required: 2000,
        unlocked: false,
    },
    BadgeTier {
        name: "Diamond Badge",
        description: "Raise $5000 in donations",
        points_required: 5000,
        unlocked: false,
    },
];

/// Seeds the demo intern with the badge ladder. Returns the existing record
/// untouched when the demo intern is already present.
pub async fn seed_demo(
    database: &DatabaseConnection,
    demo_password: Option<&str>,
) -> Result<intern::Model> {
    seed_with(database, demo_password, &BADGE_TIERS).await
}

/// The intern and every tier are written in one transaction; a failed tier
/// leaves nothing behind.
async fn seed_with(
    database: &DatabaseConnection,
    demo_password: Option<&str>,
    tiers: &[BadgeTier],
) -> Result<intern::Model> {
    let txn = database
        .begin()
        .await
        .context("Failed to open demo seed transaction")?;

    if let Some(existing) = interns::find_by_email(&txn, DEMO_EMAIL)
        .await
        .context("Failed to look up demo intern")?
    {
        info!(intern_id = existing.id, "Demo intern already present");
        return Ok(existing);
    }

    let mut demo = NewIntern::new(DEMO_NAME, DEMO_EMAIL, DEMO_REFERRAL_CODE);
    demo.total_donations = Amount::from_cents(DEMO_DONATIONS_CENTS);
    if let Some(secret) = demo_password {
        demo.password_hash =
            Some(password::hash(secret).context("Failed to hash demo password")?);
    }
    let intern = interns::create(&txn, demo)
        .await
        .context("Failed to create demo intern")?;

    for tier in tiers {
        let mut reward = NewReward::new(
            intern.id,
            tier.name,
            tier.description,
            tier.points_required,
        );
        if tier.unlocked {
            reward = reward.unlocked();
        }
        rewards::create(&txn, reward)
            .await
            .with_context(|| format!("Failed to create demo reward {}", tier.name))?;
    }

    txn.commit()
        .await
        .context("Failed to commit demo seed")?;
    info!(intern_id = intern.id, "Demo intern seeded");
    Ok(intern)
}
