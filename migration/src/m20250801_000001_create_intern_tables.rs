use sea_orm_migration::prelude::*;

/// 99,999,999.99 in cents.
const MAX_DONATION_CENTS: i64 = 9_999_999_999;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Interns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Interns::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Interns::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Interns::Email)
                            .string_len(254)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Interns::ReferralCode)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Interns::TotalDonationsCents)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(
                                Expr::col(Interns::TotalDonationsCents)
                                    .gte(0)
                                    .and(
                                        Expr::col(Interns::TotalDonationsCents)
                                            .lte(MAX_DONATION_CENTS),
                                    ),
                            ),
                    )
                    .col(ColumnDef::new(Interns::PasswordHash).string_len(255).null())
                    .col(
                        ColumnDef::new(Interns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Interns::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rewards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rewards::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rewards::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Rewards::Description).text().not_null())
                    .col(
                        ColumnDef::new(Rewards::PointsRequired)
                            .integer()
                            .not_null()
                            .check(Expr::col(Rewards::PointsRequired).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Rewards::IsUnlocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Rewards::InternId).integer().not_null())
                    .col(
                        ColumnDef::new(Rewards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rewards_intern")
                            .from(Rewards::Table, Rewards::InternId)
                            .to(Interns::Table, Interns::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rewards_intern_id")
                    .table(Rewards::Table)
                    .col(Rewards::InternId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rewards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Interns::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Interns {
    Table,
    Id,
    Name,
    Email,
    ReferralCode,
    TotalDonationsCents,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Rewards {
    Table,
    Id,
    Name,
    Description,
    PointsRequired,
    IsUnlocked,
    InternId,
    CreatedAt,
}
