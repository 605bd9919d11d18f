use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub points_required: i32,
    pub is_unlocked: bool,
    pub intern_id: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::intern::Entity",
        from = "Column::InternId",
        to = "super::intern::Column::Id",
        on_delete = "Cascade"
    )]
    Intern,
}

impl Related<super::intern::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Intern.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
