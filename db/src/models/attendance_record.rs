use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Per-student outcome of one session: the whole stage roster is snapshotted
/// into records at upload time, present or not. `is_unpaid` is the unpaid
/// registry's state at upload, so later registry changes never rewrite
/// history. Absentees carry the session's `ended_at` as `scanned_at`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub student_id: String,
    pub scanned_at: DateTime<Utc>,
    pub is_present: bool,
    pub is_unpaid: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_session::Entity",
        from = "Column::SessionId",
        to = "super::attendance_session::Column::Id"
    )]
    Session,
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
