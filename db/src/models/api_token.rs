use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::IntoActiveModel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Opaque bearer token for the mobile API. Minted at login, valid until
/// `expires_at`; expired rows are deleted lazily on first use after expiry.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds a fresh token: 16 random bytes hex-encoded (32 lowercase hex
    /// characters) with the given lifetime.
    pub fn mint(user_id: i64, lifetime_days: i64) -> Self {
        let mut buf = [0u8; 16];
        OsRng.fill_bytes(&mut buf);

        Self {
            id: 0,
            user_id,
            token: hex::encode(buf),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(lifetime_days),
        }
    }

    pub async fn create(
        db: &DatabaseConnection,
        user_id: i64,
        lifetime_days: i64,
    ) -> Result<Self, DbErr> {
        let model = Self::mint(user_id, lifetime_days);
        let mut active_model = model.into_active_model();
        active_model.id = NotSet;
        active_model.insert(db).await
    }

    pub async fn find_by_token(
        db: &DatabaseConnection,
        token: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find().filter(Column::Token.eq(token)).one(db).await
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    pub async fn delete(self, db: &DatabaseConnection) -> Result<(), DbErr> {
        Entity::delete_by_id(self.id).exec(db).await?;
        Ok(())
    }
}
