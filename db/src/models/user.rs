use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents an account in the `users` table. Super admins manage
/// departments, department users manage one department's roster, lecturers
/// upload attendance for their assigned courses.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string; never serialized to clients by the routes.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    /// Required for department users and lecturers, null for super admins.
    pub department_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Account role, stored as a string column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,

    #[sea_orm(string_value = "department_user")]
    DepartmentUser,

    #[sea_orm(string_value = "lecturer")]
    Lecturer,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
    #[sea_orm(has_many = "super::api_token::Entity")]
    ApiTokens,
    #[sea_orm(has_many = "super::attendance_session::Entity")]
    Sessions,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::api_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApiTokens.def()
    }
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Hashes a plaintext password into an Argon2 PHC string.
    pub fn hash_password(password: &str) -> Result<String, DbErr> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DbErr::Custom(format!("Failed to hash password: {e}")))
    }

    /// Verifies a plaintext password against this user's stored hash.
    /// A malformed stored hash verifies as false rather than erroring.
    pub fn verify_password(&self, password: &str) -> bool {
        PasswordHash::new(&self.password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    pub async fn create(
        db: &DatabaseConnection,
        username: &str,
        password: &str,
        role: Role,
        department_id: Option<i64>,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            id: NotSet,
            username: Set(username.to_owned()),
            password_hash: Set(Self::hash_password(password)?),
            role: Set(role),
            department_id: Set(department_id),
            created_at: Set(Utc::now()),
        };
        active.insert(db).await
    }

    pub async fn find_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::Username.eq(username))
            .one(db)
            .await
    }

    pub async fn username_taken(db: &DatabaseConnection, username: &str) -> Result<bool, DbErr> {
        Ok(Self::find_by_username(db, username).await?.is_some())
    }
}
