//! Domain operations for the attendance backend.
//!
//! Everything here works directly against a [`sea_orm::DatabaseConnection`]
//! and returns [`ServiceError`]; HTTP concerns (status codes, envelopes,
//! extractors) live in the `api` crate. Authorization decisions are made by
//! the explicit predicates in [`authz`], not by the request pipeline.

pub mod attendance;
pub mod auth;
pub mod authz;
pub mod departments;
pub mod error;
pub mod import;
pub mod students;

pub use error::ServiceError;
