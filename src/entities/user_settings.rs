//! User settings entity - per-user defaults for the Codewars and EGS commands.
//!
//! One row per Discord user. Every setting is optional; a cleared setting is stored as NULL.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID the settings belong to
    #[sea_orm(unique)]
    pub user_id: String,
    /// Default Codewars username for `/codewars` commands
    pub codewars_username: Option<String>,
    /// Two-letter country code used for the Epic Games Store feed
    pub egs_country: Option<String>,
    /// When any setting was last changed
    pub updated_at: DateTimeUtc,
}

/// `UserSettings` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
