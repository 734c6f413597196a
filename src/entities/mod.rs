//! Entity module - Contains the `SeaORM` entity definitions for the database.

pub mod user_settings;

pub use user_settings::{
    Column as UserSettingsColumn, Entity as UserSettings, Model as UserSettingsModel,
};
