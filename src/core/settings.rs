//! Per-user settings business logic.
//!
//! Stores each user's default Codewars username and Epic Games Store country.
//! Rows are created lazily on the first write; clearing a setting keeps the row.

use crate::{
    entities::{UserSettings, user_settings},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[derive(Debug, Clone, Copy)]
enum Setting {
    CodewarsUsername,
    EgsCountry,
}

/// Fetches the settings row for a user, if one was ever written.
pub async fn get_user_settings(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<user_settings::Model>> {
    UserSettings::find()
        .filter(user_settings::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user's stored Codewars username.
pub async fn get_codewars_username(db: &DatabaseConnection, user_id: &str) -> Result<Option<String>> {
    Ok(get_user_settings(db, user_id)
        .await?
        .and_then(|settings| settings.codewars_username))
}

/// Stores `username` as the user's default Codewars account.
///
/// Surrounding whitespace is trimmed; an empty name is rejected.
pub async fn set_codewars_username(
    db: &DatabaseConnection,
    user_id: &str,
    username: &str,
) -> Result<user_settings::Model> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::Config {
            message: "Codewars username cannot be empty".to_string(),
        });
    }
    write_setting(db, user_id, Setting::CodewarsUsername, Some(username.to_string())).await
}

pub async fn clear_codewars_username(db: &DatabaseConnection, user_id: &str) -> Result<()> {
    write_setting(db, user_id, Setting::CodewarsUsername, None).await?;
    Ok(())
}

/// Returns the user's stored EGS country code.
pub async fn get_egs_country(db: &DatabaseConnection, user_id: &str) -> Result<Option<String>> {
    Ok(get_user_settings(db, user_id)
        .await?
        .and_then(|settings| settings.egs_country))
}

/// Stores a two-letter country code (upper-cased) for the user's EGS feed.
pub async fn set_egs_country(
    db: &DatabaseConnection,
    user_id: &str,
    country: &str,
) -> Result<user_settings::Model> {
    let country = country.trim().to_uppercase();
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::Config {
            message: format!("'{country}' is not a two-letter country code"),
        });
    }
    write_setting(db, user_id, Setting::EgsCountry, Some(country)).await
}

pub async fn clear_egs_country(db: &DatabaseConnection, user_id: &str) -> Result<()> {
    write_setting(db, user_id, Setting::EgsCountry, None).await?;
    Ok(())
}

async fn write_setting(
    db: &DatabaseConnection,
    user_id: &str,
    setting: Setting,
    value: Option<String>,
) -> Result<user_settings::Model> {
    let now = Utc::now();

    let existing = get_user_settings(db, user_id).await?;
    let is_new = existing.is_none();
    let mut active_model = match existing {
        Some(existing) => existing.into(),
        None => user_settings::ActiveModel {
            user_id: Set(user_id.to_string()),
            codewars_username: Set(None),
            egs_country: Set(None),
            updated_at: Set(now),
            ..Default::default()
        },
    };

    match setting {
        Setting::CodewarsUsername => active_model.codewars_username = Set(value),
        Setting::EgsCountry => active_model.egs_country = Set(value),
    }
    active_model.updated_at = Set(now);

    let model = if is_new {
        active_model.insert(db).await?
    } else {
        active_model.update(db).await?
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_username_roundtrip() -> Result<()> {
        let db = setup_test_db().await?;

        assert_eq!(get_codewars_username(&db, "user1").await?, None);

        set_codewars_username(&db, "user1", "  g964 ").await?;
        assert_eq!(
            get_codewars_username(&db, "user1").await?.as_deref(),
            Some("g964")
        );

        // Overwrite keeps a single row
        set_codewars_username(&db, "user1", "jhoffner").await?;
        assert_eq!(
            get_codewars_username(&db, "user1").await?.as_deref(),
            Some("jhoffner")
        );
        assert_eq!(UserSettings::find().all(&db).await?.len(), 1);

        clear_codewars_username(&db, "user1").await?;
        assert_eq!(get_codewars_username(&db, "user1").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_username_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = set_codewars_username(&db, "user1", "   ").await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_settings_are_per_user_and_independent() -> Result<()> {
        let db = setup_test_db().await?;

        set_codewars_username(&db, "user1", "g964").await?;
        set_egs_country(&db, "user1", "de").await?;
        set_egs_country(&db, "user2", "US").await?;

        assert_eq!(get_egs_country(&db, "user1").await?.as_deref(), Some("DE"));
        assert_eq!(get_egs_country(&db, "user2").await?.as_deref(), Some("US"));
        assert_eq!(get_codewars_username(&db, "user2").await?, None);

        clear_egs_country(&db, "user1").await?;
        assert_eq!(get_egs_country(&db, "user1").await?, None);
        assert_eq!(
            get_codewars_username(&db, "user1").await?.as_deref(),
            Some("g964"),
            "clearing one setting leaves the other"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_country_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        for bad in ["", "TUR", "1A", "t"] {
            let result = set_egs_country(&db, "user1", bad).await;
            assert!(matches!(result, Err(Error::Config { .. })), "{bad}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_without_row_creates_empty_settings() -> Result<()> {
        let db = setup_test_db().await?;
        clear_egs_country(&db, "ghost").await?;
        let settings = get_user_settings(&db, "ghost").await?;
        assert!(settings.is_some_and(|s| s.egs_country.is_none() && s.codewars_username.is_none()));
        Ok(())
    }
}
