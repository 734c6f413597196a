//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggests the caller's stored Codewars username and common store country codes.

use crate::{bot::BotData, core::settings, errors::Error};

/// Country codes offered for `/egs locale set`. Any other two-letter code is still accepted.
const COUNTRY_CODES: &[&str] = &[
    "AR", "AT", "AU", "BE", "BR", "CA", "CH", "CL", "CN", "CO", "CZ", "DE", "DK", "ES", "FI",
    "FR", "GB", "GR", "HU", "ID", "IE", "IL", "IN", "IT", "JP", "KR", "MX", "NL", "NO", "NZ",
    "PH", "PL", "PT", "RO", "RU", "SA", "SE", "SG", "TH", "TR", "TW", "UA", "US", "VN", "ZA",
];

/// Suggests the caller's stored Codewars username when it matches the partial input.
pub async fn autocomplete_codewars_username(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let user_id = ctx.author().id.to_string();
    let Ok(Some(username)) = settings::get_codewars_username(&ctx.data().database, &user_id).await
    else {
        return Vec::new();
    };

    if username.to_lowercase().contains(&partial.to_lowercase()) {
        vec![username]
    } else {
        Vec::new()
    }
}

/// Suggests country codes starting with the partial input.
pub async fn autocomplete_country(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_countries(partial)
}

fn matching_countries(partial: &str) -> Vec<String> {
    let partial_upper = partial.trim().to_uppercase();
    COUNTRY_CODES
        .iter()
        .filter(|code| code.starts_with(&partial_upper))
        .map(|code| (*code).to_string())
        .take(25) // Discord autocomplete limit
        .collect()
}
