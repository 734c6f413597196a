//! Codewars API client and the embeds built from its responses.
//!
//! The REST API covers users, katas and completed challenges. The avatar is
//! not exposed there, so it is scraped from the public profile page.

use crate::config::settings::CodewarsConfig;
use crate::core::embed::Embed;
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Codewars organisation avatar used as author/footer icon.
pub const CODEWARS_ICON: &str = "https://avatars.githubusercontent.com/u/5387632?s=200";
/// Most completed katas a single request may list.
pub const MAX_COMPLETED_LIMIT: u32 = 20;
/// Discord's limit for an embed description.
const DESCRIPTION_LIMIT: usize = 4096;
const FOOTER: &str = "© Codewars";

static AVATAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<figure[^>]*>\s*<a[^>]*>\s*<img[^>]*?\ssrc="([^"]+)""#)
        .unwrap_or_else(|e| unreachable!("avatar pattern is valid: {e}"))
});

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodewarsUser {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub honor: i64,
    #[serde(default)]
    pub clan: Option<String>,
    #[serde(default)]
    pub leaderboard_position: Option<u64>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    pub ranks: Ranks,
    #[serde(default)]
    pub code_challenges: CodeChallenges,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ranks {
    pub overall: Rank,
    #[serde(default)]
    pub languages: BTreeMap<String, Rank>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rank {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub score: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChallenges {
    #[serde(default)]
    pub total_completed: u64,
}

/// A code challenge as returned by `/code-challenges/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    /// Beta katas have a rank object with null fields
    #[serde(default)]
    pub rank: Option<KataRank>,
    #[serde(default)]
    pub created_by: Option<KataUser>,
    #[serde(default)]
    pub approved_by: Option<KataUser>,
    #[serde(default)]
    pub total_attempts: u64,
    #[serde(default)]
    pub total_completed: u64,
    #[serde(default)]
    pub total_stars: u64,
    #[serde(default)]
    pub vote_score: i64,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub approved_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KataRank {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KataUser {
    pub username: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletedPage {
    #[serde(default)]
    total_items: u64,
    #[serde(default)]
    data: Vec<CompletedKata>,
}

/// One entry of a user's completed challenges.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedKata {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub completed_languages: Vec<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Kata {
    #[must_use]
    pub fn rank_name(&self) -> &str {
        self.rank
            .as_ref()
            .and_then(|rank| rank.name.as_deref())
            .unwrap_or("N/A")
    }

    #[must_use]
    pub fn rank_color(&self) -> u32 {
        rank_color(
            self.rank
                .as_ref()
                .and_then(|rank| rank.color.as_deref())
                .unwrap_or_default(),
        )
    }
}

/// HTTP client for the Codewars API and website.
#[derive(Debug, Clone)]
pub struct CodewarsClient {
    http: Client,
    api_url: String,
    site_url: String,
}

impl CodewarsClient {
    #[must_use]
    pub fn new(config: &CodewarsConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_client(http: Client, config: &CodewarsConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            site_url: config.site_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    fn user_api_url(&self, username: &str) -> Result<String> {
        Ok(format!("{}/users/{}", self.api_url, user_segment(username)?))
    }

    /// Fetches a user profile.
    ///
    /// # Errors
    /// [`Error::CodewarsUserNotFound`] when the API answers 404.
    #[instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> Result<CodewarsUser> {
        let url = self.user_api_url(username)?;
        let response = self.http.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(Error::CodewarsUserNotFound {
                username: username.to_string(),
            }),
            status => Err(unexpected(status)),
        }
    }

    /// Fetches a kata by ID or slug.
    #[instrument(skip(self))]
    pub async fn get_kata(&self, id: &str) -> Result<Kata> {
        let segment =
            path_segment(id).ok_or_else(|| Error::KataNotFound { id: id.to_string() })?;
        let url = format!("{}/code-challenges/{segment}", self.api_url);
        let response = self.http.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(Error::KataNotFound { id: id.to_string() }),
            status => Err(unexpected(status)),
        }
    }

    /// Lists the `limit` most recent completed katas of a user.
    ///
    /// # Errors
    /// [`Error::InvalidLimit`] unless `1 <= limit <= 20`, checked before any request;
    /// [`Error::NoCompletedKatas`] when the user has completed nothing.
    #[instrument(skip(self))]
    pub async fn get_completed(&self, username: &str, limit: u32) -> Result<Vec<CompletedKata>> {
        validate_limit(limit)?;
        let url = format!(
            "{}/code-challenges/completed?page=0",
            self.user_api_url(username)?
        );
        let response = self.http.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => {
                let page: CompletedPage = response.json().await?;
                take_completed(page, limit)
            }
            StatusCode::NOT_FOUND => Err(Error::CodewarsUserNotFound {
                username: username.to_string(),
            }),
            status => Err(unexpected(status)),
        }
    }

    /// Scrapes the avatar URL from the user's public profile page.
    #[instrument(skip(self))]
    pub async fn get_user_avatar(&self, username: &str) -> Result<String> {
        let url = format!("{}/users/{}", self.site_url, user_segment(username)?);
        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::CodewarsUserNotFound {
                username: username.to_string(),
            });
        }
        let body = response.error_for_status()?.text().await?;
        extract_avatar_url(&body).ok_or_else(|| Error::AvatarNotFound {
            username: username.to_string(),
        })
    }
}

/// Percent-encodes user input for use as one URL path segment.
///
/// `None` for values that cannot name a resource: empty, or only dots
/// (URL parsing would resolve those as `.`/`..` path steps).
fn path_segment(value: &str) -> Option<Cow<'_, str>> {
    let value = value.trim();
    if value.chars().all(|c| c == '.') {
        return None;
    }
    Some(urlencoding::encode(value))
}

fn user_segment(username: &str) -> Result<Cow<'_, str>> {
    path_segment(username).ok_or_else(|| Error::CodewarsUserNotFound {
        username: username.to_string(),
    })
}

const fn unexpected(status: StatusCode) -> Error {
    Error::UnexpectedStatus {
        service: "Codewars",
        status: status.as_u16(),
    }
}

fn validate_limit(limit: u32) -> Result<()> {
    if (1..=MAX_COMPLETED_LIMIT).contains(&limit) {
        Ok(())
    } else {
        Err(Error::InvalidLimit { limit })
    }
}

fn take_completed(page: CompletedPage, limit: u32) -> Result<Vec<CompletedKata>> {
    if page.total_items == 0 || page.data.is_empty() {
        return Err(Error::NoCompletedKatas);
    }
    let mut data = page.data;
    data.truncate(limit as usize);
    debug!("Returning {} completed katas", data.len());
    Ok(data)
}

/// Pulls the avatar `<img src>` out of a profile page.
#[must_use]
pub fn extract_avatar_url(html: &str) -> Option<String> {
    AVATAR_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
}

/// Maps a Codewars rank colour name to an embed colour. Unknown names are white.
#[must_use]
pub fn rank_color(color: &str) -> u32 {
    match color {
        "yellow" => 0x00FF_FF00,
        "blue" => 0x0000_00FF,
        "purple" => 0x0080_0080,
        "black" => 0x0000_0000,
        "red" => 0x00FF_0000,
        _ => 0x00FF_FFFF,
    }
}

/// Converts an ISO-8601 timestamp to unix seconds; `0` when it cannot be parsed.
#[must_use]
pub fn iso_to_unix(iso: &str) -> i64 {
    DateTime::parse_from_rfc3339(iso).map_or(0, |dt| dt.timestamp())
}

/// Makes a markdown kata description readable inside an embed.
///
/// Headings become bold lines, `<br>` becomes a newline, and a "Description"
/// heading is added when the text does not already open with one.
#[must_use]
pub fn format_description(description: &str) -> String {
    let mut formatted = String::with_capacity(description.len() + 20);
    if !description.starts_with("## Description") {
        formatted.push_str("**Description**\n");
    }

    for (i, line) in description.lines().enumerate() {
        if i > 0 {
            formatted.push('\n');
        }
        match heading_text(line) {
            Some(heading) => {
                formatted.push_str("**");
                formatted.push_str(heading);
                formatted.push_str("**");
            }
            None => formatted.push_str(line),
        }
    }

    formatted.replace("<br>", "\n")
}

fn heading_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with("##") {
        return None;
    }
    let rest = trimmed.trim_start_matches('#');
    rest.strip_prefix(' ').map(str::trim)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Thumbnail for a language's page in the `languages` menu.
#[must_use]
pub fn language_image(language: &str) -> Option<&'static str> {
    Some(match language {
        "c" => "https://i.imgur.com/IgMT4VW.png",
        "clojure" => "https://i.imgur.com/SsEWBmW.png",
        "coffeescript" => "https://i.imgur.com/rEWxYhv.png",
        "cpp" => "https://i.imgur.com/O5BcX33.png",
        "csharp" => "https://i.imgur.com/IdlAR1B.png",
        "go" => "https://i.imgur.com/JCA1E0Q.png",
        "groovy" => "https://i.imgur.com/BoWWCFx.png",
        "haskell" => "https://i.imgur.com/MRXo1U0.png",
        "java" => "https://i.imgur.com/HbzHc9Z.png",
        "javascript" => "https://i.imgur.com/8DFw5s9.png",
        "kotlin" => "https://i.imgur.com/Kbdj3tB.png",
        "lua" => "https://i.imgur.com/1gvQNMh.png",
        "ocaml" => "https://i.imgur.com/coYXRb6.png",
        "php" => "https://i.imgur.com/PHxL185.png",
        "powershell" => "https://i.imgur.com/fHIAYGk.png",
        "python" => "https://i.imgur.com/DCBz8dd.png",
        "r" => "https://i.imgur.com/FQS2tdC.png",
        "ruby" => "https://i.imgur.com/W0bXkco.png",
        "rust" => "https://i.imgur.com/BExi1sJ.png",
        "scala" => "https://i.imgur.com/S9tRrcr.png",
        "swift" => "https://i.imgur.com/3xCT5PY.png",
        "typescript" => "https://i.imgur.com/dUsR3e4.png",
        _ => return None,
    })
}

fn profile_url(site_url: &str, username: &str) -> String {
    format!("{site_url}/users/{}", urlencoding::encode(username))
}

/// Overall stats card for `/codewars profile`.
#[must_use]
pub fn profile_embed(user: &CodewarsUser, avatar: Option<&str>, site_url: &str) -> Embed {
    let mut embed = Embed::new()
        .color(rank_color(&user.ranks.overall.color))
        .author(
            format!("Codewars Stats of {}", user.username),
            Some(profile_url(site_url, &user.username)),
            Some(CODEWARS_ICON.to_string()),
        )
        .field("Overall Rank", &user.ranks.overall.name, true)
        .field("Overall Score", user.ranks.overall.score.to_string(), true)
        .field(
            "Total Completed",
            user.code_challenges.total_completed.to_string(),
            true,
        )
        .field(
            "Leaderboard Position",
            user.leaderboard_position
                .map_or_else(|| "N/A".to_string(), |p| p.to_string()),
            true,
        )
        .field("Honor", user.honor.to_string(), true)
        .field(
            "Clan",
            user.clan.as_deref().filter(|c| !c.is_empty()).unwrap_or("None"),
            true,
        )
        .footer(FOOTER, None)
        .timestamp(Utc::now());

    if let Some(name) = user.name.as_deref().filter(|n| !n.is_empty()) {
        embed = embed.description(name);
    }
    if let Some(avatar) = avatar {
        embed = embed.thumbnail(avatar);
    }
    embed
}

/// One card per trained language, highest score first.
#[must_use]
pub fn language_embeds(user: &CodewarsUser, avatar: Option<&str>, site_url: &str) -> Vec<Embed> {
    let mut languages: Vec<(&String, &Rank)> = user.ranks.languages.iter().collect();
    languages.sort_by(|a, b| b.1.score.cmp(&a.1.score));

    languages
        .into_iter()
        .map(|(language, rank)| {
            let mut embed = Embed::new()
                .color(rank_color(&rank.color))
                .author(
                    format!("Codewars Stats of {}", user.username),
                    Some(profile_url(site_url, &user.username)),
                    avatar.map(str::to_string),
                )
                .field("Language", capitalize(language), true)
                .field("Rank", &rank.name, true)
                .field("Score", rank.score.to_string(), true)
                .footer(FOOTER, Some(CODEWARS_ICON.to_string()))
                .timestamp(Utc::now());
            if let Some(image) = language_image(language) {
                embed = embed.thumbnail(image);
            }
            embed
        })
        .collect()
}

#[must_use]
pub fn skills_embed(user: &CodewarsUser, avatar: Option<&str>, site_url: &str) -> Embed {
    let skills = user
        .skills
        .as_deref()
        .filter(|s| !s.is_empty())
        .map_or_else(|| "None".to_string(), |s| s.join(", "));

    let mut embed = Embed::new()
        .color(rank_color(&user.ranks.overall.color))
        .author(
            format!("Codewars Skills of {}", user.username),
            Some(profile_url(site_url, &user.username)),
            Some(CODEWARS_ICON.to_string()),
        )
        .field("Skills", skills, false)
        .footer(FOOTER, None)
        .timestamp(Utc::now());
    if let Some(avatar) = avatar {
        embed = embed.thumbnail(avatar);
    }
    embed
}

/// Card for one completed kata. `details` is `None` when the kata lookup failed.
#[must_use]
pub fn completed_embed(
    username: &str,
    limit: u32,
    completed: &CompletedKata,
    details: Option<&Kata>,
    avatar: Option<&str>,
    site_url: &str,
) -> Embed {
    let name = details
        .map(|k| k.name.as_str())
        .or(completed.name.as_deref())
        .unwrap_or("Unknown");
    let kata_url = details
        .and_then(|k| k.url.clone())
        .unwrap_or_else(|| format!("{site_url}/kata/{}", completed.id));
    let languages = if completed.completed_languages.is_empty() {
        "N/A".to_string()
    } else {
        completed.completed_languages.join(", ")
    };
    let completed_at = iso_to_unix(completed.completed_at.as_deref().unwrap_or_default());

    let value = format!(
        "**Rank:** {}\n**Category:** {}\n**Completed/Attempts:** {}\n**Completed At:** <t:{completed_at}:R>\n**Completed Languages:** {languages}\n[[Go To Kata]({kata_url})]",
        details.map_or("N/A", Kata::rank_name),
        details
            .and_then(|k| k.category.as_deref())
            .map_or_else(|| "N/A".to_string(), capitalize),
        details.map_or_else(
            || "N/A".to_string(),
            |k| format!("{} / {}", k.total_completed, k.total_attempts)
        ),
    );

    let mut embed = Embed::new()
        .color(details.map_or(0, Kata::rank_color))
        .author(
            format!("Last {limit} Completed Katas of {username}"),
            Some(format!("{}/completed", profile_url(site_url, username))),
            Some(CODEWARS_ICON.to_string()),
        )
        .field(name, value, false)
        .timestamp(Utc::now());
    if let Some(avatar) = avatar {
        embed = embed.thumbnail(avatar);
    }
    embed
}

/// Full description card for `/codewars kata`.
#[must_use]
pub fn kata_embed(kata: &Kata, site_url: &str) -> Embed {
    let author = kata.created_by.as_ref().map_or_else(
        || "Unknown".to_string(),
        |by| format!("[{}]({})", by.username, by.url),
    );
    let published = kata
        .published_at
        .as_deref()
        .map_or_else(|| "Unknown".to_string(), |p| format!("<t:{}:f>", iso_to_unix(p)));

    let embed = Embed::new()
        .color(kata.rank_color())
        .author(
            &kata.name,
            Some(format!("{site_url}/kata/{}", kata.id)),
            Some(CODEWARS_ICON.to_string()),
        )
        .description(truncate(
            &format_description(kata.description.as_deref().unwrap_or("Unknown")),
            DESCRIPTION_LIMIT,
        ))
        .field("Rank", kata.rank_name(), true)
        .field(
            "Category",
            kata.category
                .as_deref()
                .map_or_else(|| "Unknown".to_string(), capitalize),
            true,
        )
        .field("Author", author, true)
        .field("Attempts", kata.total_attempts.to_string(), true)
        .field("Completed", kata.total_completed.to_string(), true)
        .field("Stars", kata.total_stars.to_string(), true)
        .field("Score", kata.vote_score.to_string(), true)
        .field("Published At", published, true);

    let embed = match kata.approved_at.as_deref() {
        Some(approved) => embed.field("Approved At", format!("<t:{}:f>", iso_to_unix(approved)), true),
        None => embed.field("Approved", "\u{274C}", true),
    };

    embed.footer(FOOTER, None).timestamp(Utc::now())
}
