//! Framework-agnostic rich content.
//!
//! Commands assemble [`Embed`] values and hand them to the menu core as [`PageItem`]s;
//! only the bot layer knows how to turn them into serenity builders.

use chrono::{DateTime, Utc};

/// Colour used for error embeds.
pub const ERROR_COLOR: u32 = 0x00E7_4C3C;

/// One renderable unit of menu content.
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    /// Plain message text
    Text(String),
    /// Structured rich-content block
    Embed(Embed),
}

impl From<Embed> for PageItem {
    fn from(value: Embed) -> Self {
        Self::Embed(value)
    }
}

impl From<String> for PageItem {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for PageItem {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Author line shown at the top of an embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: Option<String>,
    pub icon_url: Option<String>,
}

/// A name/value pair; inline fields are laid out side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

/// Rich content block, built with chained setters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embed {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub author: Option<EmbedAuthor>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<EmbedFooter>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A red embed with a single field, the way command failures are reported.
    #[must_use]
    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self::new()
            .color(ERROR_COLOR)
            .field(title, message, false)
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn author(
        mut self,
        name: impl Into<String>,
        url: Option<String>,
        icon_url: Option<String>,
    ) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            url,
            icon_url,
        });
        self
    }

    #[must_use]
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    #[must_use]
    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    #[must_use]
    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url,
        });
        self
    }

    #[must_use]
    pub const fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_builder_accumulates_fields_in_order() {
        let embed = Embed::new()
            .title("Stats")
            .field("Rank", "4 kyu", true)
            .field("Honor", "1234", true)
            .footer("© Codewars", None);

        assert_eq!(embed.title.as_deref(), Some("Stats"));
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].name, "Rank");
        assert_eq!(embed.fields[1].value, "1234");
        assert_eq!(embed.footer.unwrap().text, "© Codewars");
    }

    #[test]
    fn test_error_embed_is_red() {
        let embed = Embed::error("Codewars Error", "user not found");
        assert_eq!(embed.color, Some(ERROR_COLOR));
        assert_eq!(embed.fields[0].value, "user not found");
        assert!(!embed.fields[0].inline);
    }
}
