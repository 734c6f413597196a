//! Conversion from core content to serenity builders.

use crate::core::embed::{Embed, PageItem};
use poise::serenity_prelude as serenity;

/// Builds a serenity embed from a core [`Embed`].
#[must_use]
pub fn create_embed(embed: &Embed) -> serenity::CreateEmbed {
    let mut builder = serenity::CreateEmbed::new();

    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(url) = &embed.url {
        builder = builder.url(url);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    if let Some(color) = embed.color {
        builder = builder.colour(color);
    }
    if let Some(author) = &embed.author {
        let mut author_builder = serenity::CreateEmbedAuthor::new(&author.name);
        if let Some(url) = &author.url {
            author_builder = author_builder.url(url);
        }
        if let Some(icon_url) = &author.icon_url {
            author_builder = author_builder.icon_url(icon_url);
        }
        builder = builder.author(author_builder);
    }
    if let Some(thumbnail) = &embed.thumbnail {
        builder = builder.thumbnail(thumbnail);
    }
    if let Some(image) = &embed.image {
        builder = builder.image(image);
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &embed.footer {
        let mut footer_builder = serenity::CreateEmbedFooter::new(&footer.text);
        if let Some(icon_url) = &footer.icon_url {
            footer_builder = footer_builder.icon_url(icon_url);
        }
        builder = builder.footer(footer_builder);
    }
    if let Some(timestamp) = embed
        .timestamp
        .and_then(|ts| serenity::Timestamp::from_unix_timestamp(ts.timestamp()).ok())
    {
        builder = builder.timestamp(timestamp);
    }

    builder
}

/// A page split into message text and embeds.
///
/// Text items are joined by newlines; embed items keep their order.
#[derive(Default)]
pub struct PageParts {
    pub content: String,
    pub embeds: Vec<serenity::CreateEmbed>,
}

#[must_use]
pub fn page_parts(items: &[PageItem]) -> PageParts {
    let mut texts = Vec::new();
    let mut embeds = Vec::new();
    for item in items {
        match item {
            PageItem::Text(text) => texts.push(text.as_str()),
            PageItem::Embed(embed) => embeds.push(create_embed(embed)),
        }
    }
    PageParts {
        content: texts.join("\n"),
        embeds,
    }
}

impl PageParts {
    #[must_use]
    pub fn into_create_message(self) -> serenity::CreateMessage {
        let mut message = serenity::CreateMessage::new().embeds(self.embeds);
        if !self.content.is_empty() {
            message = message.content(self.content);
        }
        message
    }

    /// An edit replaces both the text and every embed of the message.
    #[must_use]
    pub fn into_edit_message(self) -> serenity::EditMessage {
        serenity::EditMessage::new()
            .content(self.content)
            .embeds(self.embeds)
    }

    #[must_use]
    pub fn into_edit_interaction_response(self) -> serenity::EditInteractionResponse {
        serenity::EditInteractionResponse::new()
            .content(self.content)
            .embeds(self.embeds)
    }
}

/// A reply carrying a single embed.
#[must_use]
pub fn embed_reply(embed: &Embed) -> poise::CreateReply {
    poise::CreateReply::default().embed(create_embed(embed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_parts_split_text_and_embeds() {
        let items = vec![
            PageItem::from("first"),
            PageItem::from(Embed::new().title("card")),
            PageItem::from("second"),
        ];
        let parts = page_parts(&items);
        assert_eq!(parts.content, "first\nsecond");
        assert_eq!(parts.embeds.len(), 1);
    }

    #[test]
    fn test_embed_only_page_has_no_text() {
        let items = vec![PageItem::from(Embed::new()), PageItem::from(Embed::new())];
        let parts = page_parts(&items);
        assert!(parts.content.is_empty());
        assert_eq!(parts.embeds.len(), 2);
    }
}
