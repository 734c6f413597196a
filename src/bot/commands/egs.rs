//! Epic Games Store Discord commands - current and upcoming free games, and the
//! per-user store country.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, render::embed_reply, send_menu},
        core::{
            color::dominant_color_in_background,
            egs::{self, GameInfo, PromotionKind},
            embed::{Embed, PageItem},
            settings,
        },
        errors::{Error, Result},
    };
    use chrono::Utc;
    use tracing::{debug, warn};

    type Context<'a> = poise::Context<'a, BotData, Error>;

    /// Pixel sampling step for artwork colours.
    const COLOR_QUALITY: usize = 10;
    const SETTINGS_TITLE: &str = "EGS Locale Setting";

    async fn country_for(ctx: Context<'_>) -> Result<String> {
        let user_id = ctx.author().id.to_string();
        let stored = settings::get_egs_country(&ctx.data().database, &user_id).await?;
        Ok(stored.unwrap_or_else(|| ctx.data().egs.default_country().to_string()))
    }

    async fn artwork_color(ctx: Context<'_>, info: &GameInfo) -> Option<u32> {
        let url = info.key_image.as_deref()?;
        let bytes = ctx
            .data()
            .egs
            .fetch_image(url)
            .await
            .inspect_err(|e| warn!("Could not download key image {}: {}", url, e))
            .ok()?;
        dominant_color_in_background(bytes, COLOR_QUALITY)
            .await
            .inspect_err(|e| warn!("Could not read key image {}: {}", url, e))
            .ok()
            .flatten()
    }

    /// One embed per free game of the given promotion window, in feed order.
    async fn game_embeds(ctx: Context<'_>, kind: PromotionKind) -> Result<Vec<Embed>> {
        let country = country_for(ctx).await?;
        let elements = ctx.data().egs.fetch_elements(&country).await?;
        let games = match kind {
            PromotionKind::Current => egs::current_free_games(&elements),
            PromotionKind::Upcoming => egs::upcoming_free_games(&elements),
        };
        debug!("{} {:?} free games for {}", games.len(), kind, country);

        let now = Utc::now();
        let mut embeds = Vec::with_capacity(games.len());
        for game in games {
            let info = GameInfo::from_element(game, kind);
            let color = artwork_color(ctx, &info).await;
            embeds.push(egs::game_embed(&info, color, now));
        }
        Ok(embeds)
    }

    async fn show_menu(ctx: Context<'_>, kind: PromotionKind, empty_message: &str) -> Result<()> {
        ctx.defer().await?;
        let embeds = game_embeds(ctx, kind).await?;
        if embeds.is_empty() {
            ctx.say(empty_message).await?;
            return Ok(());
        }

        let pages: Vec<PageItem> = embeds.into_iter().map(PageItem::from).collect();
        let outcome = send_menu(ctx, pages, 1).await?;
        debug!("egs menu ended: {:?}", outcome);
        Ok(())
    }

    /// Free games on the Epic Games Store.
    ///
    /// Without a subcommand, lists the games that are free right now.
    #[poise::command(
        slash_command,
        prefix_command,
        subcommands("current", "upcoming", "singly", "locale")
    )]
    pub async fn egs(ctx: Context<'_>) -> Result<()> {
        show_menu(ctx, PromotionKind::Current, "No free games found.").await
    }

    /// Games that are free right now, one page each.
    #[poise::command(slash_command, prefix_command)]
    pub async fn current(ctx: Context<'_>) -> Result<()> {
        show_menu(ctx, PromotionKind::Current, "No free games found.").await
    }

    /// Games that will be free in the next promotion, one page each.
    #[poise::command(slash_command, prefix_command, aliases("up", "egsu"))]
    pub async fn upcoming(ctx: Context<'_>) -> Result<()> {
        show_menu(ctx, PromotionKind::Upcoming, "No upcoming free games found.").await
    }

    /// Current free games, one message per game.
    #[poise::command(slash_command, prefix_command, aliases("list", "single", "1by1"))]
    pub async fn singly(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;
        let embeds = game_embeds(ctx, PromotionKind::Current).await?;
        if embeds.is_empty() {
            ctx.say("No free games found.").await?;
            return Ok(());
        }
        for embed in &embeds {
            ctx.send(embed_reply(embed)).await?;
        }
        Ok(())
    }

    /// Manage the store country used for your free games lookups.
    #[poise::command(
        slash_command,
        prefix_command,
        aliases("l"),
        subcommands("locale_get", "locale_set", "locale_delete")
    )]
    pub async fn locale(ctx: Context<'_>) -> Result<()> {
        let help_text = "EGS locale settings. Available subcommands:\n\
            `egs locale get` - Show your current country\n\
            `egs locale set <COUNTRY_CODE>` - Set your country (e.g. DE)\n\
            `egs locale delete` - Go back to the default country";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows the store country used for you.
    #[poise::command(slash_command, prefix_command, rename = "get", aliases("g"))]
    pub async fn locale_get(ctx: Context<'_>) -> Result<()> {
        let country = country_for(ctx).await?;
        ctx.send(embed_reply(&Embed::new().field(
            SETTINGS_TITLE,
            format!("Locale is **{country}**"),
            false,
        )))
        .await?;
        Ok(())
    }

    /// Sets your store country.
    #[poise::command(slash_command, prefix_command, rename = "set", aliases("s"))]
    pub async fn locale_set(
        ctx: Context<'_>,
        #[description = "Two-letter country code, e.g. DE"]
        #[autocomplete = "autocomplete::autocomplete_country"]
        country: String,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let message = match settings::set_egs_country(&ctx.data().database, &user_id, &country).await {
            Ok(saved) => format!(
                "New locale is set to **{}**",
                saved.egs_country.unwrap_or_default()
            ),
            Err(Error::Config { message }) => format!("❌ {message}"),
            Err(e) => return Err(e),
        };
        ctx.send(embed_reply(&Embed::new().field(SETTINGS_TITLE, message, false)))
            .await?;
        Ok(())
    }

    /// Removes your store country, falling back to the default.
    #[poise::command(slash_command, prefix_command, rename = "delete", aliases("d", "del"))]
    pub async fn locale_delete(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        settings::clear_egs_country(&ctx.data().database, &user_id).await?;
        ctx.send(embed_reply(&Embed::new().field(
            SETTINGS_TITLE,
            "Deleted locale setting.",
            false,
        )))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
