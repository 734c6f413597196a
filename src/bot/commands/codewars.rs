//! Codewars Discord commands - profile, languages, skills, completed katas, and settings.
//!
//! Commands that take an optional `user` fall back to the caller's stored username.
//! List-style results (languages, completed katas) are shown as reaction menus.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, render::embed_reply, send_menu},
        core::{
            codewars::{self, CodewarsClient},
            embed::{Embed, PageItem},
            settings,
        },
        errors::{Error, Result},
    };
    use tracing::{debug, warn};

    type Context<'a> = poise::Context<'a, BotData, Error>;

    const DEFAULT_COMPLETED_LIMIT: u32 = 10;
    const SETTINGS_TITLE: &str = "Codewars Username Settings";

    /// Returns the username to look up, or tells the caller how to register one.
    async fn resolve_username(ctx: Context<'_>, user: Option<String>) -> Result<Option<String>> {
        if let Some(user) = user.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            return Ok(Some(user));
        }

        let user_id = ctx.author().id.to_string();
        let stored = settings::get_codewars_username(&ctx.data().database, &user_id).await?;
        if stored.is_none() {
            ctx.say(format!(
                "You haven't registered your username yet. Use `{}codewars username set <username>` to register.",
                ctx.prefix()
            ))
            .await?;
        }
        Ok(stored)
    }

    /// The avatar is decoration; a failed scrape only drops the thumbnail.
    async fn avatar_or_none(client: &CodewarsClient, username: &str) -> Option<String> {
        client
            .get_user_avatar(username)
            .await
            .inspect_err(|e| warn!("Could not fetch avatar for {}: {}", username, e))
            .ok()
    }

    async fn show_profile(ctx: Context<'_>, user: Option<String>) -> Result<()> {
        ctx.defer().await?;
        let Some(username) = resolve_username(ctx, user).await? else {
            return Ok(());
        };

        let client = &ctx.data().codewars;
        let profile = client.get_user(&username).await?;
        let avatar = avatar_or_none(client, &username).await;

        let embed = codewars::profile_embed(&profile, avatar.as_deref(), client.site_url());
        ctx.send(embed_reply(&embed)).await?;
        Ok(())
    }

    /// Shows your Codewars profile, or someone else's.
    ///
    /// With a prefix, `cw <user>` works as a shortcut for `codewars profile <user>`.
    #[poise::command(
        slash_command,
        prefix_command,
        aliases("cw"),
        subcommands(
            "profile",
            "languages",
            "skills",
            "completed",
            "kata",
            "avatar",
            "username"
        )
    )]
    pub async fn codewars(
        ctx: Context<'_>,
        #[description = "Codewars username (defaults to yours)"] user: Option<String>,
    ) -> Result<()> {
        show_profile(ctx, user).await
    }

    /// Overall rank, score, honor and clan of a Codewars user.
    #[poise::command(slash_command, prefix_command)]
    pub async fn profile(
        ctx: Context<'_>,
        #[description = "Codewars username (defaults to yours)"]
        #[autocomplete = "autocomplete::autocomplete_codewars_username"]
        user: Option<String>,
    ) -> Result<()> {
        show_profile(ctx, user).await
    }

    /// Per-language ranks and scores, one page per language.
    #[poise::command(slash_command, prefix_command, aliases("l", "lang"))]
    pub async fn languages(
        ctx: Context<'_>,
        #[description = "Codewars username (defaults to yours)"]
        #[autocomplete = "autocomplete::autocomplete_codewars_username"]
        user: Option<String>,
    ) -> Result<()> {
        ctx.defer().await?;
        let Some(username) = resolve_username(ctx, user).await? else {
            return Ok(());
        };

        let client = &ctx.data().codewars;
        let profile = client.get_user(&username).await?;
        let avatar = avatar_or_none(client, &username).await;

        let pages: Vec<PageItem> =
            codewars::language_embeds(&profile, avatar.as_deref(), client.site_url())
                .into_iter()
                .map(PageItem::from)
                .collect();
        if pages.is_empty() {
            ctx.say(format!("{} has no language stats yet.", profile.username))
                .await?;
            return Ok(());
        }

        let outcome = send_menu(ctx, pages, 1).await?;
        debug!("languages menu ended: {:?}", outcome);
        Ok(())
    }

    /// Skills a Codewars user lists on their profile.
    #[poise::command(slash_command, prefix_command, aliases("sk", "skill"))]
    pub async fn skills(
        ctx: Context<'_>,
        #[description = "Codewars username (defaults to yours)"]
        #[autocomplete = "autocomplete::autocomplete_codewars_username"]
        user: Option<String>,
    ) -> Result<()> {
        ctx.defer().await?;
        let Some(username) = resolve_username(ctx, user).await? else {
            return Ok(());
        };

        let client = &ctx.data().codewars;
        let profile = client.get_user(&username).await?;
        let avatar = avatar_or_none(client, &username).await;

        let embed = codewars::skills_embed(&profile, avatar.as_deref(), client.site_url());
        ctx.send(embed_reply(&embed)).await?;
        Ok(())
    }

    /// Recently completed katas as a reaction menu.
    #[poise::command(slash_command, prefix_command)]
    pub async fn completed(
        ctx: Context<'_>,
        #[description = "Codewars username (defaults to yours)"]
        #[autocomplete = "autocomplete::autocomplete_codewars_username"]
        user: Option<String>,
        #[description = "How many katas to list (1-20, default 10)"]
        #[min = 1]
        #[max = 20]
        limit: Option<u32>,
    ) -> Result<()> {
        ctx.defer().await?;
        let Some(username) = resolve_username(ctx, user).await? else {
            return Ok(());
        };
        let limit = limit.unwrap_or(DEFAULT_COMPLETED_LIMIT);

        let client = &ctx.data().codewars;
        let katas = client.get_completed(&username, limit).await?;
        let profile = client.get_user(&username).await?;
        let avatar = avatar_or_none(client, &username).await;

        let mut pages = Vec::with_capacity(katas.len());
        for completed in &katas {
            let details = client
                .get_kata(&completed.id)
                .await
                .inspect_err(|e| warn!("Could not fetch kata {}: {}", completed.id, e))
                .ok();
            pages.push(PageItem::from(codewars::completed_embed(
                &profile.username,
                limit,
                completed,
                details.as_ref(),
                avatar.as_deref(),
                client.site_url(),
            )));
        }

        let outcome = send_menu(ctx, pages, ctx.data().config.menu.page_size).await?;
        debug!("completed menu ended: {:?}", outcome);
        Ok(())
    }

    /// Details of a kata, by ID or slug.
    #[poise::command(slash_command, prefix_command)]
    pub async fn kata(
        ctx: Context<'_>,
        #[description = "Kata ID or slug"] id: String,
    ) -> Result<()> {
        ctx.defer().await?;
        let client = &ctx.data().codewars;
        let kata = client.get_kata(id.trim()).await?;
        ctx.send(embed_reply(&codewars::kata_embed(&kata, client.site_url())))
            .await?;
        Ok(())
    }

    /// A Codewars user's profile picture.
    #[poise::command(slash_command, prefix_command, aliases("a", "av"))]
    pub async fn avatar(
        ctx: Context<'_>,
        #[description = "Codewars username"]
        #[autocomplete = "autocomplete::autocomplete_codewars_username"]
        user: String,
    ) -> Result<()> {
        ctx.defer().await?;
        let url = ctx.data().codewars.get_user_avatar(user.trim()).await?;
        ctx.say(url).await?;
        Ok(())
    }

    /// Manage the Codewars username used when you don't name one.
    #[poise::command(
        slash_command,
        prefix_command,
        aliases("u"),
        subcommands("username_get", "username_set", "username_delete")
    )]
    pub async fn username(ctx: Context<'_>) -> Result<()> {
        let help_text = "Codewars username settings. Available subcommands:\n\
            `codewars username get` - Show your current username\n\
            `codewars username set <username>` - Set your default username\n\
            `codewars username delete` - Forget your username";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows your stored Codewars username.
    #[poise::command(slash_command, prefix_command, rename = "get", aliases("g"))]
    pub async fn username_get(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let stored = settings::get_codewars_username(&ctx.data().database, &user_id).await?;

        let message = stored.map_or_else(
            || {
                format!(
                    "You haven't set your default Codewars username yet. Use `{}codewars username set <username>` to set.",
                    ctx.prefix()
                )
            },
            |username| format!("Current username: `{username}`"),
        );
        ctx.send(embed_reply(&Embed::new().field(SETTINGS_TITLE, message, false)))
            .await?;
        Ok(())
    }

    /// Sets your default Codewars username.
    #[poise::command(slash_command, prefix_command, rename = "set", aliases("s"))]
    pub async fn username_set(
        ctx: Context<'_>,
        #[description = "Your Codewars username"] username: String,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let message =
            match settings::set_codewars_username(&ctx.data().database, &user_id, &username).await {
                Ok(saved) => format!(
                    "Your default Codewars username is set to **{}**",
                    saved.codewars_username.unwrap_or_default()
                ),
                Err(Error::Config { message }) => format!("❌ {message}"),
                Err(e) => return Err(e),
            };
        ctx.send(embed_reply(&Embed::new().field(SETTINGS_TITLE, message, false)))
            .await?;
        Ok(())
    }

    /// Forgets your default Codewars username.
    #[poise::command(slash_command, prefix_command, rename = "delete", aliases("d", "del"))]
    pub async fn username_delete(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        settings::clear_codewars_username(&ctx.data().database, &user_id).await?;
        ctx.send(embed_reply(&Embed::new().field(
            SETTINGS_TITLE,
            "Deleted default Codewars username from database.",
            false,
        )))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
