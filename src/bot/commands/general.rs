//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let prefix = &ctx.data().config.prefix;
        let help_text = format!(
            "**KataBuddy Help**\n\
            Menus react with ⬅️ ❌ ➡️; only the person who ran the command can flip pages.\n\n\
            **Codewars** (`{prefix}cw` works too)\n\
            • `/codewars profile [user]` - Overall rank, honor and clan.\n\
            • `/codewars languages [user]` - Per-language ranks as a menu.\n\
            • `/codewars skills [user]` - Listed skills.\n\
            • `/codewars completed [user] [limit]` - Recently completed katas (1-20) as a menu.\n\
            • `/codewars kata <id>` - Details of a kata by ID or slug.\n\
            • `/codewars avatar <user>` - Profile picture.\n\
            • `/codewars username get|set|delete` - Your default Codewars username.\n\n\
            **Epic Games Store**\n\
            • `/egs current` - Games free right now, as a menu.\n\
            • `/egs upcoming` - Games free next, as a menu.\n\
            • `/egs singly` - Current free games, one message each.\n\
            • `/egs locale get|set|delete` - Your store country (e.g. `DE`).\n\n\
            **Utility**\n\
            • `/ping` - Checks if the bot is responsive.\n\
            • `/help` - Shows this help message."
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
