//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the `KataBuddy` application:
//! slash/prefix commands, autocomplete handlers, the serenity menu transport,
//! and the bot context shared by every command.

/// Discord command implementations (codewars, egs, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;
/// Core content to serenity builders
pub mod render;
/// Serenity implementation of the menu transport
pub mod transport;

use crate::{
    config::BotConfig,
    core::{
        codewars::CodewarsClient,
        egs::EgsClient,
        embed::{Embed, PageItem},
        menu::{ControlTable, MenuOutcome, MenuTransport, Session, run_menu},
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument};
use transport::SerenityMenuTransport;

/// Shared data available to all bot commands.
/// This structure holds the database connection, the loaded configuration,
/// and the HTTP clients for the external services.
pub struct BotData {
    /// Database connection for per-user settings
    pub database: DatabaseConnection,
    /// Settings loaded from config.toml
    pub config: Arc<BotConfig>,
    /// Codewars API client
    pub codewars: CodewarsClient,
    /// Epic Games Store feed client
    pub egs: EgsClient,
}

impl BotData {
    /// Creates a new `BotData`, building the vendor clients from `config`.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: Arc<BotConfig>) -> Self {
        Self {
            database,
            codewars: CodewarsClient::new(&config.codewars),
            egs: EgsClient::new(&config.egs),
            config,
        }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Runs a reaction menu over `items` for the command's author, with the standard
/// previous/close/next controls.
///
/// Slash commands must be deferred beforehand; the first page becomes the response.
pub async fn send_menu(ctx: Context<'_>, items: Vec<PageItem>, page_size: usize) -> Result<MenuOutcome> {
    let mut transport = SerenityMenuTransport::new(ctx.serenity_context(), ctx.channel_id());
    if let poise::Context::Application(app_ctx) = ctx {
        transport = transport.replying_to(app_ctx.interaction);
    }
    let transport: Arc<dyn MenuTransport> = Arc::new(transport);

    let session = Session::new(ctx.author().id.get(), items, ControlTable::standard())
        .with_page_size(page_size)?
        .with_timeout(ctx.data().config.menu.timeout());

    run_menu(transport, session).await
}

fn error_title(ctx: Context<'_>) -> &'static str {
    match ctx.command().qualified_name.split(' ').next() {
        Some("codewars") => "Codewars Error",
        Some("egs") => "EGS Error",
        _ => "Error",
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().qualified_name, error);
            let embed = Embed::error(error_title(ctx), error.to_string());
            if let Err(e) = ctx.send(render::embed_reply(&embed)).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
#[instrument(skip(token, config, database))]
pub async fn run_bot(
    token: String,
    config: Arc<BotConfig>,
    database: DatabaseConnection,
) -> Result<()> {
    let prefix = config.prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::codewars(),
                commands::egs(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, config))
            })
        })
        .build();

    // Reaction intents drive the menus; message content enables prefix commands
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGE_REACTIONS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
