//! Serenity binding of the menu's message transport.

use super::render::page_parts;
use crate::core::menu::{
    InputFilter, MenuTransport, MessageHandle, ReactionInput, ReactionOwner, RenderedPage,
    TransportError, TransportResult,
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, trace};

/// Maps serenity failures onto the cases the menu distinguishes.
fn classify(error: serenity::Error) -> TransportError {
    if let serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response)) = &error {
        match response.status_code.as_u16() {
            404 => return TransportError::NotFound,
            403 => return TransportError::PermissionDenied,
            _ => {}
        }
    }
    TransportError::Other(error.to_string())
}

fn reaction_type(symbol: &str) -> serenity::ReactionType {
    serenity::ReactionType::Unicode(symbol.to_string())
}

fn reaction_input(reaction: &serenity::Reaction) -> Option<ReactionInput> {
    let serenity::ReactionType::Unicode(symbol) = &reaction.emoji else {
        return None;
    };
    Some(ReactionInput {
        message_id: reaction.message_id.get(),
        user_id: reaction.user_id?.get(),
        symbol: symbol.clone(),
    })
}

/// Runs a menu in one Discord channel.
///
/// When built for a slash command, the first page becomes the (deferred) interaction
/// response; later operations go through the channel like any other message.
pub struct SerenityMenuTransport {
    ctx: serenity::Context,
    channel_id: serenity::ChannelId,
    interaction: Mutex<Option<serenity::CommandInteraction>>,
}

impl SerenityMenuTransport {
    #[must_use]
    pub fn new(ctx: &serenity::Context, channel_id: serenity::ChannelId) -> Self {
        Self {
            ctx: ctx.clone(),
            channel_id,
            interaction: Mutex::new(None),
        }
    }

    /// Answers `interaction` with the first page instead of posting a new message.
    /// The interaction must already be deferred.
    #[must_use]
    pub fn replying_to(mut self, interaction: &serenity::CommandInteraction) -> Self {
        self.interaction = Mutex::new(Some(interaction.clone()));
        self
    }

    fn take_interaction(&self) -> Option<serenity::CommandInteraction> {
        self.interaction
            .lock()
            .ok()
            .and_then(|mut pending| pending.take())
    }

    fn message_id(handle: MessageHandle) -> serenity::MessageId {
        serenity::MessageId::new(handle.message_id)
    }

    fn channel(handle: MessageHandle) -> serenity::ChannelId {
        serenity::ChannelId::new(handle.channel_id)
    }
}

#[async_trait]
impl MenuTransport for SerenityMenuTransport {
    async fn send(&self, page: RenderedPage<'_>) -> TransportResult<MessageHandle> {
        let parts = page_parts(page.items);
        let message = match self.take_interaction() {
            Some(interaction) => interaction
                .edit_response(&self.ctx.http, parts.into_edit_interaction_response())
                .await
                .map_err(classify)?,
            None => self
                .channel_id
                .send_message(&self.ctx, parts.into_create_message())
                .await
                .map_err(classify)?,
        };
        trace!(message_id = %message.id, "menu message sent");
        Ok(MessageHandle {
            channel_id: message.channel_id.get(),
            message_id: message.id.get(),
        })
    }

    async fn edit(&self, handle: MessageHandle, page: RenderedPage<'_>) -> TransportResult<()> {
        Self::channel(handle)
            .edit_message(
                &self.ctx,
                Self::message_id(handle),
                page_parts(page.items).into_edit_message(),
            )
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn delete(&self, handle: MessageHandle) -> TransportResult<()> {
        Self::channel(handle)
            .delete_message(&self.ctx.http, Self::message_id(handle))
            .await
            .map_err(classify)
    }

    async fn add_reaction(&self, handle: MessageHandle, symbol: &str) -> TransportResult<()> {
        Self::channel(handle)
            .create_reaction(&self.ctx.http, Self::message_id(handle), reaction_type(symbol))
            .await
            .map_err(classify)
    }

    async fn remove_reaction(
        &self,
        handle: MessageHandle,
        symbol: &str,
        owner: ReactionOwner,
    ) -> TransportResult<()> {
        let user_id = match owner {
            ReactionOwner::Bot => None,
            ReactionOwner::User(id) => Some(serenity::UserId::new(id)),
        };
        Self::channel(handle)
            .delete_reaction(
                &self.ctx.http,
                Self::message_id(handle),
                user_id,
                reaction_type(symbol),
            )
            .await
            .map_err(classify)
    }

    async fn clear_reactions(&self, handle: MessageHandle) -> TransportResult<()> {
        Self::channel(handle)
            .delete_reactions(&self.ctx.http, Self::message_id(handle))
            .await
            .map_err(classify)
    }

    async fn await_input(
        &self,
        filter: &InputFilter,
        timeout: Duration,
    ) -> TransportResult<Option<ReactionInput>> {
        let qualifies = filter.clone();
        let reaction = serenity::ReactionCollector::new(&self.ctx.shard)
            .message_id(serenity::MessageId::new(filter.message_id))
            .author_id(serenity::UserId::new(filter.participant))
            .filter(move |reaction| {
                reaction_input(reaction).is_some_and(|input| qualifies.matches(&input))
            })
            .timeout(timeout)
            .next()
            .await;
        Ok(reaction.as_ref().and_then(reaction_input))
    }

    async fn can_manage_messages(&self, handle: MessageHandle) -> bool {
        let channel = match Self::channel(handle).to_channel(&self.ctx).await {
            Ok(channel) => channel,
            Err(e) => {
                debug!("could not resolve menu channel: {}", e);
                return false;
            }
        };
        // Direct messages never allow managing the other party's reactions
        let Some(guild_channel) = channel.guild() else {
            return false;
        };
        let bot_id = self.ctx.cache.current_user().id;
        guild_channel
            .permissions_for_user(&self.ctx.cache, bot_id)
            .is_ok_and(|permissions| permissions.manage_messages())
    }
}
