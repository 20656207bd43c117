//! Event Router - dispatches a deduplicated Slack event to thought
//! capture, command handling or the Approval Resolver.

use tracing::{debug, info, warn};

use crate::common::PipelineResult;
use crate::domains::posts::actions::resolve;
use crate::domains::slack::commands::{execute, Command};
use crate::domains::slack::events::{InboundEvent, MentionEvent, MessageEvent, ReactionEvent};
use crate::domains::thoughts::actions::{capture_thought, chat_fallback};
use crate::domains::thoughts::models::ThoughtSource;
use crate::kernel::ServerDeps;

pub async fn dispatch(deps: &ServerDeps, event: InboundEvent) -> PipelineResult<()> {
    match event {
        InboundEvent::Message(message) => handle_message(deps, message).await,
        InboundEvent::Mention(mention) => handle_mention(deps, mention).await,
        InboundEvent::Reaction(reaction) => handle_reaction(deps, reaction).await,
        InboundEvent::UrlVerification { .. } => {
            // Answered synchronously by the webhook
            Ok(())
        }
        InboundEvent::Unsupported { kind } => {
            debug!(kind = %kind, "Unsupported event type");
            Ok(())
        }
    }
}

async fn handle_message(deps: &ServerDeps, message: MessageEvent) -> PipelineResult<()> {
    if message.is_from_bot() || message.text.trim().is_empty() || message.is_thread_reply() {
        debug!(channel = %message.channel, ts = %message.ts, "Ignoring message");
        return Ok(());
    }

    info!(channel = %message.channel, user = ?message.user, "Received message");

    let thought = capture_thought(deps, message.text.trim(), ThoughtSource::Slack, chat_fallback()).await?;

    let confirmation = format!(
        "💭 Got it! Categorized as: *{}* | Tags: {}",
        thought.category,
        thought.topic_tags.join(", ")
    );
    if let Err(e) = deps
        .upstream("send confirmation", deps.chat.send_message(&message.channel, &confirmation))
        .await
    {
        warn!(thought_id = %thought.id, error = %e, "Failed to send confirmation");
    }
    Ok(())
}

async fn handle_mention(deps: &ServerDeps, mention: MentionEvent) -> PipelineResult<()> {
    info!(channel = %mention.channel, user = ?mention.user, "Bot mentioned");
    execute(deps, &mention.channel, Command::parse(&mention.text)).await
}

async fn handle_reaction(deps: &ServerDeps, reaction: ReactionEvent) -> PipelineResult<()> {
    info!(reaction = %reaction.reaction, message_id = %reaction.item.ts, "Reaction added");

    let resolution = resolve(deps, &reaction.item.ts, &reaction.reaction).await;

    if let Some(text) = resolution.confirmation() {
        deps.upstream(
            "send reaction confirmation",
            deps.chat.send_message(&reaction.item.channel, &text),
        )
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestDependencies;

    fn message(text: &str) -> MessageEvent {
        MessageEvent {
            channel: "C1".into(),
            user: Some("U1".into()),
            text: text.into(),
            ts: "1.0".into(),
            thread_ts: None,
            bot_id: None,
            subtype: None,
        }
    }

    #[tokio::test]
    async fn message_becomes_thought_with_confirmation() {
        let test = TestDependencies::new();
        dispatch(&test.server_deps(), InboundEvent::Message(message("Shipped v2")))
            .await
            .unwrap();

        assert_eq!(test.thoughts.all().len(), 1);
        let sent = test.chat.last_message().unwrap();
        assert_eq!(sent.text, "💭 Got it! Categorized as: *technical* | Tags: rust");
    }

    #[tokio::test]
    async fn bot_empty_and_threaded_messages_are_ignored() {
        let test = TestDependencies::new();
        let deps = test.server_deps();

        let mut from_bot = message("hello");
        from_bot.bot_id = Some("B1".into());
        let mut threaded = message("reply");
        threaded.thread_ts = Some("0.5".into());

        for event in [from_bot, message("   "), threaded] {
            dispatch(&deps, InboundEvent::Message(event)).await.unwrap();
        }

        assert!(test.thoughts.all().is_empty());
        assert!(test.chat.messages().is_empty());
    }

    #[tokio::test]
    async fn reaction_on_untracked_message_is_silent() {
        let test = TestDependencies::new();
        let reaction = ReactionEvent {
            user: Some("U1".into()),
            reaction: "white_check_mark".into(),
            item: crate::domains::slack::events::ReactionItem {
                channel: "C1".into(),
                ts: "9.9".into(),
            },
        };

        dispatch(&test.server_deps(), InboundEvent::Reaction(reaction))
            .await
            .unwrap();

        assert!(test.chat.messages().is_empty());
    }
}
