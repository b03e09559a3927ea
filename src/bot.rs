use std::fmt::Debug;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::activity::ActivityLog;
use crate::config::Config;
use crate::handlers;
use crate::platform::{InboundEvent, OutboundReply, ReplySink};

/// Shared application state, read-only after startup
pub struct AppState {
    pub config: Config,
    activity: ActivityLog,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let activity = ActivityLog::new(config.enable_tracking());
        Self { config, activity }
    }

    /// Replies for an event, in send order. Empty when nothing handles it.
    pub fn replies_for(&self, event: &InboundEvent) -> Vec<OutboundReply> {
        match handlers::route(event, self.config.test_mode()) {
            Some(route) => route.handle(event, &self.config.assets, &self.activity),
            None => {
                debug!("No handler for {:?}", event.kind);
                Vec::new()
            }
        }
    }
}

/// Handle one event end to end. Delivery stops at the first failure, which is
/// logged and otherwise dropped.
pub async fn process_event(state: &AppState, event: &InboundEvent, sink: &dyn ReplySink) {
    let replies = state.replies_for(event);

    if let Err(e) = deliver(&replies, sink).await {
        report_error(event, &e);
    }
}

async fn deliver(replies: &[OutboundReply], sink: &dyn ReplySink) -> Result<()> {
    for (i, reply) in replies.iter().enumerate() {
        sink.send(reply)
            .await
            .with_context(|| format!("reply {} of {} not delivered", i + 1, replies.len()))?;
    }
    Ok(())
}

pub fn report_error(update: &impl Debug, error: &anyhow::Error) {
    warn!("Update \"{:?}\" caused error \"{:#}\"", update, error);
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::assets::test_assets;
    use crate::config::{GeneralConfig, TelegramConfig};
    use crate::handlers::{GENDER_PROMPT, WELCOME_TEXT};
    use crate::logging::capture::SharedLogBuffer;
    use crate::platform::{EventKind, MediaRef, ReplyKeyboard, Sender};

    /// Records replies; fails every send once `fail_from` replies went through.
    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<OutboundReply>>,
        fail_from: Option<usize>,
    }

    impl RecordingSink {
        fn failing_after(n: usize) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_from: Some(n),
            }
        }

        fn take(&self) -> Vec<OutboundReply> {
            std::mem::take(&mut *self.sent.lock().unwrap())
        }
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn send(&self, reply: &OutboundReply) -> Result<()> {
            let mut sent = self.sent.lock().unwrap();
            if self.fail_from.is_some_and(|n| sent.len() >= n) {
                anyhow::bail!("Bad Request: chat not found");
            }
            sent.push(reply.clone());
            Ok(())
        }
    }

    fn state(test_mode: bool) -> AppState {
        AppState::new(Config {
            telegram: TelegramConfig {
                bot_token: "123:abc".to_string(),
            },
            general: GeneralConfig {
                test_mode,
                ..GeneralConfig::default()
            },
            assets: test_assets(),
        })
    }

    fn event(kind: EventKind) -> InboundEvent {
        InboundEvent::new(Sender::new("Ada", Some("Lovelace")), kind)
    }

    fn text(body: &str) -> InboundEvent {
        event(EventKind::Text(body.to_string()))
    }

    #[tokio::test]
    async fn test_uh_ska_scenario() {
        let state = state(false);
        let sink = RecordingSink::default();
        let assets = test_assets();

        process_event(&state, &text("UH SKA"), &sink).await;

        assert_eq!(
            sink.take(),
            vec![
                OutboundReply::Sticker(assets.stickers.uh_ska),
                OutboundReply::Voice(assets.voices.uh_ska),
            ]
        );
    }

    #[tokio::test]
    async fn test_echo_scenario() {
        let state = state(false);
        let sink = RecordingSink::default();

        process_event(&state, &text("hello"), &sink).await;

        assert_eq!(sink.take(), vec![OutboundReply::text("hello")]);
    }

    #[tokio::test]
    async fn test_start_scenario() {
        let state = state(false);
        let sink = RecordingSink::default();
        let start = event(EventKind::Command {
            name: "start".to_string(),
            text: "/start".to_string(),
        });

        process_event(&state, &start, &sink).await;

        let sent = sink.take();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], OutboundReply::text(WELCOME_TEXT));
        assert_eq!(
            sent[1],
            OutboundReply::Text {
                body: GENDER_PROMPT.to_string(),
                keyboard: Some(ReplyKeyboard {
                    choices: vec!["Boy".into(), "Girl".into(), "Other".into()],
                    one_shot: true,
                }),
            }
        );
    }

    #[tokio::test]
    async fn test_girl_scenario() {
        let state = state(false);
        let sink = RecordingSink::default();

        process_event(&state, &text("Girl"), &sink).await;

        assert_eq!(
            sink.take(),
            vec![OutboundReply::Animation(
                test_assets().animations.bouncing_head_yes
            )]
        );
    }

    #[tokio::test]
    async fn test_media_follows_test_mode() {
        let sticker = event(EventKind::Sticker(MediaRef("Sticker { .. }".to_string())));

        let sink = RecordingSink::default();
        process_event(&state(false), &sticker, &sink).await;
        assert!(sink.take().is_empty());

        process_event(&state(true), &sticker, &sink).await;
        assert_eq!(sink.take(), vec![OutboundReply::text("Nice sticker!")]);
    }

    #[tokio::test]
    async fn test_failed_delivery_logged_and_dropped() {
        let logs = SharedLogBuffer::default();
        let _guard = logs.install();

        let state = state(false);
        let broken = RecordingSink::failing_after(0);

        process_event(&state, &text("hello"), &broken).await;

        assert!(broken.take().is_empty());
        let output = logs.as_string();
        let warnings: Vec<&str> = output.lines().filter(|l| l.contains(" - WARN - ")).collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Update \"InboundEvent"));
        assert!(warnings[0].contains("chat not found"));

        // The next event is still served
        let sink = RecordingSink::default();
        process_event(&state, &text("still here"), &sink).await;
        assert_eq!(sink.take(), vec![OutboundReply::text("still here")]);
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_replies() {
        let logs = SharedLogBuffer::default();
        let _guard = logs.install();

        let state = state(false);
        let sink = RecordingSink::failing_after(1);

        process_event(&state, &text("uh"), &sink).await;

        assert_eq!(
            sink.take(),
            vec![OutboundReply::Sticker(test_assets().stickers.uh_ska)]
        );
        assert!(logs.as_string().contains("reply 2 of 2 not delivered"));
    }
}
