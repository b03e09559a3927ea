use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, Me, MessageEntity, MessageEntityKind};
use tracing::{debug, info, warn};

use crate::bot::{self, AppState};
use crate::platform::{
    EventKind, InboundEvent, MediaRef, OutboundReply, ReplyKeyboard, ReplySink, Sender,
};

/// Text of the `bot_command` entity opening the message, e.g. `/start@BeehiveBot`.
///
/// Telegram ends the entity at the first character outside `[A-Za-z0-9_@]`,
/// so `/help!` carries a `/help` entity. Offsets are in UTF-16 code units.
fn leading_command<'a>(text: &'a str, entities: &[MessageEntity]) -> Option<&'a str> {
    let entity = entities
        .iter()
        .find(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))?;

    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        if units == entity.length {
            return Some(&text[..idx]);
        }
        units += ch.len_utf16();
    }
    (units == entity.length).then_some(text)
}

/// Command word, lowercased, when `command` is addressed to this bot.
///
/// `/start`, `/START` and `/start@ThisBot` all give `start`; a command
/// addressed to another bot (`/start@OtherBot`) is not ours and gives `None`.
fn parse_command(command: &str, bot_username: Option<&str>) -> Option<String> {
    let word = command.strip_prefix('/')?;

    let (name, addressee) = match word.split_once('@') {
        Some((name, addressee)) => (name, Some(addressee)),
        None => (word, None),
    };

    if name.is_empty() {
        return None;
    }

    if let Some(addressee) = addressee {
        match bot_username {
            Some(username) if username.eq_ignore_ascii_case(addressee) => {}
            _ => return None,
        }
    }

    Some(name.to_lowercase())
}

fn classify_text(text: &str, entities: &[MessageEntity], bot_username: Option<&str>) -> EventKind {
    match leading_command(text, entities).and_then(|c| parse_command(c, bot_username)) {
        Some(name) => EventKind::Command {
            name,
            text: text.to_string(),
        },
        None => EventKind::Text(text.to_string()),
    }
}

/// Turn a Telegram message into an event. `None` for message kinds the bot never handles.
fn decode(msg: &Message, bot_username: Option<&str>) -> Option<InboundEvent> {
    let sender = msg
        .from
        .as_ref()
        .map(|user| Sender::new(user.first_name.clone(), user.last_name.as_deref()))
        .unwrap_or_default();

    let kind = if let Some(text) = msg.text() {
        classify_text(text, msg.entities().unwrap_or_default(), bot_username)
    } else if let Some(sticker) = msg.sticker() {
        EventKind::Sticker(MediaRef(format!("{:?}", sticker)))
    } else if let Some(animation) = msg.animation() {
        EventKind::Animation(MediaRef(format!("{:?}", animation)))
    } else if let Some(audio) = msg.audio() {
        EventKind::Audio(MediaRef(format!("{:?}", audio)))
    } else if let Some(voice) = msg.voice() {
        EventKind::Voice(MediaRef(format!("{:?}", voice)))
    } else {
        return None;
    };

    Some(InboundEvent::new(sender, kind))
}

fn keyboard_markup(keyboard: &ReplyKeyboard) -> KeyboardMarkup {
    let row: Vec<KeyboardButton> = keyboard
        .choices
        .iter()
        .map(|choice| KeyboardButton::new(choice.clone()))
        .collect();

    let markup = KeyboardMarkup::new(vec![row]);
    if keyboard.one_shot {
        markup.one_time_keyboard()
    } else {
        markup
    }
}

/// Sends replies into the chat a message came from
pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSink {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ReplySink for TelegramSink {
    async fn send(&self, reply: &OutboundReply) -> Result<()> {
        match reply {
            OutboundReply::Text { body, keyboard } => {
                let request = self.bot.send_message(self.chat_id, body.clone());
                let sent = match keyboard {
                    Some(keyboard) => request.reply_markup(keyboard_markup(keyboard)).await,
                    None => request.await,
                };
                sent.context("Failed to send text")?;
            }
            OutboundReply::Sticker(asset) => {
                self.bot
                    .send_sticker(self.chat_id, asset.to_input_file()?)
                    .await
                    .context("Failed to send sticker")?;
            }
            OutboundReply::Animation(asset) => {
                self.bot
                    .send_animation(self.chat_id, asset.to_input_file()?)
                    .await
                    .context("Failed to send animation")?;
            }
            OutboundReply::Voice(asset) => {
                self.bot
                    .send_voice(self.chat_id, asset.to_input_file()?)
                    .await
                    .context("Failed to send voice")?;
            }
        }
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => warn!("Failed to listen for SIGTERM: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run the Telegram bot until Ctrl-C or SIGTERM
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let bot = Bot::new(state.config.token());

    info!("Starting Telegram platform...");
    if state.config.test_mode() {
        info!("Test mode: acknowledging stickers, animations, audio and voice");
    }

    let handler = Update::filter_message().endpoint(handle_message);

    // handle_message always returns Ok; bot::process_event logs delivery errors
    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.id);
        })
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping dispatcher...");
        match shutdown.shutdown() {
            Ok(done) => done.await,
            Err(e) => warn!("Dispatcher was not running: {}", e),
        }
    });

    dispatcher.dispatch().await;

    info!("Telegram platform stopped");
    Ok(())
}

async fn handle_message(
    bot: Bot,
    me: Me,
    msg: Message,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(event) = decode(&msg, me.user.username.as_deref()) else {
        return Ok(());
    };

    let sink = TelegramSink::new(bot, msg.chat.id);
    bot::process_event(&state, &event, &sink).await;

    Ok(())
}
