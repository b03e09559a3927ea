pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::assets::AssetRef;

/// Who sent an event. Only used in log lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub first_name: String,
    pub last_name: Option<String>,
}

impl Sender {
    pub fn new(first_name: impl Into<String>, last_name: Option<&str>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.map(str::to_string),
        }
    }

    pub fn last_name_or_empty(&self) -> &str {
        self.last_name.as_deref().unwrap_or("")
    }
}

/// Received media, kept as its printable descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef(pub String);

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `name` is lowercased and stripped of `/` and `@botname`; `text` is the raw message.
    Command { name: String, text: String },
    Text(String),
    Sticker(MediaRef),
    Animation(MediaRef),
    Audio(MediaRef),
    Voice(MediaRef),
}

/// A single incoming update, decoded once at the platform boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender: Sender,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn new(sender: Sender, kind: EventKind) -> Self {
        Self { sender, kind }
    }

    /// The message text, if the event carries any
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Command { text, .. } => Some(text),
            EventKind::Text(body) => Some(body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub choices: Vec<String>,
    /// Hide the keyboard after the user picks once
    pub one_shot: bool,
}

/// A single reply requested of the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundReply {
    Text {
        body: String,
        keyboard: Option<ReplyKeyboard>,
    },
    Sticker(AssetRef),
    Animation(AssetRef),
    Voice(AssetRef),
}

impl OutboundReply {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundReply::Text {
            body: body.into(),
            keyboard: None,
        }
    }
}

/// Delivers replies back to the chat an event came from
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, reply: &OutboundReply) -> Result<()>;
}
