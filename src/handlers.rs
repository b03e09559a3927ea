use tracing::info;

use crate::activity::ActivityLog;
use crate::assets::Assets;
use crate::platform::{EventKind, InboundEvent, OutboundReply, ReplyKeyboard};

pub const WELCOME_TEXT: &str = "Welcome to Beehive bot!\n\n\
     Commands: /start /help and then try to find easter eggs!";

pub const GENDER_PROMPT: &str = "Hi! My name is BeehiveBot. I will hold a conversation with you. \
     Send /cancel to stop talking to me.\n\n\
     Are you a boy or a girl?";

/// Keyboard offered after /start; also the exact texts routed to the gender handler.
pub const GENDER_CHOICES: [&str; 3] = ["Boy", "Girl", "Other"];

/// Compared against the lowercased message
const UH_SKA_KEYWORDS: [&str; 3] = ["uh", "uh ska", "ууска"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Sticker,
    Animation,
    Audio,
    Voice,
}

impl MediaKind {
    pub fn name(&self) -> &'static str {
        match self {
            MediaKind::Sticker => "sticker",
            MediaKind::Animation => "animation",
            MediaKind::Audio => "audio",
            MediaKind::Voice => "voice",
        }
    }

    pub fn acknowledgment(&self) -> &'static str {
        match self {
            MediaKind::Sticker => "Nice sticker!",
            MediaKind::Animation => "Nice animation!",
            MediaKind::Audio => "Nice audio!",
            MediaKind::Voice => "Nice voice!",
        }
    }
}

/// Handler selected for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Welcome,
    Help,
    Gender,
    Text,
    MediaAck(MediaKind),
}

/// Pick the handler for an event, first match wins. `None` means the event is dropped.
pub fn route(event: &InboundEvent, test_mode: bool) -> Option<Route> {
    match &event.kind {
        EventKind::Command { name, .. } if name == "start" => Some(Route::Welcome),
        EventKind::Command { name, .. } if name == "help" => Some(Route::Help),
        // Unknown commands are plain text
        EventKind::Command { .. } => Some(Route::Text),
        EventKind::Text(body) if GENDER_CHOICES.contains(&body.as_str()) => Some(Route::Gender),
        EventKind::Text(_) => Some(Route::Text),
        EventKind::Sticker(_) if test_mode => Some(Route::MediaAck(MediaKind::Sticker)),
        EventKind::Animation(_) if test_mode => Some(Route::MediaAck(MediaKind::Animation)),
        EventKind::Audio(_) if test_mode => Some(Route::MediaAck(MediaKind::Audio)),
        EventKind::Voice(_) if test_mode => Some(Route::MediaAck(MediaKind::Voice)),
        EventKind::Sticker(_)
        | EventKind::Animation(_)
        | EventKind::Audio(_)
        | EventKind::Voice(_) => None,
    }
}

impl Route {
    pub fn handle(
        self,
        event: &InboundEvent,
        assets: &Assets,
        activity: &ActivityLog,
    ) -> Vec<OutboundReply> {
        match self {
            Route::Welcome => welcome(event, activity),
            Route::Help => help(event, assets, activity),
            Route::Gender => gender(event, assets, activity),
            Route::Text => text(event, assets, activity),
            Route::MediaAck(kind) => media_ack(kind, event),
        }
    }
}

pub fn welcome(event: &InboundEvent, activity: &ActivityLog) -> Vec<OutboundReply> {
    activity.track(event, "/start");

    vec![
        OutboundReply::text(WELCOME_TEXT),
        OutboundReply::Text {
            body: GENDER_PROMPT.to_string(),
            keyboard: Some(ReplyKeyboard {
                choices: GENDER_CHOICES.iter().map(|c| c.to_string()).collect(),
                one_shot: true,
            }),
        },
    ]
}

pub fn help(event: &InboundEvent, assets: &Assets, activity: &ActivityLog) -> Vec<OutboundReply> {
    activity.track(event, "/help");

    vec![OutboundReply::Voice(assets.voices.ne_lez_ska.clone())]
}

pub fn gender(event: &InboundEvent, assets: &Assets, activity: &ActivityLog) -> Vec<OutboundReply> {
    activity.track(event, "GENDER");

    let body = event.text().unwrap_or_default();
    info!("Gender of {}: {}", event.sender.first_name, body);

    match body {
        "Other" => vec![OutboundReply::Sticker(assets.stickers.mcconaughey.clone())],
        "Boy" => vec![OutboundReply::Animation(
            assets.animations.dicaprio_congrats.clone(),
        )],
        "Girl" => vec![OutboundReply::Animation(
            assets.animations.bouncing_head_yes.clone(),
        )],
        // Not reachable through `route`
        _ => Vec::new(),
    }
}

pub fn text(event: &InboundEvent, assets: &Assets, activity: &ActivityLog) -> Vec<OutboundReply> {
    activity.track(event, "TEXT");

    let Some(body) = event.text() else {
        return Vec::new();
    };

    if UH_SKA_KEYWORDS.contains(&body.to_lowercase().as_str()) {
        vec![
            OutboundReply::Sticker(assets.stickers.uh_ska.clone()),
            OutboundReply::Voice(assets.voices.uh_ska.clone()),
        ]
    } else {
        vec![OutboundReply::text(body)]
    }
}

pub fn media_ack(kind: MediaKind, event: &InboundEvent) -> Vec<OutboundReply> {
    match &event.kind {
        EventKind::Sticker(media)
        | EventKind::Animation(media)
        | EventKind::Audio(media)
        | EventKind::Voice(media) => {
            info!("Received {}: {}", kind.name(), media);
        }
        _ => {}
    }

    vec![OutboundReply::text(kind.acknowledgment())]
}
