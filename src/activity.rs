use tracing::info;

use crate::platform::InboundEvent;

/// Records selected user actions when tracking is enabled in config
#[derive(Debug, Clone, Copy)]
pub struct ActivityLog {
    enabled: bool,
}

impl ActivityLog {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn track(&self, event: &InboundEvent, action: &str) {
        if !self.enabled {
            return;
        }

        info!(
            "Action {}\n\tText: {}\n\tFrom: {} {}",
            action,
            event.text().unwrap_or_default(),
            event.sender.first_name,
            event.sender.last_name_or_empty()
        );
    }
}
