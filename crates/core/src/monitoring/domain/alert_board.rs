use crate::monitoring::domain::visibility_rules::Alert;

/// Message shown while the board holds no evaluation yet.
pub const INITIALIZING_MESSAGE: &str = "initializing";

/// Message shown when a cycle evaluated the rules and none fired.
pub const ALL_CLEAR_MESSAGE: &str = "monitoring OK";

/// The one piece of persisted application state: the current alert list.
///
/// Owned by the monitor loop; the rendering layer only reads it. Every
/// evaluated cycle replaces the list wholesale. Cycles without a detected
/// pose leave it untouched. The list is never empty: it holds violation
/// messages, or exactly one all-clear message, or the initializing message
/// before the first evaluation.
#[derive(Clone, Debug)]
pub struct AlertBoard {
    messages: Vec<String>,
}

impl Default for AlertBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertBoard {
    pub fn new() -> Self {
        Self {
            messages: vec![INITIALIZING_MESSAGE.to_string()],
        }
    }

    /// Replace the board with this cycle's evaluation result.
    ///
    /// Returns `true` when the visible messages changed, so callers can
    /// log transitions instead of every cycle.
    pub fn publish(&mut self, alerts: &[Alert]) -> bool {
        let new_messages: Vec<String> = if alerts.is_empty() {
            vec![ALL_CLEAR_MESSAGE.to_string()]
        } else {
            alerts.iter().map(|a| a.message().to_string()).collect()
        };
        let changed = new_messages != self.messages;
        self.messages = new_messages;
        changed
    }

    /// Current messages, one per violated rule. Never empty.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_all_clear(&self) -> bool {
        self.messages.len() == 1 && self.messages[0] == ALL_CLEAR_MESSAGE
    }
}
