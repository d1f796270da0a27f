use std::fmt::Debug;

/// Transport-agnostic notification hook.
///
/// The engine publishes order lifecycle messages through this; delivery
/// (Telegram, Slack, ...) lives outside the core.
pub trait Notifier: Send + Sync + Debug {
    fn notify(&self, text: &str);
}

/// Discards every message; the default in silent modes.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _text: &str) {}
}

/// Collects messages in memory; handy in tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: parking_lot::Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, text: &str) {
        self.messages.lock().push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_records() {
        let notifier = MemoryNotifier::default();
        notifier.notify("SUBMITTED order at 100");
        notifier.notify("EXECUTED order at 100");
        assert_eq!(notifier.messages().len(), 2);
        assert!(notifier.messages()[0].starts_with("SUBMITTED"));
    }
}
