//! User-facing notices.
//!
//! The core only produces well-formed messages; rendering them (toasts,
//! terminal lines, log records) belongs to whoever implements [`Notifier`].

use serde::Serialize;
use tokio::sync::mpsc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Forwards notices over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Returns the notifier and the receiving end for the renderer.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("Notice dropped: renderer is gone");
        }
    }
}

/// Emits every notice as a tracing event at a matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        let message = notice.message.as_str();
        match notice.level {
            NoticeLevel::Info => tracing::info!(notice = "info", "{}", message),
            NoticeLevel::Success => tracing::info!(notice = "success", "{}", message),
            NoticeLevel::Warning => tracing::warn!(notice = "warning", "{}", message),
            NoticeLevel::Error => tracing::error!(notice = "error", "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_notifier_levels() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            LogNotifier.notify(Notice::warning("Please switch to Sepolia testnet"));
            LogNotifier.notify(Notice::error("Transfer failed: Transaction reverted"));
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("WARN"));
        assert!(lines[0].contains("Please switch to Sepolia testnet"));
        assert!(lines[0].contains("notice=\"warning\""));
        assert!(lines[1].contains("ERROR"));
        assert!(lines[1].contains("Transaction reverted"));
    }

    #[test]
    fn test_channel_delivery_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notice::info("first"));
        notifier.notify(Notice::error("second"));

        assert_eq!(rx.try_recv().unwrap(), Notice::info("first"));
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Error);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_does_not_panic() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notice::success("ignored"));
    }

    #[test]
    fn test_serializes_lowercase_level() {
        let json = serde_json::to_string(&Notice::warning("switch")).unwrap();
        assert_eq!(json, r#"{"level":"warning","message":"switch"}"#);
    }
}
