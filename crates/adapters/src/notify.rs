// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stakeholder notifications.
//!
//! Mail transport is external: [`OutboxNotifyAdapter`] drops one JSON file
//! per message into a directory a mailer drains, and
//! [`DesktopNotifyAdapter`] pops a desktop notice on the build machine.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("outbox write failed: {0}")]
    Outbox(#[from] std::io::Error),
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Failed,
    Succeeded,
    Killed,
    Cis,
}

forge_core::simple_display! {
    NotificationKind {
        Failed => "failed",
        Succeeded => "succeeded",
        Killed => "killed",
        Cis => "cis",
    }
}

/// A single outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, recipients: &[String], subject: &str, body: &str) -> Self {
        Self {
            kind,
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }
}

/// Adapter for sending notifications
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;

    async fn send_failed(&self, recipients: &[String], subject: &str, body: &str) -> Result<(), NotifyError> {
        self.send(Notification::new(NotificationKind::Failed, recipients, subject, body)).await
    }

    async fn send_succeeded(&self, recipients: &[String], subject: &str, body: &str) -> Result<(), NotifyError> {
        self.send(Notification::new(NotificationKind::Succeeded, recipients, subject, body)).await
    }

    async fn send_killed(&self, recipients: &[String], subject: &str, body: &str) -> Result<(), NotifyError> {
        self.send(Notification::new(NotificationKind::Killed, recipients, subject, body)).await
    }

    async fn send_cis(&self, recipients: &[String], subject: &str, body: &str) -> Result<(), NotifyError> {
        self.send(Notification::new(NotificationKind::Cis, recipients, subject, body)).await
    }
}

/// Writes each notification as `<outbox>/<epoch_ms>-<uuid>.json`.
#[derive(Clone, Debug)]
pub struct OutboxNotifyAdapter {
    dir: PathBuf,
}

impl OutboxNotifyAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl NotifyAdapter for OutboxNotifyAdapter {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = format!(
            "{}-{}.json",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple()
        );
        let path = self.dir.join(name);
        let body = serde_json::to_vec_pretty(&notification)?;
        // Write under a temp name so the mailer never sees a partial file.
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::info!(
            kind = %notification.kind,
            subject = %notification.subject,
            recipients = notification.recipients.len(),
            path = %path.display(),
            "queued notification"
        );
        Ok(())
    }
}

/// Desktop notification adapter using notify-rust.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifyAdapter;

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        let title = notification.subject;
        // Desktop notices only have room for the headline.
        let message: String = notification.body.lines().take(4).collect::<Vec<_>>().join("\n");
        // notify_rust::Notification::show() blocks; keep it off the agent loop.
        tokio::task::spawn_blocking(move || {
            match notify_rust::Notification::new().summary(&title).body(&message).show() {
                Ok(_) => tracing::info!(%title, "desktop notification sent"),
                Err(e) => tracing::warn!(%title, error = %e, "desktop notification failed"),
            }
        });
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Notification, NotificationKind, NotifyAdapter, NotifyError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeNotifyState {
        sent: Vec<Notification>,
        fail_next: Option<String>,
    }

    /// Fake notification adapter for testing
    #[derive(Clone, Default)]
    pub struct FakeNotifyAdapter {
        inner: Arc<Mutex<FakeNotifyState>>,
    }

    impl FakeNotifyAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every notification accepted so far
        pub fn sent(&self) -> Vec<Notification> {
            self.inner.lock().sent.clone()
        }

        pub fn sent_of(&self, kind: NotificationKind) -> Vec<Notification> {
            self.inner.lock().sent.iter().filter(|n| n.kind == kind).cloned().collect()
        }

        /// Make the next send fail with the given message
        pub fn fail_next(&self, message: &str) {
            self.inner.lock().fail_next = Some(message.to_string());
        }
    }

    #[async_trait]
    impl NotifyAdapter for FakeNotifyAdapter {
        async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
            let mut inner = self.inner.lock();
            if let Some(message) = inner.fail_next.take() {
                return Err(NotifyError::SendFailed(message));
            }
            inner.sent.push(notification);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
