// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The notification backend picked by `[notify] kind`.

use async_trait::async_trait;
use forge_adapters::{DesktopNotifyAdapter, Notification, NotifyAdapter, NotifyError, OutboxNotifyAdapter};

use crate::config::{Config, NotifyKind, StatePaths};

#[derive(Debug, Clone)]
pub enum Notifier {
    Outbox(OutboxNotifyAdapter),
    Desktop(DesktopNotifyAdapter),
}

impl Notifier {
    pub fn from_config(config: &Config, paths: &StatePaths) -> Self {
        match config.notify.kind {
            NotifyKind::Outbox => Notifier::Outbox(OutboxNotifyAdapter::new(config.outbox_dir(paths))),
            NotifyKind::Desktop => Notifier::Desktop(DesktopNotifyAdapter::new()),
        }
    }
}

#[async_trait]
impl NotifyAdapter for Notifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        match self {
            Notifier::Outbox(outbox) => outbox.send(notification).await,
            Notifier::Desktop(desktop) => desktop.send(notification).await,
        }
    }
}
