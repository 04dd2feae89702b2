//! Progress event channel.
//!
//! A single-producer, ordered, best-effort stream from the publisher
//! to the calling context. Events serialize as `{"type": …, "data":
//! …}`; the channel closes only after [`ProgressEvent::Complete`] has
//! been emitted.

use serde::Serialize;
use tokio::sync::mpsc;
use volare_core::types::DbId;

/// Default bounded capacity of the progress channel.
///
/// The producer never blocks on a slow consumer beyond this buffer;
/// a disconnected consumer stops emission without rolling back work.
pub const DEFAULT_CAPACITY: usize = 64;

/// One typed progress notification.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A unit of create work started. `variant` is absent for
    /// package-level steps.
    Creating {
        package_id: DbId,
        #[serde(skip_serializing_if = "Option::is_none")]
        variant: Option<i16>,
        message: String,
    },

    /// Terminal success for one created ad.
    Created {
        package_id: DbId,
        variant: i16,
        ad_id: DbId,
        platform_ad_id: String,
        platform_creative_id: String,
    },

    /// A unit of update work started.
    Updating {
        package_id: DbId,
        #[serde(skip_serializing_if = "Option::is_none")]
        variant: Option<i16>,
        message: String,
    },

    /// Terminal success for one refreshed ad.
    Updated {
        package_id: DbId,
        variant: i16,
        ad_id: DbId,
        platform_creative_id: String,
    },

    /// Terminal failure for one unit of work. Never aborts the channel.
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        package_id: Option<DbId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        variant: Option<i16>,
        message: String,
    },

    /// Terminal for the whole request, with aggregate counts.
    Complete {
        created: u32,
        updated: u32,
        failed: u32,
    },
}

/// Producer half of the progress channel.
///
/// Sends are best-effort: once the consumer hangs up, further events
/// are dropped silently and the run continues to completion.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ProgressSender {
    /// Create a channel with the given buffer capacity.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Emit one event, waiting for buffer space if the consumer is slow.
    pub async fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("Progress consumer disconnected; dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_as_type_data_pairs() {
        let event = ProgressEvent::Created {
            package_id: 7,
            variant: 2,
            ad_id: 31,
            platform_ad_id: "120330".into(),
            platform_creative_id: "98321".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "created");
        assert_eq!(json["data"]["package_id"], 7);
        assert_eq!(json["data"]["variant"], 2);
    }

    #[test]
    fn package_level_events_omit_variant() {
        let event = ProgressEvent::Creating {
            package_id: 7,
            variant: None,
            message: "Reconciling creatives".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "creating");
        assert!(json["data"].get("variant").is_none());
    }

    #[tokio::test]
    async fn emit_survives_disconnected_consumer() {
        let (sender, rx) = ProgressSender::channel(1);
        drop(rx);
        // Must not panic or hang.
        sender
            .emit(ProgressEvent::Complete {
                created: 0,
                updated: 0,
                failed: 0,
            })
            .await;
    }
}
