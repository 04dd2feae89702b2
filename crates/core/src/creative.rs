//! Creative ledger domain types.
//!
//! Aspect ratios, media kinds, the platform-media tagged union, the
//! upload lifecycle state machine, and the staleness predicate that
//! drives reconciliation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// AspectRatio
// ---------------------------------------------------------------------------

/// Placement aspect ratio of an uploaded creative asset.
///
/// `4x5` is the feed layout and is required before a variant can be
/// published; `9x16` is the stories/reels layout and is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "4x5")]
    FourByFive,
    #[serde(rename = "9x16")]
    NineBySixteen,
}

impl AspectRatio {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FourByFive => "4x5",
            Self::NineBySixteen => "9x16",
        }
    }

    /// Parse the database / wire representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "4x5" => Ok(Self::FourByFive),
            "9x16" => Ok(Self::NineBySixteen),
            other => Err(CoreError::Validation(format!(
                "Unknown aspect ratio: '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MediaKind / PlatformMedia
// ---------------------------------------------------------------------------

/// Kind of visual asset stored for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(CoreError::Validation(format!(
                "Unknown media kind: '{other}'"
            ))),
        }
    }
}

/// Platform-side identity of an uploaded asset.
///
/// The advertising platform hands back an image hash for images and a
/// video id for videos. A ledger entry carries exactly one of the two;
/// the tagged union makes that mutual exclusion a compile-time fact
/// instead of a pair of nullable columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlatformMedia {
    Image { hash: String },
    Video { id: String },
}

impl PlatformMedia {
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image { .. } => MediaKind::Image,
            Self::Video { .. } => MediaKind::Video,
        }
    }

    /// Decompose into the `(image_hash, video_id)` column pair.
    pub fn into_columns(self) -> (Option<String>, Option<String>) {
        match self {
            Self::Image { hash } => (Some(hash), None),
            Self::Video { id } => (None, Some(id)),
        }
    }

    /// Recompose from the `(image_hash, video_id)` column pair.
    ///
    /// Returns `None` when both columns are NULL (entry not yet
    /// uploaded) and an error when both are set, which the database
    /// CHECK constraint should have prevented.
    pub fn from_columns(
        image_hash: Option<String>,
        video_id: Option<String>,
    ) -> Result<Option<Self>, CoreError> {
        match (image_hash, video_id) {
            (None, None) => Ok(None),
            (Some(hash), None) => Ok(Some(Self::Image { hash })),
            (None, Some(id)) => Ok(Some(Self::Video { id })),
            (Some(_), Some(_)) => Err(CoreError::Internal(
                "Ledger entry carries both an image hash and a video id".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Upload lifecycle
// ---------------------------------------------------------------------------

/// Upload lifecycle state of a creative ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Uploaded,
    Error,
}

impl UploadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Uploaded => "uploaded",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "uploading" => Ok(Self::Uploading),
            "uploaded" => Ok(Self::Uploaded),
            "error" => Ok(Self::Error),
            other => Err(CoreError::Validation(format!(
                "Unknown upload status: '{other}'"
            ))),
        }
    }

    /// Whether `self -> next` is a legal lifecycle transition.
    ///
    /// Every path into `uploaded` or `error` goes through `uploading`;
    /// both `uploaded` (stale re-upload) and `error` (retry on a later
    /// pass) may re-enter `uploading`.
    pub fn can_transition_to(self, next: UploadStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Uploading)
                | (Self::Uploading, Self::Uploaded)
                | (Self::Uploading, Self::Error)
                | (Self::Uploaded, Self::Uploading)
                | (Self::Error, Self::Uploading)
        )
    }

    /// Validate a transition, returning the new state or a
    /// `CoreError::Validation` describing the rejected move.
    pub fn transition_to(self, next: UploadStatus) -> Result<UploadStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::Validation(format!(
                "Illegal upload status transition: {} -> {}",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Staleness
// ---------------------------------------------------------------------------

/// Whether an asset must be (re-)uploaded.
///
/// An asset needs upload when no ledger entry exists for its
/// (variant, aspect ratio) key, when the entry never recorded a content
/// identity, or when the recorded identity differs from the asset
/// store's current one.
pub fn needs_upload(ledger_content_id: Option<&str>, store_content_id: &str) -> bool {
    match ledger_content_id {
        None => true,
        Some("") => true,
        Some(recorded) => recorded != store_content_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_round_trip() {
        assert_eq!(AspectRatio::parse("4x5").unwrap(), AspectRatio::FourByFive);
        assert_eq!(
            AspectRatio::parse("9x16").unwrap(),
            AspectRatio::NineBySixteen
        );
        assert_eq!(AspectRatio::FourByFive.as_str(), "4x5");
        assert!(AspectRatio::parse("16x9").is_err());
    }

    #[test]
    fn platform_media_columns_round_trip() {
        let image = PlatformMedia::Image {
            hash: "abc123".into(),
        };
        let (hash, video) = image.clone().into_columns();
        assert_eq!(
            PlatformMedia::from_columns(hash, video).unwrap(),
            Some(image)
        );

        let video = PlatformMedia::Video { id: "v9".into() };
        let (hash, id) = video.clone().into_columns();
        assert_eq!(PlatformMedia::from_columns(hash, id).unwrap(), Some(video));
    }

    #[test]
    fn platform_media_both_columns_rejected() {
        let result = PlatformMedia::from_columns(Some("h".into()), Some("v".into()));
        assert!(result.is_err());
    }

    #[test]
    fn platform_media_empty_columns() {
        assert_eq!(PlatformMedia::from_columns(None, None).unwrap(), None);
    }

    #[test]
    fn upload_status_happy_path() {
        assert!(UploadStatus::Pending.can_transition_to(UploadStatus::Uploading));
        assert!(UploadStatus::Uploading.can_transition_to(UploadStatus::Uploaded));
        assert!(UploadStatus::Uploading.can_transition_to(UploadStatus::Error));
    }

    #[test]
    fn upload_status_reupload_paths() {
        // A stale uploaded entry and a failed entry may both re-enter uploading.
        assert!(UploadStatus::Uploaded.can_transition_to(UploadStatus::Uploading));
        assert!(UploadStatus::Error.can_transition_to(UploadStatus::Uploading));
    }

    #[test]
    fn upload_status_rejects_skips() {
        // No transition skips `uploading`.
        assert!(!UploadStatus::Pending.can_transition_to(UploadStatus::Uploaded));
        assert!(!UploadStatus::Pending.can_transition_to(UploadStatus::Error));
        assert!(!UploadStatus::Error.can_transition_to(UploadStatus::Uploaded));
        assert!(!UploadStatus::Uploaded.can_transition_to(UploadStatus::Error));
    }

    #[test]
    fn transition_to_reports_rejected_move() {
        let err = UploadStatus::Error
            .transition_to(UploadStatus::Uploaded)
            .unwrap_err();
        assert!(err.to_string().contains("error -> uploaded"));
    }

    #[test]
    fn staleness_predicate() {
        assert!(needs_upload(None, "f1"));
        assert!(needs_upload(Some(""), "f1"));
        assert!(needs_upload(Some("f0"), "f1"));
        assert!(!needs_upload(Some("f1"), "f1"));
    }
}
