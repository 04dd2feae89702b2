//! Publish-readiness gating.
//!
//! A variant may become an ad only when the ledger holds a current
//! `4x5` entry for it and the package has at least one copy variant.
//! The check is pure so the publisher can report per-variant failures
//! without touching I/O.

use std::collections::BTreeSet;

/// Why a requested variant cannot be published this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockedReason {
    /// No current uploaded 4x5 ledger entry for the variant.
    MissingFeedCreative,
    /// The package has no copy variants at all.
    NoCopy,
}

impl std::fmt::Display for BlockedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFeedCreative => f.write_str("no current 4x5 creative"),
            Self::NoCopy => f.write_str("package has no ad copy"),
        }
    }
}

/// Outcome of a readiness check over a set of requested variants.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Readiness {
    /// Variants that may be published, ascending.
    pub ready: Vec<i16>,
    /// Variants that may not, with the blocking reason.
    pub blocked: Vec<(i16, BlockedReason)>,
}

/// Gate the requested variants.
///
/// `feed_ready_variants` is the set of variants holding a current
/// uploaded 4x5 ledger entry; `copy_count` is the package's number of
/// copy variants. When `requested` is empty, every feed-ready variant
/// is considered requested.
pub fn check(
    requested: &[i16],
    feed_ready_variants: &BTreeSet<i16>,
    copy_count: usize,
) -> Readiness {
    let requested: Vec<i16> = if requested.is_empty() {
        feed_ready_variants.iter().copied().collect()
    } else {
        let mut sorted = requested.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
    };

    let mut readiness = Readiness::default();
    for variant in requested {
        if copy_count == 0 {
            readiness.blocked.push((variant, BlockedReason::NoCopy));
        } else if !feed_ready_variants.contains(&variant) {
            readiness
                .blocked
                .push((variant, BlockedReason::MissingFeedCreative));
        } else {
            readiness.ready.push(variant);
        }
    }
    readiness
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_ready(variants: &[i16]) -> BTreeSet<i16> {
        variants.iter().copied().collect()
    }

    #[test]
    fn ready_when_feed_entry_and_copy_exist() {
        let result = check(&[1, 2], &feed_ready(&[1, 2]), 3);
        assert_eq!(result.ready, vec![1, 2]);
        assert!(result.blocked.is_empty());
    }

    #[test]
    fn blocked_without_feed_creative() {
        let result = check(&[1, 2, 3], &feed_ready(&[1, 2]), 3);
        assert_eq!(result.ready, vec![1, 2]);
        assert_eq!(
            result.blocked,
            vec![(3, BlockedReason::MissingFeedCreative)]
        );
    }

    #[test]
    fn copy_gate_blocks_everything() {
        // A variant with a feed creative but no copy never produces an ad.
        let result = check(&[1], &feed_ready(&[1]), 0);
        assert!(result.ready.is_empty());
        assert_eq!(result.blocked, vec![(1, BlockedReason::NoCopy)]);
    }

    #[test]
    fn empty_request_expands_to_feed_ready() {
        let result = check(&[], &feed_ready(&[2, 4]), 1);
        assert_eq!(result.ready, vec![2, 4]);
    }

    #[test]
    fn duplicate_requests_are_collapsed() {
        let result = check(&[2, 2, 1], &feed_ready(&[1, 2]), 1);
        assert_eq!(result.ready, vec![1, 2]);
    }
}
