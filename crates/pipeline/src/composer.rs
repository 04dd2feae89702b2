//! Ad composer.
//!
//! Assembles one composite platform creative per (package, variant):
//! the required current 4x5 ledger entry, the optional 9x16 one, and
//! the package's full set of copy variants as rotating options. The
//! platform allocates a fresh creative id on every call; only the
//! display name is deterministic.

use std::sync::Arc;

use volare_core::creative::{AspectRatio, PlatformMedia};
use volare_core::naming;
use volare_db::models::ad_copy::AdCopy;
use volare_db::models::creative::Creative;
use volare_db::models::package::Package;
use volare_meta::{CopyOption, CreativeSpec};

use crate::error::PipelineError;
use crate::ports::AdPlatform;

pub struct AdComposer {
    platform: Arc<dyn AdPlatform>,
}

impl AdComposer {
    pub fn new(platform: Arc<dyn AdPlatform>) -> Self {
        Self { platform }
    }

    /// Materialize a creative for one variant, returning its platform id.
    ///
    /// `creatives` are the package's uploaded ledger entries; a missing
    /// 4x5 identity fails only this variant, never its siblings.
    pub async fn compose(
        &self,
        package: &Package,
        variant: i16,
        creatives: &[Creative],
        copies: &[AdCopy],
    ) -> Result<String, PipelineError> {
        let feed_media = media_for(creatives, variant, AspectRatio::FourByFive)?
            .ok_or(PipelineError::MissingFeedCreative { variant })?;
        // 9x16 is optional: absence degrades to feed-only placements.
        let story_media = media_for(creatives, variant, AspectRatio::NineBySixteen)?;

        let spec = CreativeSpec {
            name: naming::display_name(&package.title, package.external_id, variant),
            feed_media,
            story_media,
            copies: copies
                .iter()
                .map(|c| CopyOption {
                    primary_text: c.primary_text.clone(),
                    headline: c.headline.clone(),
                    description: c.description.clone(),
                })
                .collect(),
            cta_message: naming::cta_message(package.external_id),
            tracking_id: naming::tracking_id(package.external_id, variant),
        };

        let creative_id = self.platform.create_creative(&spec).await?;
        tracing::info!(
            package_id = package.id,
            variant,
            creative_id = %creative_id,
            "Composite creative materialized",
        );
        Ok(creative_id)
    }
}

/// Platform identity of the entry for (variant, ratio), if one exists.
fn media_for(
    creatives: &[Creative],
    variant: i16,
    ratio: AspectRatio,
) -> Result<Option<PlatformMedia>, PipelineError> {
    match creatives
        .iter()
        .find(|c| c.variant == variant && c.aspect_ratio == ratio.as_str())
    {
        Some(entry) => Ok(entry.media()?),
        None => Ok(None),
    }
}
