//! REST client for the Meta Marketing (Graph) API.
//!
//! One client per ad account. Uploads are pull-based: the platform
//! fetches the asset from a URL we hand it, so no media bytes flow
//! through this backend.

use serde::Deserialize;
use std::collections::HashMap;
use volare_core::creative::PlatformMedia;

/// Label used for the 4x5 feed asset inside the asset feed spec.
const FEED_LABEL: &str = "feed";
/// Label used for the 9x16 stories asset.
const STORY_LABEL: &str = "story";

/// Everything needed to materialize one composite creative.
///
/// A single creative carries the required 4x5 media, the optional 9x16
/// media, and the package's full set of copy variants as rotating
/// options — never one creative per copy.
#[derive(Debug, Clone)]
pub struct CreativeSpec {
    /// Deterministic display name (`{title} - {external_id} - V{variant}`).
    pub name: String,
    /// Required feed (4x5) asset.
    pub feed_media: PlatformMedia,
    /// Optional stories (9x16) asset; absent degrades to feed-only
    /// placements.
    pub story_media: Option<PlatformMedia>,
    /// Rotating copy options, at most five.
    pub copies: Vec<CopyOption>,
    /// Tracked call-to-action message embedding the catalog id.
    pub cta_message: String,
    /// Tracking id attached to the creative for attribution.
    pub tracking_id: String,
}

/// One textual variation embedded in the creative.
#[derive(Debug, Clone)]
pub struct CopyOption {
    pub primary_text: String,
    pub headline: String,
    pub description: Option<String>,
}

/// Errors from the Marketing API layer.
#[derive(Debug, thiserror::Error)]
pub enum MetaApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform returned a non-2xx status code.
    #[error("Marketing API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response did not carry the expected payload.
    #[error("Unexpected Marketing API response: {0}")]
    Decode(String),
}

/// HTTP client for one ad account.
pub struct MetaAdsApi {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
    ad_account_id: String,
    page_id: String,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ImageUploadResponse {
    images: HashMap<String, ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct AdSetResponse {
    campaign_id: String,
}

impl MetaAdsApi {
    /// Create a client for one ad account.
    ///
    /// * `api_url` - Graph API base, e.g. `https://graph.facebook.com/v19.0`.
    /// * `ad_account_id` - numeric account id, without the `act_` prefix.
    /// * `page_id` - page the creatives are published under.
    pub fn new(
        api_url: String,
        access_token: String,
        ad_account_id: String,
        page_id: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            access_token,
            ad_account_id,
            page_id,
        }
    }

    /// Upload an image by URL, returning the platform image hash.
    pub async fn upload_image(&self, name: &str, source_url: &str) -> Result<String, MetaApiError> {
        let body = serde_json::json!({
            "name": name,
            "url": source_url,
        });
        let response: ImageUploadResponse = self
            .post_json(&format!("act_{}/adimages", self.ad_account_id), &body)
            .await?;

        response
            .images
            .into_values()
            .next()
            .map(|entry| entry.hash)
            .ok_or_else(|| MetaApiError::Decode("adimages response carried no image".into()))
    }

    /// Upload a video by URL, returning the platform video id.
    pub async fn upload_video(&self, name: &str, file_url: &str) -> Result<String, MetaApiError> {
        let body = serde_json::json!({
            "name": name,
            "file_url": file_url,
        });
        let response: IdResponse = self
            .post_json(&format!("act_{}/advideos", self.ad_account_id), &body)
            .await?;
        Ok(response.id)
    }

    /// Create one composite creative, returning the platform creative id.
    ///
    /// The platform allocates a fresh creative id on every call; the
    /// deterministic name is for traceability, not deduplication.
    pub async fn create_creative(&self, spec: &CreativeSpec) -> Result<String, MetaApiError> {
        let body = build_creative_payload(&self.page_id, spec);
        let response: IdResponse = self
            .post_json(&format!("act_{}/adcreatives", self.ad_account_id), &body)
            .await?;
        Ok(response.id)
    }

    /// Create an ad in a pre-existing ad-set. Never creates ad-sets.
    pub async fn create_ad(
        &self,
        name: &str,
        ad_set_id: &str,
        creative_id: &str,
        status: &str,
    ) -> Result<String, MetaApiError> {
        let body = serde_json::json!({
            "name": name,
            "adset_id": ad_set_id,
            "creative": { "creative_id": creative_id },
            "status": status,
        });
        let response: IdResponse = self
            .post_json(&format!("act_{}/ads", self.ad_account_id), &body)
            .await?;
        Ok(response.id)
    }

    /// Repoint an existing ad at a new creative. The ad's identity is
    /// preserved; only its creative reference changes.
    pub async fn update_ad_creative(
        &self,
        ad_id: &str,
        creative_id: &str,
    ) -> Result<(), MetaApiError> {
        let body = serde_json::json!({
            "creative": { "creative_id": creative_id },
        });
        let response = self
            .client
            .post(format!("{}/{}", self.api_url, ad_id))
            .query(&[("access_token", &self.access_token)])
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Look up the campaign an ad-set belongs to.
    pub async fn get_ad_set_campaign_id(&self, ad_set_id: &str) -> Result<String, MetaApiError> {
        let response = self
            .client
            .get(format!("{}/{}", self.api_url, ad_set_id))
            .query(&[
                ("fields", "campaign_id"),
                ("access_token", &self.access_token),
            ])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let adset: AdSetResponse = response.json().await?;
        Ok(adset.campaign_id)
    }

    // ---- private helpers ----

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, MetaApiError> {
        let response = self
            .client
            .post(format!("{}/{}", self.api_url, path))
            .query(&[("access_token", &self.access_token)])
            .json(body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Ensure the response has a success status code, or surface the
    /// status and body as a [`MetaApiError::Api`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, MetaApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetaApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Build the `adcreatives` payload from a [`CreativeSpec`].
///
/// Rotating copies land in the asset feed spec's bodies/titles; the
/// 4x5 and 9x16 assets are labelled and routed to their placements via
/// customization rules. Without a 9x16 asset no rules are emitted and
/// the platform serves the feed asset everywhere it fits.
fn build_creative_payload(page_id: &str, spec: &CreativeSpec) -> serde_json::Value {
    let mut images = Vec::new();
    let mut videos = Vec::new();

    let mut push_media = |media: &PlatformMedia, label: &str| match media {
        PlatformMedia::Image { hash } => images.push(serde_json::json!({
            "hash": hash,
            "adlabels": [{ "name": label }],
        })),
        PlatformMedia::Video { id } => videos.push(serde_json::json!({
            "video_id": id,
            "adlabels": [{ "name": label }],
        })),
    };

    push_media(&spec.feed_media, FEED_LABEL);
    if let Some(story) = &spec.story_media {
        push_media(story, STORY_LABEL);
    }

    let bodies: Vec<_> = spec
        .copies
        .iter()
        .map(|c| serde_json::json!({ "text": c.primary_text }))
        .collect();
    let titles: Vec<_> = spec
        .copies
        .iter()
        .map(|c| serde_json::json!({ "text": c.headline }))
        .collect();
    let descriptions: Vec<_> = spec
        .copies
        .iter()
        .filter_map(|c| c.description.as_ref())
        .map(|d| serde_json::json!({ "text": d }))
        .collect();

    let mut asset_feed_spec = serde_json::json!({
        "images": images,
        "videos": videos,
        "bodies": bodies,
        "titles": titles,
        "descriptions": descriptions,
        "call_to_action_types": ["LEARN_MORE"],
        "additional_data": {
            "tracking_id": spec.tracking_id,
        },
    });

    if spec.story_media.is_some() {
        asset_feed_spec["asset_customization_rules"] = serde_json::json!([
            {
                "customization_spec": { "publisher_platforms": ["facebook", "instagram"] },
                "label": { "name": FEED_LABEL },
            },
            {
                "customization_spec": {
                    "instagram_positions": ["story", "reels"],
                    "facebook_positions": ["story"],
                },
                "label": { "name": STORY_LABEL },
            },
        ]);
    }

    serde_json::json!({
        "name": spec.name,
        "object_story_spec": {
            "page_id": page_id,
            "template_data": {
                "message": spec.cta_message,
            },
        },
        "asset_feed_spec": asset_feed_spec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(story: Option<PlatformMedia>) -> CreativeSpec {
        CreativeSpec {
            name: "Lisbon Getaway - 9001 - V1".into(),
            feed_media: PlatformMedia::Image { hash: "h45".into() },
            story_media: story,
            copies: vec![
                CopyOption {
                    primary_text: "Seven nights in Lisbon".into(),
                    headline: "Lisbon Getaway".into(),
                    description: Some("Flights included".into()),
                },
                CopyOption {
                    primary_text: "Lisbon, door to door".into(),
                    headline: "Pack your bags".into(),
                    description: None,
                },
            ],
            cta_message: "Hi! I'd like to know more about package 9001.".into(),
            tracking_id: "pkg-9001-v1".into(),
        }
    }

    #[test]
    fn feed_only_payload_has_no_customization_rules() {
        let payload = build_creative_payload("page1", &spec(None));
        let feed = &payload["asset_feed_spec"];
        assert_eq!(feed["images"].as_array().unwrap().len(), 1);
        assert!(feed.get("asset_customization_rules").is_none());
    }

    #[test]
    fn story_media_adds_labelled_asset_and_rules() {
        let payload =
            build_creative_payload("page1", &spec(Some(PlatformMedia::Video { id: "v9".into() })));
        let feed = &payload["asset_feed_spec"];
        assert_eq!(feed["images"].as_array().unwrap().len(), 1);
        assert_eq!(feed["videos"].as_array().unwrap().len(), 1);
        assert_eq!(
            feed["videos"][0]["adlabels"][0]["name"],
            serde_json::json!("story")
        );
        assert_eq!(feed["asset_customization_rules"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn copies_become_rotating_options() {
        let payload = build_creative_payload("page1", &spec(None));
        let feed = &payload["asset_feed_spec"];
        assert_eq!(feed["bodies"].as_array().unwrap().len(), 2);
        assert_eq!(feed["titles"].as_array().unwrap().len(), 2);
        // Only copies with a description contribute one.
        assert_eq!(feed["descriptions"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn cta_and_tracking_are_embedded() {
        let payload = build_creative_payload("page1", &spec(None));
        assert_eq!(
            payload["object_story_spec"]["template_data"]["message"],
            serde_json::json!("Hi! I'd like to know more about package 9001.")
        );
        assert_eq!(
            payload["asset_feed_spec"]["additional_data"]["tracking_id"],
            serde_json::json!("pkg-9001-v1")
        );
    }
}
