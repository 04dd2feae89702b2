//! REST client for the Google Drive files API.
//!
//! Wraps the two calls the pipeline needs: resolve a package's asset
//! folder by name, and list the creative files inside it.

use serde::Deserialize;
use volare_core::creative::{AspectRatio, MediaKind};
use volare_core::types::DbId;

/// One creative asset found in a package's Drive folder.
#[derive(Debug, Clone)]
pub struct DriveAsset {
    /// Drive file id, used to build the download URL.
    pub file_id: String,
    /// Content identity (`md5Checksum`). Changes whenever the design
    /// team replaces the file's content, even in place.
    pub checksum: String,
    pub variant: i16,
    pub aspect_ratio: AspectRatio,
    pub media_kind: MediaKind,
    pub name: String,
}

/// Errors from the Drive adapter.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Drive returned a non-2xx status code.
    #[error("Drive API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// No asset folder exists for the package.
    #[error("No Drive folder named '{0}' under the creatives root")]
    FolderNotFound(String),
}

/// HTTP client for the Drive files API.
pub struct DriveClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    root_folder_id: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "md5Checksum")]
    md5_checksum: Option<String>,
}

impl DriveClient {
    /// Create a client for the Drive API.
    ///
    /// * `api_url` - base URL, e.g. `https://www.googleapis.com/drive/v3`.
    /// * `root_folder_id` - folder holding one subfolder per package.
    pub fn new(api_url: String, api_key: String, root_folder_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            root_folder_id,
        }
    }

    /// List the creative assets for a package, keyed by
    /// (variant, aspect ratio).
    ///
    /// Files whose names do not follow the `v{variant}_{ratio}.{ext}`
    /// convention are skipped with a warning rather than failing the
    /// listing.
    pub async fn list_package_assets(
        &self,
        package_external_id: DbId,
    ) -> Result<Vec<DriveAsset>, DriveError> {
        let folder_id = self.find_package_folder(package_external_id).await?;

        let query = format!("'{folder_id}' in parents and trashed = false");
        let files = self.list_files(&query).await?;

        let mut assets = Vec::with_capacity(files.len());
        for file in files {
            let Some((variant, aspect_ratio)) = parse_asset_name(&file.name) else {
                tracing::warn!(
                    package_external_id,
                    file = %file.name,
                    "Skipping Drive file with unrecognized name",
                );
                continue;
            };
            let Some(media_kind) = media_kind_for(&file.mime_type) else {
                tracing::warn!(
                    package_external_id,
                    file = %file.name,
                    mime_type = %file.mime_type,
                    "Skipping Drive file with unsupported mime type",
                );
                continue;
            };
            assets.push(DriveAsset {
                checksum: file.md5_checksum.unwrap_or_default(),
                file_id: file.id,
                variant,
                aspect_ratio,
                media_kind,
                name: file.name,
            });
        }
        Ok(assets)
    }

    /// Direct-download URL for a file, consumable by the ad platform's
    /// pull-based upload endpoints.
    pub fn download_url(&self, file_id: &str) -> String {
        format!(
            "{}/files/{}?alt=media&key={}",
            self.api_url, file_id, self.api_key
        )
    }

    // ---- private helpers ----

    /// Resolve the package's asset subfolder by name.
    async fn find_package_folder(&self, package_external_id: DbId) -> Result<String, DriveError> {
        let query = format!(
            "'{}' in parents and name = '{package_external_id}' \
             and mimeType = 'application/vnd.google-apps.folder' and trashed = false",
            self.root_folder_id
        );
        let folders = self.list_files(&query).await?;
        folders
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| DriveError::FolderNotFound(package_external_id.to_string()))
    }

    async fn list_files(&self, q: &str) -> Result<Vec<DriveFile>, DriveError> {
        let response = self
            .client
            .get(format!("{}/files", self.api_url))
            .query(&[
                ("q", q),
                ("fields", "files(id,name,mimeType,md5Checksum)"),
                ("key", &self.api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let list: FileList = response.json().await?;
        Ok(list.files)
    }
}

/// Parse `v{variant}_{ratio}.{ext}` asset names.
///
/// Returns `None` for names outside the convention.
fn parse_asset_name(name: &str) -> Option<(i16, AspectRatio)> {
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
    let rest = stem.strip_prefix('v')?;
    let (variant, ratio) = rest.split_once('_')?;
    let variant: i16 = variant.parse().ok()?;
    if !(1..=5).contains(&variant) {
        return None;
    }
    let aspect_ratio = AspectRatio::parse(ratio).ok()?;
    Some((variant, aspect_ratio))
}

/// Map a mime type to a media kind; non-media files are skipped.
fn media_kind_for(mime_type: &str) -> Option<MediaKind> {
    if mime_type.starts_with("image/") {
        Some(MediaKind::Image)
    } else if mime_type.starts_with("video/") {
        Some(MediaKind::Video)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feed_image_name() {
        assert_eq!(
            parse_asset_name("v1_4x5.png"),
            Some((1, AspectRatio::FourByFive))
        );
    }

    #[test]
    fn parses_story_video_name() {
        assert_eq!(
            parse_asset_name("v3_9x16.mp4"),
            Some((3, AspectRatio::NineBySixteen))
        );
    }

    #[test]
    fn rejects_out_of_range_variant() {
        assert_eq!(parse_asset_name("v6_4x5.png"), None);
        assert_eq!(parse_asset_name("v0_4x5.png"), None);
    }

    #[test]
    fn rejects_foreign_names() {
        assert_eq!(parse_asset_name("brief.pdf"), None);
        assert_eq!(parse_asset_name("v1-4x5.png"), None);
        assert_eq!(parse_asset_name("v1_16x9.png"), None);
    }

    #[test]
    fn name_without_extension_still_parses() {
        assert_eq!(
            parse_asset_name("v2_4x5"),
            Some((2, AspectRatio::FourByFive))
        );
    }

    #[test]
    fn media_kind_from_mime() {
        assert_eq!(media_kind_for("image/png"), Some(MediaKind::Image));
        assert_eq!(media_kind_for("video/mp4"), Some(MediaKind::Video));
        assert_eq!(media_kind_for("application/pdf"), None);
    }
}
