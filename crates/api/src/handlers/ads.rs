//! Handlers for the ad create and update endpoints.
//!
//! Both endpoints validate the request up front, then spawn the
//! publish run and stream its progress events back as newline-delimited
//! JSON. The HTTP response starts as soon as the run is spawned; a
//! client that disconnects mid-stream does not abort the run.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::sync::mpsc;
use volare_pipeline::progress::DEFAULT_CAPACITY;
use volare_pipeline::publisher::{CreateAdsRequest, UpdateAdsRequest};
use volare_pipeline::{ProgressEvent, ProgressSender};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Variant numbers are 1–5; anything else is rejected before any
/// external call is made.
fn validate_variant(variant: i16) -> Result<(), AppError> {
    if !(1..=5).contains(&variant) {
        return Err(AppError::BadRequest(format!(
            "Variant {variant} is out of range (1-5)"
        )));
    }
    Ok(())
}

fn validate_create(request: &CreateAdsRequest) -> Result<(), AppError> {
    if request.packages.is_empty() {
        return Err(AppError::BadRequest(
            "Request must name at least one package".into(),
        ));
    }
    for item in &request.packages {
        if item.ad_set_id.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "Package {} has an empty ad set id",
                item.package_id
            )));
        }
        for variant in item.variants.iter().flatten() {
            validate_variant(*variant)?;
        }
    }
    Ok(())
}

fn validate_update(request: &UpdateAdsRequest) -> Result<(), AppError> {
    match request {
        UpdateAdsRequest::ByPackage { .. } => Ok(()),
        UpdateAdsRequest::ByAds { ads } => {
            if ads.is_empty() {
                return Err(AppError::BadRequest(
                    "Request must name at least one ad".into(),
                ));
            }
            for item in ads {
                if let Some(variant) = item.variant {
                    validate_variant(variant)?;
                }
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

/// Wrap a progress receiver into an `application/x-ndjson` response
/// body, one event per line. The stream ends when the publisher drops
/// its sender after the `complete` event.
fn ndjson_response(receiver: mpsc::Receiver<ProgressEvent>) -> Response {
    let stream = futures::stream::unfold(receiver, |mut rx| async move {
        let event = rx.recv().await?;
        let line = match serde_json::to_vec(&event) {
            Ok(mut line) => {
                line.push(b'\n');
                Bytes::from(line)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize progress event");
                Bytes::new()
            }
        };
        Some((Ok::<_, std::convert::Infallible>(line), rx))
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(stream),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// POST /ads
// ---------------------------------------------------------------------------

/// Create ads for the requested packages, streaming progress.
pub async fn create_ads(
    State(state): State<AppState>,
    Json(request): Json<CreateAdsRequest>,
) -> AppResult<Response> {
    validate_create(&request)?;

    let publisher = state.publisher();
    let (sender, receiver) = ProgressSender::channel(DEFAULT_CAPACITY);
    tokio::spawn(async move {
        publisher.create_ads(request, &sender).await;
    });

    Ok(ndjson_response(receiver))
}

// ---------------------------------------------------------------------------
// POST /ads/update
// ---------------------------------------------------------------------------

/// Refresh existing ads with newly built creatives, streaming progress.
pub async fn update_ads(
    State(state): State<AppState>,
    Json(request): Json<UpdateAdsRequest>,
) -> AppResult<Response> {
    validate_update(&request)?;

    let publisher = state.publisher();
    let (sender, receiver) = ProgressSender::channel(DEFAULT_CAPACITY);
    tokio::spawn(async move {
        publisher.update_ads(request, &sender).await;
    });

    Ok(ndjson_response(receiver))
}
