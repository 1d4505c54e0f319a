//! HTTP route handlers.
//!
//! Validation failures are rejected before the store is touched;
//! infrastructure failures surface as opaque 500s with detail in the
//! log. Enrichment failures never fail a request; the result list just
//! shrinks.

use std::io::Write;
use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::Json;
use axum::routing::{get, post};
use castmatch_enrichment::ProfileRecord;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ApiError;
use crate::media::{self, VideoClip};
use crate::state::AppState;

/// Upload size cap. The framework default of 2 MiB rejects ordinary
/// video clips; this covers short clips and high-resolution photos.
const MAX_UPLOAD_BYTES: usize = 250 * 1024 * 1024;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/add_known_face", post(add_known_face))
        .route("/photo_recognition", post(photo_recognition))
        .route("/video_recognition", post(video_recognition))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// One parsed multipart upload.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
    name: Option<String>,
}

/// Pull the `file` part (and optional `name` field) out of a multipart
/// body.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("unreadable upload: {e}")))?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("name") => {
                name = Some(field.text().await.map_err(|e| {
                    ApiError::Validation(format!("unreadable name field: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ApiError::Validation("no file provided".to_string()))?;

    Ok(Upload {
        file_name,
        bytes,
        name,
    })
}

fn ensure_image_upload(upload: &Upload) -> Result<(), ApiError> {
    if !media::has_allowed_extension(&upload.file_name, media::IMAGE_EXTENSIONS) {
        return Err(ApiError::Validation(
            "unsupported image format".to_string(),
        ));
    }
    image::load_from_memory(&upload.bytes)
        .map_err(|e| ApiError::Validation(format!("unreadable image: {e}")))?;
    Ok(())
}

/// Enroll one identity from a photo.
async fn add_known_face(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<String, ApiError> {
    let upload = read_upload(multipart).await?;
    let name = upload
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("no name provided".to_string()))?;
    ensure_image_upload(&upload)?;

    let embeddings = state
        .encoder
        .encode(&upload.bytes)
        .await
        .map_err(ApiError::from)?;
    let Some(embedding) = embeddings.first() else {
        return Err(ApiError::Validation(
            "no face detected in image".to_string(),
        ));
    };

    state.store.enroll(&name, embedding).await?;
    info!("Enrolled new face: {name}");
    Ok(format!("Face enrolled for {name}"))
}

/// Identify every enrolled person visible in a photo.
async fn photo_recognition(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Vec<ProfileRecord>>, ApiError> {
    let upload = read_upload(multipart).await?;
    ensure_image_upload(&upload)?;

    let embeddings = state
        .encoder
        .encode(&upload.bytes)
        .await
        .map_err(internal)?;
    let results = state
        .aggregator()
        .aggregate_image(&embeddings)
        .await
        .map_err(internal)?;

    let profiles = state.directory.enrich(results.names()).await;
    Ok(Json(profiles))
}

/// Identify every enrolled person appearing in a video clip.
async fn video_recognition(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Vec<ProfileRecord>>, ApiError> {
    let upload = read_upload(multipart).await?;
    if upload.file_name.is_empty() {
        return Err(ApiError::Validation("empty filename".to_string()));
    }
    if !media::has_allowed_extension(&upload.file_name, media::VIDEO_EXTENSIONS) {
        return Err(ApiError::Validation(
            "unsupported video format".to_string(),
        ));
    }

    // The clip lives in the scratch directory only while this request
    // runs; NamedTempFile removes it on every exit path.
    std::fs::create_dir_all(&state.scratch_dir)
        .map_err(|e| ApiError::Internal(format!("scratch dir unavailable: {e}")))?;
    let mut scratch = tempfile::Builder::new()
        .suffix(&format!(".{}", extension_of(&upload.file_name)))
        .tempfile_in(&state.scratch_dir)
        .map_err(|e| ApiError::Internal(format!("cannot save upload: {e}")))?;
    scratch
        .write_all(&upload.bytes)
        .and_then(|()| scratch.flush())
        .map_err(|e| ApiError::Internal(format!("cannot save upload: {e}")))?;

    let mut clip = VideoClip::open(scratch.path()).map_err(internal)?;
    let results = state
        .aggregator()
        .aggregate_video(&mut clip)
        .await
        .map_err(internal)?;

    let profiles = state.directory.enrich(results.names()).await;
    Ok(Json(profiles))
}

/// Liveness probe that also exercises the store path.
async fn healthz(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let enrolled = state.store.count().await?;
    Ok(Json(json!({ "status": "ok", "enrolled": enrolled })))
}

fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

fn internal(e: impl std::fmt::Display) -> ApiError {
    ApiError::Internal(e.to_string())
}
