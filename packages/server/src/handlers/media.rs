use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use common::storage::FileKey;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/media/{key}",
    tag = "Media",
    operation_id = "getMedia",
    summary = "Download an uploaded file",
    description = "Serves resumes and logos by the key embedded in `resume_url` / `logo_url`.",
    params(("key" = String, Path, description = "Storage key, e.g. `logos/ab/<hash>.png`")),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "No such file (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = FileKey::parse(&key).map_err(|_| AppError::NotFound("File not found".into()))?;
    let reader = state.files.open(&key).await?;

    let mime = mime_guess::from_ext(key.extension()).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        // Keys are content hashes, so a given URL never changes.
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(e.to_string()))
}
