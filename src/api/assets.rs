//! Embedded landing page and static assets
//!
//! Falls back to the filesystem so the page can be edited without a rebuild.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::PathBuf;

const ASSET_DIR: &str = "ui";

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Serve embedded static files, with filesystem fallback for development
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let path = format!("assets/{}", path.trim_start_matches('/'));
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    if let Some(content) = Assets::get(&path) {
        return (
            [(header::CONTENT_TYPE, mime.to_string())],
            content.data.into_owned(),
        )
            .into_response();
    }

    // Never follow `..` out of the asset directory
    if path.split('/').any(|segment| segment == "..") {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    match std::fs::read(PathBuf::from(ASSET_DIR).join(&path)) {
        Ok(content) => ([(header::CONTENT_TYPE, mime.to_string())], content).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Get the index.html content (embedded or from filesystem)
pub fn get_index_html() -> Option<String> {
    if let Some(content) = Assets::get("index.html") {
        return String::from_utf8(content.data.into_owned()).ok();
    }

    std::fs::read_to_string(PathBuf::from(ASSET_DIR).join("index.html")).ok()
}
