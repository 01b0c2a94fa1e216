use crate::error::{Result, VisionError};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;
use tokio::fs;

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

pub async fn load_image(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).await.map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "Failed to read image");
        VisionError::FileNotFound {
            path: path.to_path_buf(),
        }
    })
}

pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// MIME type for an image path, by extension. Unknown extensions are treated as JPEG.
pub fn get_mime_type(path: impl AsRef<Path>) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

pub fn bytes_to_data_url(data: &[u8], mime_type: &str) -> String {
    format!("{DATA_URL_PREFIX}{mime_type}{BASE64_MARKER}{}", base64_encode(data))
}

/// Read an image and return it as a `data:<mime>;base64,<payload>` URL.
pub async fn encode_as_data_url(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let data = load_image(path).await?;
    Ok(bytes_to_data_url(&data, get_mime_type(path)))
}

/// Pull the base64 payload back out of a data URL.
pub fn extract_base64(data_url: &str) -> Result<&str> {
    let rest = data_url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| VisionError::invalid_request("not a data URL"))?;

    match rest.split_once(BASE64_MARKER) {
        Some((_, payload)) if !payload.is_empty() => Ok(payload),
        _ => Err(VisionError::invalid_request(
            "data URL has no base64 payload",
        )),
    }
}
