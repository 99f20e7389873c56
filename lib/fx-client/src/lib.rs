//! HTTP client for the PixelFX image-processing backend.
//!
//! The backend owns the actual pixel work; this crate only speaks its
//! JSON/multipart contract (`/effects`, `/upload`, `/process`,
//! `/process-url`) and hands back decoded image bytes.

mod client;
mod request;
mod response;

pub use client::Client;
pub use request::{APIConfig, EffectParams};
pub use response::{EffectInfo, ParamInfo, UploadedImage};

use base64::{Engine, engine::general_purpose::STANDARD};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request Error {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Json Error {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Build a `data:` URL from raw image bytes
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decode a bare base64 payload or a full `data:` URL
pub fn decode_image_data(data: &str) -> Result<Vec<u8>> {
    let payload = match data.split_once(',') {
        Some((_, payload)) => payload,
        None => data,
    };
    Ok(STANDARD.decode(payload.trim())?)
}
