pub mod base_effect;
pub mod blur_effect;
pub mod canvas;
pub mod noise_effect;

use image::RgbaImage;

pub type ImageEffectResult<T> = Result<T, ImageEffectError>;

#[derive(thiserror::Error, Debug)]
pub enum ImageEffectError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub trait Effect {
    fn apply(&self, image: &mut RgbaImage) -> ImageEffectResult<()>;
}

/// Store a computed channel the way a canvas `Uint8ClampedArray` does:
/// clamp to `[0, 255]`, then round half to even.
pub fn clamp_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}
