use crate::{Effect, ImageEffectResult, clamp_channel};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;

/// Perceptual luma weights used by the grayscale blend
const LUMA_WEIGHTS: [f64; 3] = [0.3, 0.59, 0.11];

/// Grayscale blend configuration
///
/// `intensity` is a fraction in `[0, 1]`: 0 keeps the original colors,
/// 1 replaces every channel with the pixel's luma.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GrayscaleConfig {
    #[derivative(Default(value = "0.0"))]
    intensity: f64,
}

impl GrayscaleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a slider percentage in `[0, 100]`
    pub fn from_percent(percent: f64) -> Self {
        Self::new().with_intensity((percent / 100.0).clamp(0.0, 1.0))
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }
}

impl Effect for GrayscaleConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageEffectResult<()> {
        let intensity = self.intensity.clamp(0.0, 1.0);
        if intensity <= 0.0 {
            return Ok(());
        }

        for pixel in image.pixels_mut() {
            let luma = LUMA_WEIGHTS[0] * pixel[0] as f64
                + LUMA_WEIGHTS[1] * pixel[1] as f64
                + LUMA_WEIGHTS[2] * pixel[2] as f64;

            for i in 0..3 {
                let val = pixel[i] as f64;
                pixel[i] = clamp_channel(val * (1.0 - intensity) + luma * intensity);
            }
        }

        Ok(())
    }
}

/// Brightness adjustment configuration
///
/// `percent` scales every channel: 100 keeps the image unchanged,
/// 50 halves it, 200 doubles it (saturating at 255).
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BrightnessConfig {
    #[derivative(Default(value = "100.0"))]
    percent: f64,
}

impl BrightnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }
}

impl Effect for BrightnessConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageEffectResult<()> {
        let factor = self.percent / 100.0;

        for pixel in image.pixels_mut() {
            for i in 0..3 {
                pixel[i] = clamp_channel(pixel[i] as f64 * factor);
            }
        }

        Ok(())
    }
}

/// Contrast adjustment configuration
///
/// Linear blend around mid-gray: `factor = (percent / 100) * 2`,
/// `c' = c * factor + 128 * (1 - factor)`. Note that 100 maps to a factor
/// of 2, so the formula is only neutral at 50; callers that treat 100 as
/// "unchanged" must skip the effect themselves.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ContrastConfig {
    #[derivative(Default(value = "100.0"))]
    percent: f64,
}

impl ContrastConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }
}

impl Effect for ContrastConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageEffectResult<()> {
        let factor = (self.percent / 100.0) * 2.0;
        let intercept = 128.0 * (1.0 - factor);

        for pixel in image.pixels_mut() {
            for i in 0..3 {
                pixel[i] = clamp_channel(pixel[i] as f64 * factor + intercept);
            }
        }

        Ok(())
    }
}
