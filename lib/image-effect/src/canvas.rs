//! Fixed-order canvas pipeline
//!
//! Mirrors how a 2D canvas editor renders: pixel effects are baked into the
//! RGBA buffer in a fixed order (grayscale, brightness, contrast, noise),
//! while blur stays a non-destructive display filter that is only
//! rasterized when the result is flattened for export.

use crate::{
    Effect, ImageEffectResult,
    base_effect::{BrightnessConfig, ContrastConfig, GrayscaleConfig},
    blur_effect::BlurConfig,
    noise_effect::SaltPepperConfig,
};
use image::RgbaImage;
use std::fmt;

/// Brightness/contrast value at which the effect is skipped
pub const NEUTRAL_PERCENT: f64 = 100.0;

/// Display-time filter applied on top of the rendered pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DisplayFilter {
    #[default]
    None,
    /// Blur radius in pixels
    Blur(f64),
}

impl fmt::Display for DisplayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayFilter::None => write!(f, "none"),
            DisplayFilter::Blur(radius) => write!(f, "blur({radius}px)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CanvasPipeline {
    grayscale: Option<GrayscaleConfig>,
    brightness: Option<BrightnessConfig>,
    contrast: Option<ContrastConfig>,
    salt_pepper: Option<SaltPepperConfig>,
    blur: Option<BlurConfig>,
}

#[derive(Debug, Clone)]
pub struct CanvasOutput {
    pub image: RgbaImage,
    pub filter: DisplayFilter,
}

impl CanvasPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grayscale(mut self, config: GrayscaleConfig) -> Self {
        self.grayscale = Some(config);
        self
    }

    pub fn with_brightness(mut self, config: BrightnessConfig) -> Self {
        self.brightness = Some(config);
        self
    }

    pub fn with_contrast(mut self, config: ContrastConfig) -> Self {
        self.contrast = Some(config);
        self
    }

    pub fn with_salt_pepper(mut self, config: SaltPepperConfig) -> Self {
        self.salt_pepper = Some(config);
        self
    }

    pub fn with_blur(mut self, config: BlurConfig) -> Self {
        self.blur = Some(config);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.grayscale.is_none()
            && self.brightness.is_none()
            && self.contrast.is_none()
            && self.salt_pepper.is_none()
            && self.blur.is_none()
    }

    /// Render onto a fresh copy of `source`; the source is never modified.
    pub fn render(&self, source: &RgbaImage) -> ImageEffectResult<CanvasOutput> {
        let mut image = source.clone();

        if let Some(config) = &self.grayscale
            && config.intensity() > 0.0
        {
            config.apply(&mut image)?;
        }

        if let Some(config) = &self.brightness
            && config.percent() != NEUTRAL_PERCENT
        {
            config.apply(&mut image)?;
        }

        if let Some(config) = &self.contrast
            && config.percent() != NEUTRAL_PERCENT
        {
            config.apply(&mut image)?;
        }

        if let Some(config) = &self.salt_pepper {
            config.apply(&mut image)?;
        }

        let filter = match &self.blur {
            Some(config) if !config.is_noop() => DisplayFilter::Blur(config.radius()),
            _ => DisplayFilter::None,
        };

        log::debug!(
            "canvas rendered {}x{} with filter {filter}",
            image.width(),
            image.height()
        );

        Ok(CanvasOutput { image, filter })
    }
}

impl CanvasOutput {
    /// Bake the display filter into the pixels
    pub fn flatten(self) -> ImageEffectResult<RgbaImage> {
        let mut image = self.image;
        if let DisplayFilter::Blur(radius) = self.filter {
            BlurConfig::new().with_radius(radius).apply(&mut image)?;
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| Rgba([(x * 50) as u8, (y * 60) as u8, 90, 255]))
    }

    #[test]
    fn test_empty_pipeline_is_identity() -> ImageEffectResult<()> {
        let source = sample();
        let output = CanvasPipeline::new().render(&source)?;

        assert_eq!(output.image, source);
        assert_eq!(output.filter, DisplayFilter::None);
        Ok(())
    }

    #[test]
    fn test_neutral_values_are_skipped() -> ImageEffectResult<()> {
        let source = sample();
        let output = CanvasPipeline::new()
            .with_grayscale(GrayscaleConfig::from_percent(0.0))
            .with_brightness(BrightnessConfig::new())
            .with_contrast(ContrastConfig::new())
            .render(&source)?;

        assert_eq!(output.image, source);
        Ok(())
    }

    #[test]
    fn test_fixed_order_grayscale_then_brightness() -> ImageEffectResult<()> {
        let source = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let output = CanvasPipeline::new()
            .with_brightness(BrightnessConfig::new().with_percent(50.0))
            .with_grayscale(GrayscaleConfig::from_percent(100.0))
            .render(&source)?;

        // grayscale first: 76, then halved: 38
        assert_eq!(output.image.get_pixel(1, 1).0, [38, 38, 38, 255]);
        Ok(())
    }

    #[test]
    fn test_blur_is_a_display_filter() -> ImageEffectResult<()> {
        let source = sample();
        let output = CanvasPipeline::new()
            .with_blur(BlurConfig::new().with_radius(3.0))
            .render(&source)?;

        assert_eq!(output.image, source);
        assert_eq!(output.filter, DisplayFilter::Blur(3.0));
        assert_eq!(output.filter.to_string(), "blur(3px)");
        Ok(())
    }

    #[test]
    fn test_zero_blur_resets_filter() -> ImageEffectResult<()> {
        let output = CanvasPipeline::new()
            .with_blur(BlurConfig::new())
            .render(&sample())?;

        assert_eq!(output.filter.to_string(), "none");
        Ok(())
    }

    #[test]
    fn test_flatten_rasterizes_blur() -> ImageEffectResult<()> {
        let source = RgbaImage::from_fn(8, 1, |x, _| {
            if x < 4 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        });
        let output = CanvasPipeline::new()
            .with_blur(BlurConfig::new().with_radius(1.5))
            .render(&source)?;

        let flat = output.flatten()?;
        assert_ne!(flat, source);
        Ok(())
    }

    #[test]
    fn test_fractional_blur_display() {
        assert_eq!(DisplayFilter::Blur(2.5).to_string(), "blur(2.5px)");
    }
}
