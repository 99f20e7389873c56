use crate::{Effect, ImageEffectError, ImageEffectResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;

/// Gaussian blur configuration
///
/// `radius` is in pixels and is used as the Gaussian standard deviation,
/// which is how a CSS `blur(<radius>px)` filter is defined.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BlurConfig {
    #[derivative(Default(value = "0.0"))]
    radius: f64,
}

impl BlurConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_noop(&self) -> bool {
        self.radius <= 0.0
    }
}

impl Effect for BlurConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageEffectResult<()> {
        if !self.radius.is_finite() {
            return Err(ImageEffectError::InvalidParameter(format!(
                "blur radius {}",
                self.radius
            )));
        }

        if self.is_noop() || image.width() == 0 || image.height() == 0 {
            return Ok(());
        }

        *image = imageproc::filter::gaussian_blur_f32(image, self.radius as f32);
        Ok(())
    }
}
