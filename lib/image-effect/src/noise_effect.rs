use crate::{Effect, ImageEffectResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Salt & pepper noise configuration
///
/// Paints `noise_level * width * height` square blocks of `block_size`
/// pixels, each one either pure white or pure black. Alpha is left alone.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SaltPepperConfig {
    #[derivative(Default(value = "0.02"))]
    noise_level: f64,

    #[derivative(Default(value = "1"))]
    block_size: u32,

    /// Fixed seed for reproducible output, random when `None`
    seed: Option<u64>,
}

impl SaltPepperConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for SaltPepperConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageEffectResult<()> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || self.noise_level <= 0.0 {
            return Ok(());
        }

        let block_size = self.block_size.max(1);
        let count = (self.noise_level * width as f64 * height as f64) as u64;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        for _ in 0..count {
            let row = rng.random_range(0..=height - block_size.min(height));
            let col = rng.random_range(0..=width - block_size.min(width));
            let value = if rng.random::<f64>() > 0.5 { 255 } else { 0 };

            for y in row..(row + block_size).min(height) {
                for x in col..(col + block_size).min(width) {
                    let pixel = image.get_pixel_mut(x, y);
                    pixel[0] = value;
                    pixel[1] = value;
                    pixel[2] = value;
                }
            }
        }

        Ok(())
    }
}
