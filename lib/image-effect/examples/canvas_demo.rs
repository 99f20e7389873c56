use image::{Rgba, RgbaImage};
use image_effect::{
    base_effect::{BrightnessConfig, ContrastConfig, GrayscaleConfig},
    blur_effect::BlurConfig,
    canvas::CanvasPipeline,
    noise_effect::SaltPepperConfig,
};
use std::path::Path;

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width) as u8,
            (y * 255 / height) as u8,
            ((x + y) * 255 / (width + height)) as u8,
            255,
        ])
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    let source = gradient(800, 600);
    source.save(output_dir.join("canvas_source.png"))?;

    let pipelines = [
        (
            "grayscale_60",
            CanvasPipeline::new().with_grayscale(GrayscaleConfig::from_percent(60.0)),
        ),
        (
            "brightness_140",
            CanvasPipeline::new().with_brightness(BrightnessConfig::new().with_percent(140.0)),
        ),
        (
            "contrast_70",
            CanvasPipeline::new().with_contrast(ContrastConfig::new().with_percent(70.0)),
        ),
        (
            "noise",
            CanvasPipeline::new().with_salt_pepper(SaltPepperConfig::new().with_seed(Some(1))),
        ),
        (
            "combined_blur_4",
            CanvasPipeline::new()
                .with_grayscale(GrayscaleConfig::from_percent(100.0))
                .with_contrast(ContrastConfig::new().with_percent(60.0))
                .with_blur(BlurConfig::new().with_radius(4.0)),
        ),
    ];

    for (name, pipeline) in pipelines {
        let output = pipeline.render(&source)?;
        println!("{name}: display filter = {}", output.filter);

        let filename = format!("canvas_{name}.png");
        output.flatten()?.save(output_dir.join(&filename))?;
        println!("✓ Generated {filename}");
    }

    println!("\n✓ Images saved to: tmp/");
    Ok(())
}
