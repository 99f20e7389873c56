//! Render paths
//!
//! `LocalRenderer` runs the fixed-order canvas pipeline in process.
//! `RemoteRenderer` ships the source and the ordered effect list to the
//! processing backend in one of three request shapes.

use super::{ActiveEffect, EditorResult, EncodedImage, SourceImage};
use crate::config::RequestShape;
use async_trait::async_trait;
use derive_setters::Setters;
use fx_client::EffectParams;
use image::ImageFormat;
use image_effect::{
    Effect,
    base_effect::{BrightnessConfig, ContrastConfig, GrayscaleConfig},
    blur_effect::BlurConfig,
    canvas::{CanvasPipeline, DisplayFilter},
    noise_effect::SaltPepperConfig,
};
use std::sync::Arc;

/// A rendered frame and the display filter it should be shown with
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub image: EncodedImage,
    pub filter: DisplayFilter,
}

impl Rendered {
    pub fn new(image: EncodedImage) -> Self {
        Self {
            image,
            filter: DisplayFilter::None,
        }
    }

    /// The frame with its display filter baked in
    pub fn flattened(&self) -> EditorResult<EncodedImage> {
        match self.filter {
            DisplayFilter::None => Ok(self.image.clone()),
            DisplayFilter::Blur(radius) => {
                let mut pixels = self.image.decode()?;
                BlurConfig::new().with_radius(radius).apply(&mut pixels)?;
                EncodedImage::from_pixels(&pixels, self.image.format())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderJob {
    pub source: Arc<SourceImage>,
    pub effects: Vec<ActiveEffect>,
    pub preview: bool,
}

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Runs once per upload, before the source is stored
    async fn prepare(&self, source: SourceImage) -> EditorResult<SourceImage> {
        Ok(source)
    }

    async fn render(&self, job: RenderJob) -> EditorResult<Rendered>;
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct LocalRenderer {
    /// Bake blur into applied results instead of leaving it as a filter
    #[derivative(Default(value = "true"))]
    rasterize_blur: bool,

    noise_seed: Option<u64>,
}

impl LocalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipeline(&self, effects: &[ActiveEffect]) -> CanvasPipeline {
        let mut pipeline = CanvasPipeline::new();

        for effect in effects {
            pipeline = match effect.id.as_str() {
                "grayscale" => pipeline
                    .with_grayscale(GrayscaleConfig::from_percent(param(effect, "intensity", 0.0))),
                "brightness" => pipeline.with_brightness(
                    BrightnessConfig::new().with_percent(param(effect, "value", 100.0)),
                ),
                "contrast" => pipeline.with_contrast(
                    ContrastConfig::new().with_percent(param(effect, "value", 100.0)),
                ),
                "blur" => {
                    pipeline.with_blur(BlurConfig::new().with_radius(param(effect, "radius", 0.0)))
                }
                "salt_pepper" => pipeline.with_salt_pepper(
                    SaltPepperConfig::new()
                        .with_noise_level(param(effect, "noise_level", 0.02))
                        .with_block_size(param(effect, "block_size", 1.0).round().max(1.0) as u32)
                        .with_seed(self.noise_seed),
                ),
                other => {
                    log::warn!("no local implementation for `{other}`, skipped");
                    pipeline
                }
            };
        }

        pipeline
    }
}

// Remote registries may name the parameter differently, fall back to the first one
fn param(effect: &ActiveEffect, key: &str, fallback: f64) -> f64 {
    effect
        .value(key)
        .or_else(|| effect.params.values().next().copied())
        .unwrap_or(fallback)
}

#[async_trait]
impl Renderer for LocalRenderer {
    async fn render(&self, job: RenderJob) -> EditorResult<Rendered> {
        let output = self.pipeline(&job.effects).render(job.source.pixels())?;

        if job.preview || !self.rasterize_blur {
            return Ok(Rendered {
                image: EncodedImage::from_pixels(&output.image, ImageFormat::Png)?,
                filter: output.filter,
            });
        }

        let pixels = output.flatten()?;
        Ok(Rendered::new(EncodedImage::from_pixels(
            &pixels,
            ImageFormat::Png,
        )?))
    }
}

#[derive(Debug, Clone)]
pub struct RemoteRenderer {
    client: fx_client::Client,
    shape: RequestShape,
}

impl RemoteRenderer {
    pub fn new(client: fx_client::Client, shape: RequestShape) -> Self {
        Self { client, shape }
    }

    async fn upload(&self, source: &SourceImage) -> EditorResult<String> {
        let file_name = match source.file_name() {
            "" => "image.png",
            name => name,
        };

        let uploaded = self
            .client
            .upload(
                file_name,
                source.encoded().mime(),
                source.encoded().bytes().to_vec(),
            )
            .await?;

        Ok(uploaded.id)
    }
}

#[async_trait]
impl Renderer for RemoteRenderer {
    async fn prepare(&self, source: SourceImage) -> EditorResult<SourceImage> {
        if self.shape != RequestShape::UploadedId {
            return Ok(source);
        }

        let id = self.upload(&source).await?;
        Ok(source.with_upload_id(id))
    }

    async fn render(&self, job: RenderJob) -> EditorResult<Rendered> {
        let effects: Vec<EffectParams> = job.effects.iter().map(ActiveEffect::to_params).collect();
        let source = job.source.as_ref();

        let bytes = match self.shape {
            RequestShape::DataUrl => {
                self.client
                    .process_url(&source.encoded().data_url(), &effects, job.preview)
                    .await?
            }
            RequestShape::Multipart => {
                self.client
                    .process_multipart(source.png_bytes()?, &effects, job.preview)
                    .await?
            }
            RequestShape::UploadedId => {
                let id = match source.upload_id() {
                    Some(id) => id.to_string(),
                    None => {
                        log::warn!("source was never uploaded, uploading now");
                        self.upload(source).await?
                    }
                };
                self.client.process_id(&id, &effects, job.preview).await?
            }
        };

        Ok(Rendered::new(EncodedImage::from_bytes(bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{logic::EditorError, registry::EffectRegistry};
    use axum::{
        Json, Router,
        body::Bytes,
        extract::{Multipart, State},
        http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
        routing::post,
    };
    use fx_client::APIConfig;
    use image::{Rgba, RgbaImage};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    type Calls = Arc<Mutex<Vec<String>>>;

    fn job(pixel: [u8; 4], effects: &[(&str, &str, f64)], preview: bool) -> RenderJob {
        let registry = EffectRegistry::builtin();
        let source =
            SourceImage::from_pixels("photo.png", RgbaImage::from_pixel(2, 2, Rgba(pixel)))
                .unwrap();

        let effects = effects
            .iter()
            .map(|(id, param, value)| {
                let mut effect = ActiveEffect::from_definition(registry.get(id).unwrap());
                effect.params.insert(param.to_string(), *value);
                effect
            })
            .collect();

        RenderJob {
            source: Arc::new(source),
            effects,
            preview,
        }
    }

    fn blue_png_base64() -> String {
        EncodedImage::from_pixels(
            &RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 255])),
            ImageFormat::Png,
        )
        .unwrap()
        .to_base64()
    }

    #[tokio::test]
    async fn test_local_grayscale_red() -> EditorResult<()> {
        let rendered = LocalRenderer::new()
            .render(job([255, 0, 0, 255], &[("grayscale", "intensity", 100.0)], true))
            .await?;

        let pixels = rendered.image.decode()?;
        assert!(pixels.pixels().all(|p| p.0 == [76, 76, 76, 255]));
        assert_eq!(rendered.filter, DisplayFilter::None);
        Ok(())
    }

    #[tokio::test]
    async fn test_local_brightness_half() -> EditorResult<()> {
        let rendered = LocalRenderer::new()
            .render(job([200, 100, 50, 255], &[("brightness", "value", 50.0)], false))
            .await?;

        assert_eq!(rendered.image.decode()?.get_pixel(0, 0).0, [100, 50, 25, 255]);
        Ok(())
    }

    #[tokio::test]
    async fn test_local_blur_filter_and_rasterize() -> EditorResult<()> {
        let mut source = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        for y in 0..8 {
            for x in 4..8 {
                source.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }

        let registry = EffectRegistry::builtin();
        let mut blur = ActiveEffect::from_definition(registry.get("blur").unwrap());
        blur.params["radius"] = 2.0;
        let job = |preview| RenderJob {
            source: Arc::new(SourceImage::from_pixels("edge.png", source.clone()).unwrap()),
            effects: vec![blur.clone()],
            preview,
        };

        let preview = LocalRenderer::new().render(job(true)).await?;
        assert_eq!(preview.filter, DisplayFilter::Blur(2.0));
        assert_eq!(preview.image.decode()?, source);

        let applied = LocalRenderer::new().render(job(false)).await?;
        assert_eq!(applied.filter, DisplayFilter::None);
        assert_ne!(applied.image.decode()?, source);
        assert_eq!(applied.image, preview.flattened()?);

        let kept = LocalRenderer::new()
            .with_rasterize_blur(false)
            .render(job(false))
            .await?;
        assert_eq!(kept.filter, DisplayFilter::Blur(2.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_local_noise_seed_is_reproducible() -> EditorResult<()> {
        let renderer = LocalRenderer::new().with_noise_seed(Some(7));
        let noisy = |renderer: &LocalRenderer| {
            let job = job([128, 128, 128, 255], &[("salt_pepper", "noise_level", 0.1)], true);
            let renderer = renderer.clone();
            async move { renderer.render(job).await }
        };

        let first = noisy(&renderer).await?;
        let second = noisy(&renderer).await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_pipeline_skips_unknown_effects() {
        let effect = ActiveEffect {
            id: "sepia".to_string(),
            params: Default::default(),
        };
        assert!(LocalRenderer::new().pipeline(&[effect]).is_empty());
    }

    #[test]
    fn test_param_falls_back_to_first_value() {
        let effect = ActiveEffect {
            id: "grayscale".to_string(),
            params: [("factor".to_string(), 0.5)].into_iter().collect(),
        };
        assert_eq!(param(&effect, "intensity", 0.0), 0.5);
        assert_eq!(param(&effect, "factor", 0.0), 0.5);
    }

    async fn process_url(State(calls): State<Calls>, Json(body): Json<Value>) -> Json<Value> {
        calls.lock().unwrap().push(format!(
            "process-url preview={} effects={}",
            body["preview"], body["effects"][0]["id"]
        ));
        Json(json!({ "image": blue_png_base64() }))
    }

    async fn upload(State(calls): State<Calls>, mut multipart: Multipart) -> Json<Value> {
        let field = multipart.next_field().await.unwrap().unwrap();
        calls.lock().unwrap().push(format!(
            "upload {}={}",
            field.name().unwrap_or_default(),
            field.file_name().unwrap_or_default()
        ));
        Json(json!({ "id": "img-7", "image": "" }))
    }

    async fn process(State(calls): State<Calls>, headers: HeaderMap, body: Bytes) -> Json<Value> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            calls.lock().unwrap().push("process multipart".to_string());
        } else {
            let body: Value = serde_json::from_slice(&body).unwrap();
            calls
                .lock()
                .unwrap()
                .push(format!("process id={}", body["image_id"]));
        }

        Json(json!({ "processed_image": blue_png_base64() }))
    }

    async fn backend(shape: RequestShape) -> anyhow::Result<(RemoteRenderer, Calls)> {
        let calls = Calls::default();
        let router = Router::new()
            .route("/process-url", post(process_url))
            .route("/upload", post(upload))
            .route("/process", post(process))
            .with_state(calls.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, router).await });

        let client = fx_client::Client::new(APIConfig {
            api_base_url: format!("http://{addr}"),
            timeout_secs: 5,
        });
        Ok((RemoteRenderer::new(client, shape), calls))
    }

    #[tokio::test]
    async fn test_remote_data_url_shape() -> anyhow::Result<()> {
        let (renderer, calls) = backend(RequestShape::DataUrl).await?;

        let rendered = renderer
            .render(job([255, 0, 0, 255], &[("blur", "radius", 3.0)], true))
            .await?;

        assert_eq!(rendered.image.decode()?.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(
            *calls.lock().unwrap(),
            ["process-url preview=true effects=\"blur\""]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_multipart_shape() -> anyhow::Result<()> {
        let (renderer, calls) = backend(RequestShape::Multipart).await?;

        renderer
            .render(job([255, 0, 0, 255], &[("contrast", "value", 120.0)], false))
            .await?;

        assert_eq!(*calls.lock().unwrap(), ["process multipart"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_uploaded_id_shape() -> anyhow::Result<()> {
        let (renderer, calls) = backend(RequestShape::UploadedId).await?;

        let job = job([255, 0, 0, 255], &[("grayscale", "intensity", 50.0)], false);
        let source = renderer.prepare(job.source.as_ref().clone()).await?;
        assert_eq!(source.upload_id(), Some("img-7"));

        let job = RenderJob {
            source: Arc::new(source),
            ..job
        };
        renderer.render(job).await?;

        assert_eq!(
            *calls.lock().unwrap(),
            ["upload file=photo.png", "process id=\"img-7\""]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_error_status() -> anyhow::Result<()> {
        let router = Router::new().route(
            "/process-url",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "cannot identify image file" })),
                )
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, router).await });

        let renderer = RemoteRenderer::new(
            fx_client::Client::new(APIConfig {
                api_base_url: format!("http://{addr}"),
                timeout_secs: 5,
            }),
            RequestShape::DataUrl,
        );

        let err = renderer
            .render(job([1, 2, 3, 255], &[("blur", "radius", 1.0)], true))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::Remote(fx_client::Error::Status { status: 500, .. })
        ));
        Ok(())
    }
}
