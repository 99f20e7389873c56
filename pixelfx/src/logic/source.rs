use super::EditorResult;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::{fs, io::Cursor, path::Path};

/// Encoded image bytes plus the container format they are in
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl EncodedImage {
    pub fn from_pixels(pixels: &RgbaImage, format: ImageFormat) -> EditorResult<Self> {
        let mut buf = Cursor::new(Vec::new());

        // jpeg has no alpha channel
        if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgba8(pixels.clone())
                .to_rgb8()
                .write_to(&mut buf, format)?;
        } else {
            pixels.write_to(&mut buf, format)?;
        }

        Ok(Self {
            bytes: buf.into_inner(),
            format,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> EditorResult<Self> {
        let format = image::guess_format(&bytes)?;
        Ok(Self { bytes, format })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn data_url(&self) -> String {
        fx_client::to_data_url(self.mime(), &self.bytes)
    }

    pub fn decode(&self) -> EditorResult<RgbaImage> {
        Ok(image::load_from_memory_with_format(&self.bytes, self.format)?.to_rgba8())
    }

    /// Write to `path`, re-encoding when its extension names another format
    pub fn save(&self, path: &Path) -> EditorResult<()> {
        match ImageFormat::from_path(path) {
            Ok(target) if target != self.format => {
                let converted = Self::from_pixels(&self.decode()?, target)?;
                fs::write(path, converted.bytes)?;
            }
            _ => fs::write(path, &self.bytes)?,
        }

        log::info!("saved {}", path.display());
        Ok(())
    }
}

/// The uploaded image, kept pristine for every render
#[derive(Debug, Clone)]
pub struct SourceImage {
    file_name: String,
    encoded: EncodedImage,
    pixels: RgbaImage,

    /// Server-side id when the backend stores uploads
    upload_id: Option<String>,
}

impl SourceImage {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> EditorResult<Self> {
        let encoded = EncodedImage::from_bytes(bytes)?;
        let pixels = encoded.decode()?;

        Ok(Self {
            file_name: file_name.into(),
            encoded,
            pixels,
            upload_id: None,
        })
    }

    pub fn from_pixels(file_name: impl Into<String>, pixels: RgbaImage) -> EditorResult<Self> {
        Ok(Self {
            file_name: file_name.into(),
            encoded: EncodedImage::from_pixels(&pixels, ImageFormat::Png)?,
            pixels,
            upload_id: None,
        })
    }

    pub fn open(path: &Path) -> EditorResult<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::from_bytes(file_name, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn encoded(&self) -> &EncodedImage {
        &self.encoded
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn upload_id(&self) -> Option<&str> {
        self.upload_id.as_deref()
    }

    pub fn with_upload_id(mut self, id: impl Into<String>) -> Self {
        self.upload_id = Some(id.into());
        self
    }

    pub fn png_bytes(&self) -> EditorResult<Vec<u8>> {
        if self.encoded.format == ImageFormat::Png {
            return Ok(self.encoded.bytes.clone());
        }
        Ok(EncodedImage::from_pixels(&self.pixels, ImageFormat::Png)?.bytes)
    }

    /// `<stem>_edited.<ext>`, or `None` when the upload had no usable name
    pub fn edited_file_name(&self) -> Option<String> {
        let path = Path::new(&self.file_name);
        let stem = path.file_stem()?.to_string_lossy();
        if stem.is_empty() {
            return None;
        }

        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().into_owned(),
            None => self
                .encoded
                .format
                .extensions_str()
                .first()
                .copied()
                .unwrap_or("png")
                .to_string(),
        };

        Some(format!("{stem}_edited.{ext}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn red(file_name: &str) -> EditorResult<SourceImage> {
        SourceImage::from_pixels(file_name, RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn test_from_bytes_decodes_pixels() -> EditorResult<()> {
        let png = red("a.png")?.png_bytes()?;
        let source = SourceImage::from_bytes("copy.png", png)?;

        assert_eq!(source.encoded().format(), ImageFormat::Png);
        assert_eq!(source.pixels().dimensions(), (2, 2));
        assert_eq!(source.pixels().get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert!(source.encoded().data_url().starts_with("data:image/png;base64,"));
        Ok(())
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = SourceImage::from_bytes("bad.png", b"not an image".to_vec()).unwrap_err();
        assert!(matches!(err, crate::logic::EditorError::Decode(_)));
    }

    #[test]
    fn test_edited_file_name() -> EditorResult<()> {
        assert_eq!(
            red("holiday.jpg")?.edited_file_name().as_deref(),
            Some("holiday_edited.jpg")
        );
        assert_eq!(
            red("scan")?.edited_file_name().as_deref(),
            Some("scan_edited.png")
        );
        assert_eq!(red("")?.edited_file_name(), None);
        Ok(())
    }

    #[test]
    fn test_save_reencodes_by_extension() -> EditorResult<()> {
        let dir = tempfile::tempdir()?;
        let encoded = red("a.png")?.encoded().clone();

        let png_path = dir.path().join("out.png");
        encoded.save(&png_path)?;
        assert_eq!(fs::read(&png_path)?, encoded.bytes());

        let jpg_path = dir.path().join("out.jpg");
        encoded.save(&jpg_path)?;
        let reloaded = EncodedImage::from_bytes(fs::read(&jpg_path)?)?;
        assert_eq!(reloaded.format(), ImageFormat::Jpeg);
        assert_eq!(reloaded.decode()?.dimensions(), (2, 2));
        Ok(())
    }
}
