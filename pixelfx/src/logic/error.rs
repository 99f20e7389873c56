use image_effect::ImageEffectError;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("no image loaded")]
    NoImage,

    #[error("no active effects")]
    NoActiveEffects,

    #[error("unknown effect `{0}`")]
    UnknownEffect(String),

    #[error("effect `{effect}` has no parameter `{param}`")]
    UnknownParam { effect: String, param: String },

    #[error("effect `{0}` is not active")]
    EffectInactive(String),

    #[error("nothing has been applied yet")]
    NoProcessedImage,

    #[error("Image error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Remote error: {0}")]
    Remote(#[from] fx_client::Error),

    #[error("Effect error: {0}")]
    Effect(#[from] ImageEffectError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// Text shown in the alert dialog
    pub fn user_message(&self) -> String {
        match self {
            EditorError::NoImage => "Please upload an image first".to_string(),
            EditorError::NoActiveEffects => "Please activate at least one effect".to_string(),
            EditorError::NoProcessedImage => {
                "Please apply effects before downloading".to_string()
            }
            EditorError::Decode(_) => "Failed to load image. Please try another file.".to_string(),
            EditorError::Remote(_) | EditorError::Effect(_) => {
                "Failed to process image. Please try again.".to_string()
            }
            EditorError::Io(e) => format!("Failed to save image: {e}"),
            EditorError::UnknownEffect(_)
            | EditorError::UnknownParam { .. }
            | EditorError::EffectInactive(_) => self.to_string(),
        }
    }
}
