use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UploadedImage {
    pub id: String,

    /// Base64 copy of the stored image as the server sees it
    #[serde(default)]
    pub image: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct ProcessedImage {
    #[serde(alias = "processed_image")]
    pub image: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Error {
    pub error: String,
}

/// One entry of the `GET /effects` map
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EffectInfo {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub params: Vec<ParamInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub id: String,
    pub name: String,

    /// Widget hint, always `slider` on current backends
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub min: f64,
    pub max: f64,

    #[serde(default = "step_default")]
    pub step: f64,

    pub default: f64,
}

fn step_default() -> f64 {
    1.0
}
