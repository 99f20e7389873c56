use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct APIConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl Default for APIConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5002".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Canonical effect payload: `{ "id": ..., "params": { ... } }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EffectParams {
    pub id: String,
    pub params: IndexMap<String, f64>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProcessUrl<'a> {
    pub image_url: &'a str,
    pub effects: &'a [EffectParams],
    pub preview: bool,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct ProcessById<'a> {
    pub image_id: &'a str,
    pub effects: &'a [EffectParams],
    pub preview: bool,
}
