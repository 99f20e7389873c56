//! Effect catalogue
//!
//! The registry is either the built-in set used by the local canvas
//! pipeline, or whatever the processing backend advertises on `/effects`.
//! It is immutable once the editor starts.

use fx_client::EffectInfo;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub id: String,
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl ParamSpec {
    pub fn new(id: &str, name: &str, min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            min,
            max,
            step,
            default,
        }
    }

    /// Clamp into `[min, max]`; non-finite input falls back to the default
    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EffectDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl EffectDefinition {
    pub fn param(&self, id: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.id == id)
    }

    pub fn defaults(&self) -> IndexMap<String, f64> {
        self.params
            .iter()
            .map(|p| (p.id.clone(), p.default))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    effects: IndexMap<String, EffectDefinition>,
}

impl EffectRegistry {
    pub fn new(effects: impl IntoIterator<Item = EffectDefinition>) -> Self {
        Self {
            effects: effects.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    /// Effects understood by the local canvas pipeline
    pub fn builtin() -> Self {
        Self::new([
            EffectDefinition {
                id: "blur".to_string(),
                name: "Blur".to_string(),
                description: "Soften the image with a Gaussian blur".to_string(),
                params: vec![ParamSpec::new("radius", "Radius", 0.0, 20.0, 1.0, 0.0)],
            },
            EffectDefinition {
                id: "brightness".to_string(),
                name: "Brightness".to_string(),
                description: "Scale every channel up or down".to_string(),
                params: vec![ParamSpec::new("value", "Brightness", 0.0, 200.0, 1.0, 100.0)],
            },
            EffectDefinition {
                id: "contrast".to_string(),
                name: "Contrast".to_string(),
                description: "Stretch channels away from mid gray".to_string(),
                params: vec![ParamSpec::new("value", "Contrast", 0.0, 200.0, 1.0, 100.0)],
            },
            EffectDefinition {
                id: "grayscale".to_string(),
                name: "Grayscale".to_string(),
                description: "Blend toward the perceptual luma".to_string(),
                params: vec![ParamSpec::new("intensity", "Intensity", 0.0, 100.0, 1.0, 0.0)],
            },
            EffectDefinition {
                id: "salt_pepper".to_string(),
                name: "Salt & Pepper".to_string(),
                description: "Sprinkle random black and white blocks".to_string(),
                params: vec![
                    ParamSpec::new("noise_level", "Noise Level", 0.0, 0.1, 0.001, 0.02),
                    ParamSpec::new("block_size", "Block Size", 1.0, 5.0, 1.0, 1.0),
                ],
            },
        ])
    }

    /// Build from a `GET /effects` response, keeping the server's order
    pub fn from_remote(effects: IndexMap<String, EffectInfo>) -> Self {
        Self::new(effects.into_iter().map(|(id, info)| EffectDefinition {
            id,
            name: info.name,
            description: info.description,
            params: info
                .params
                .into_iter()
                .map(|p| ParamSpec {
                    id: p.id,
                    name: p.name,
                    min: p.min,
                    max: p.max,
                    step: p.step,
                    default: p.default,
                })
                .collect(),
        }))
    }

    pub async fn fetch(client: &fx_client::Client) -> fx_client::Result<Self> {
        let effects = client.effects().await?;
        log::info!("loaded {} effects from {}", effects.len(), client.config.api_base_url);
        Ok(Self::from_remote(effects))
    }

    pub fn get(&self, id: &str) -> Option<&EffectDefinition> {
        self.effects.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectDefinition> {
        self.effects.values()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
