use super::{Rendered, SourceImage};
use crate::registry::EffectDefinition;
use fx_client::EffectParams;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    pub id: String,
    pub params: IndexMap<String, f64>,
}

impl ActiveEffect {
    pub fn from_definition(def: &EffectDefinition) -> Self {
        Self {
            id: def.id.clone(),
            params: def.defaults(),
        }
    }

    pub fn value(&self, param: &str) -> Option<f64> {
        self.params.get(param).copied()
    }

    pub fn to_params(&self) -> EffectParams {
        EffectParams {
            id: self.id.clone(),
            params: self.params.clone(),
        }
    }
}

/// Enabled effects in activation order, at most one entry per id
#[derive(Debug, Clone, Default)]
pub struct ActiveEffects {
    items: IndexMap<String, ActiveEffect>,
}

impl ActiveEffects {
    /// Returns `false` when the effect was already active
    pub fn enable(&mut self, def: &EffectDefinition) -> bool {
        if self.items.contains_key(&def.id) {
            return false;
        }

        self.items
            .insert(def.id.clone(), ActiveEffect::from_definition(def));
        true
    }

    pub fn disable(&mut self, id: &str) -> bool {
        self.items.shift_remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&ActiveEffect> {
        self.items.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ActiveEffect> {
        self.items.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn to_vec(&self) -> Vec<ActiveEffect> {
        self.items.values().cloned().collect()
    }
}

#[derive(Debug, Default)]
pub struct EditorState {
    pub source: Option<Arc<SourceImage>>,
    pub active: ActiveEffects,

    /// Last successful apply, the only thing download writes
    pub processed: Option<Rendered>,

    /// What the preview pane shows, `None` means the source itself
    pub preview: Option<Rendered>,

    pub busy: bool,

    /// Bumped by upload and clear, an apply started before a bump is dropped
    pub epoch: u64,
}
