//! Panel projections
//!
//! The primary effect list and the "active effects" list are pure
//! functions of the registry and the editor state, so they can never drift
//! apart.

use super::{ActiveEffect, EditorState};
use crate::registry::{EffectDefinition, EffectRegistry};

#[derive(Debug, Clone, PartialEq)]
pub struct ParamRow {
    pub id: String,
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub params: Vec<ParamRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRow {
    pub id: String,
    pub name: String,
    pub params: Vec<ParamRow>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub primary: Vec<EffectRow>,
    pub active: Vec<ActiveRow>,
    pub active_count: usize,

    /// "No active effects" placeholder
    pub show_placeholder: bool,

    pub has_image: bool,
    pub can_download: bool,
    pub busy: bool,
}

impl Snapshot {
    pub fn build(registry: &EffectRegistry, state: &EditorState) -> Self {
        let active = active_panel(registry, state);

        Self {
            primary: primary_panel(registry, state),
            active_count: active.len(),
            show_placeholder: active.is_empty(),
            active,
            has_image: state.source.is_some(),
            can_download: state.processed.is_some(),
            busy: state.busy,
        }
    }
}

/// Inactive effects show their defaults
fn param_rows(def: &EffectDefinition, active: Option<&ActiveEffect>) -> Vec<ParamRow> {
    def.params
        .iter()
        .map(|spec| ParamRow {
            id: spec.id.clone(),
            name: spec.name.clone(),
            min: spec.min,
            max: spec.max,
            step: spec.step,
            value: active
                .and_then(|effect| effect.value(&spec.id))
                .unwrap_or(spec.default),
        })
        .collect()
}

pub fn primary_panel(registry: &EffectRegistry, state: &EditorState) -> Vec<EffectRow> {
    registry
        .iter()
        .map(|def| {
            let active = state.active.get(&def.id);
            EffectRow {
                id: def.id.clone(),
                name: def.name.clone(),
                description: def.description.clone(),
                enabled: active.is_some(),
                params: param_rows(def, active),
            }
        })
        .collect()
}

pub fn active_panel(registry: &EffectRegistry, state: &EditorState) -> Vec<ActiveRow> {
    state
        .active
        .iter()
        .filter_map(|effect| {
            let def = registry.get(&effect.id)?;
            Some(ActiveRow {
                id: def.id.clone(),
                name: def.name.clone(),
                params: param_rows(def, Some(effect)),
            })
        })
        .collect()
}
