//! Effect state controller
//!
//! `Editor` is the single owner of `EditorState`. Every mutation goes
//! through it, refreshes the view, and schedules a debounced preview.
//! The state lock is never held across an `.await`.

use super::{
    Debouncer, EditorError, EditorResult, EditorState, EditorView, EncodedImage, RenderJob,
    Rendered, Renderer, Sequence, Snapshot, SourceImage,
};
use crate::registry::EffectRegistry;
use derive_setters::Setters;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct EditorOptions {
    #[derivative(Default(value = "Duration::from_millis(300)"))]
    pub debounce: Duration,

    /// Used when the upload carried no file name
    #[derivative(Default(value = "\"edited_image.png\".to_string()"))]
    pub default_file_name: String,
}

#[derive(Clone)]
pub struct Editor {
    inner: Arc<Inner>,
}

struct Inner {
    registry: EffectRegistry,
    renderer: Arc<dyn Renderer>,
    view: Arc<dyn EditorView>,
    options: EditorOptions,
    state: Mutex<EditorState>,
    debouncer: Debouncer,
    sequence: Sequence,
}

impl Editor {
    pub fn new(
        registry: EffectRegistry,
        renderer: Arc<dyn Renderer>,
        view: Arc<dyn EditorView>,
        options: EditorOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                renderer,
                view,
                debouncer: Debouncer::new(options.debounce),
                options,
                state: Mutex::new(EditorState::default()),
                sequence: Sequence::default(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.inner.registry
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state();
        Snapshot::build(&self.inner.registry, &state)
    }

    pub fn preview_image(&self) -> Option<Rendered> {
        self.state().preview.clone()
    }

    pub fn processed_image(&self) -> Option<Rendered> {
        self.state().processed.clone()
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        self.inner.view.state_changed(&snapshot);
    }

    fn set_busy(&self, busy: bool) {
        self.state().busy = busy;
        self.inner.view.busy(busy);
    }

    fn fail<T>(&self, err: EditorError) -> EditorResult<T> {
        log::warn!("{err}");
        self.inner.view.alert(&err.user_message());
        Err(err)
    }

    /// Replace the source image. Active effects are kept and re-previewed;
    /// any applied result is invalidated.
    pub async fn upload(&self, source: SourceImage) -> EditorResult<()> {
        let source = match self.inner.renderer.prepare(source).await {
            Ok(source) => source,
            Err(e) => return self.fail(e),
        };

        log::info!(
            "loaded {} ({}x{})",
            source.file_name(),
            source.pixels().width(),
            source.pixels().height()
        );

        self.reset_preview();

        let has_effects = {
            let mut state = self.state();
            state.source = Some(Arc::new(source));
            state.processed = None;
            state.epoch += 1;
            !state.active.is_empty()
        };

        self.notify();

        if has_effects {
            self.schedule_preview();
        }

        Ok(())
    }

    pub async fn load_file(&self, path: &Path) -> EditorResult<()> {
        match SourceImage::open(path) {
            Ok(source) => self.upload(source).await,
            Err(e) => self.fail(e),
        }
    }

    /// Enabling an active effect or disabling an inactive one is a no-op
    pub fn toggle_effect(&self, id: &str, enabled: bool) -> EditorResult<()> {
        let Some(def) = self.inner.registry.get(id) else {
            return self.fail(EditorError::UnknownEffect(id.to_string()));
        };

        let changed = {
            let mut state = self.state();
            if enabled {
                state.active.enable(def)
            } else {
                state.active.disable(id)
            }
        };

        if changed {
            log::debug!("{} {id}", if enabled { "enabled" } else { "disabled" });
            self.after_change();
        }

        Ok(())
    }

    pub fn remove_effect(&self, id: &str) -> EditorResult<()> {
        self.toggle_effect(id, false)
    }

    /// Store a slider value, returning it after clamping
    pub fn set_param(&self, id: &str, param: &str, value: f64) -> EditorResult<f64> {
        let Some(def) = self.inner.registry.get(id) else {
            return self.fail(EditorError::UnknownEffect(id.to_string()));
        };

        let Some(spec) = def.param(param) else {
            return self.fail(EditorError::UnknownParam {
                effect: id.to_string(),
                param: param.to_string(),
            });
        };

        let value = spec.clamp(value);

        let stored = {
            let mut state = self.state();
            match state.active.get_mut(id) {
                Some(effect) => {
                    effect.params.insert(param.to_string(), value);
                    true
                }
                None => false,
            }
        };

        if !stored {
            return self.fail(EditorError::EffectInactive(id.to_string()));
        }

        self.after_change();
        Ok(value)
    }

    pub fn clear(&self) {
        self.reset_preview();

        {
            let mut state = self.state();
            state.active.clear();
            state.processed = None;
            state.epoch += 1;
        }

        self.notify();
    }

    fn after_change(&self) {
        let (empty, has_source) = {
            let state = self.state();
            (state.active.is_empty(), state.source.is_some())
        };

        if empty {
            self.reset_preview();
        } else if has_source {
            self.schedule_preview();
        }

        self.notify();
    }

    /// Drop pending and in-flight previews and show the source again
    fn reset_preview(&self) {
        self.inner.debouncer.cancel();
        self.inner.sequence.next();
        self.state().preview = None;
        self.set_busy(false);
        self.inner.view.preview(None);
    }

    /// Drop a scheduled preview that has not started yet
    pub fn cancel_pending_preview(&self) {
        self.inner.debouncer.cancel();
    }

    fn schedule_preview(&self) {
        let editor = self.clone();
        self.inner
            .debouncer
            .schedule(async move { editor.preview().await });
    }

    fn job(&self, only: Option<&str>, preview: bool) -> EditorResult<(RenderJob, u64)> {
        let state = self.state();
        let source = state.source.clone().ok_or(EditorError::NoImage)?;

        let effects = match only {
            Some(id) => vec![
                state
                    .active
                    .get(id)
                    .cloned()
                    .ok_or_else(|| EditorError::EffectInactive(id.to_string()))?,
            ],
            None => state.active.to_vec(),
        };

        if effects.is_empty() {
            return Err(EditorError::NoActiveEffects);
        }

        let job = RenderJob {
            source,
            effects,
            preview,
        };
        Ok((job, state.epoch))
    }

    /// Render a preview right away. Failures only get logged and the
    /// previous preview stays on screen.
    pub async fn preview(&self) {
        let Ok((job, _)) = self.job(None, true) else {
            return;
        };

        let seq = self.inner.sequence.next();
        self.set_busy(true);

        let result = self.inner.renderer.render(job).await;
        if !self.inner.sequence.is_current(seq) {
            log::debug!("discard stale preview #{seq}");
            return;
        }

        self.set_busy(false);

        match result {
            Ok(rendered) => {
                self.state().preview = Some(rendered.clone());
                self.inner.view.preview(Some(&rendered));
            }
            Err(e) => log::warn!("preview failed: {e}"),
        }
    }

    /// Render every active effect at full size and enable download. A result
    /// that lands after an upload or clear is returned but not kept.
    pub async fn apply(&self) -> EditorResult<EncodedImage> {
        self.apply_with(None).await
    }

    /// Render a single active effect on its own
    pub async fn apply_single(&self, id: &str) -> EditorResult<EncodedImage> {
        if self.inner.registry.get(id).is_none() {
            return self.fail(EditorError::UnknownEffect(id.to_string()));
        }
        self.apply_with(Some(id)).await
    }

    async fn apply_with(&self, only: Option<&str>) -> EditorResult<EncodedImage> {
        let (job, epoch) = match self.job(only, false) {
            Ok(job) => job,
            Err(e) => return self.fail(e),
        };

        let seq = self.inner.sequence.next();
        self.set_busy(true);

        let result = self.inner.renderer.render(job).await;
        let current = self.inner.sequence.is_current(seq);
        if current {
            self.set_busy(false);
        }

        let rendered = match result {
            Ok(rendered) => rendered,
            Err(e) => return self.fail(e),
        };

        {
            let mut state = self.state();
            if state.epoch != epoch {
                log::debug!("discard apply #{seq}, image or effects were reset");
                return Ok(rendered.image);
            }

            state.processed = Some(rendered.clone());
            if current {
                state.preview = Some(rendered.clone());
            }
        }

        if current {
            self.inner.view.preview(Some(&rendered));
        }
        self.notify();

        Ok(rendered.image)
    }

    /// Write the applied result. Without `path` the file is named after the
    /// upload, `<stem>_edited.<ext>`, in the working directory.
    pub fn download(&self, path: Option<&Path>) -> EditorResult<PathBuf> {
        let (processed, edited_name) = {
            let state = self.state();
            (
                state.processed.clone(),
                state
                    .source
                    .as_ref()
                    .and_then(|source| source.edited_file_name()),
            )
        };

        let Some(processed) = processed else {
            return self.fail(EditorError::NoProcessedImage);
        };

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(
                edited_name.unwrap_or_else(|| self.inner.options.default_file_name.clone()),
            ),
        };

        if let Err(e) = processed.image.save(&path) {
            return self.fail(e);
        }

        Ok(path)
    }
}
