//! Editor logic
//!
//! The controller owns a single `EditorState`; both effect panels, the
//! preview and the download button are derived from it.

mod controller;
mod debounce;
mod error;
mod panel;
mod render;
mod source;
mod state;
mod view;

pub use controller::{Editor, EditorOptions};
pub use debounce::{Debouncer, Sequence};
pub use error::{EditorError, EditorResult};
pub use panel::{ActiveRow, EffectRow, ParamRow, Snapshot};
pub use render::{LocalRenderer, RemoteRenderer, RenderJob, Rendered, Renderer};
pub use source::{EncodedImage, SourceImage};
pub use state::{ActiveEffect, ActiveEffects, EditorState};
pub use view::EditorView;
