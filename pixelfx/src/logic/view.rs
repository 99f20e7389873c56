use super::{Rendered, Snapshot};

/// Binding seam between the editor and whatever draws it
pub trait EditorView: Send + Sync {
    /// Both panels, the count badge and the download button
    fn state_changed(&self, snapshot: &Snapshot);

    /// A remote render is outstanding, dim the previous result
    fn busy(&self, busy: bool);

    /// `None` means show the original source image
    fn preview(&self, rendered: Option<&Rendered>);

    fn alert(&self, message: &str);
}
