mod apply;
mod audit;
mod contrast;
mod guide;
mod summarize;

use std::path::Path;

use shadowlight_lib::{Document, DomSnapshot, Result};

pub use apply::run_apply;
pub use audit::run_audit;
pub use contrast::run_contrast;
pub use guide::run_guide;
pub use summarize::run_summarize;

/// Reads and validates a DOM snapshot file.
fn load_document(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)?;
    let snapshot: DomSnapshot = serde_json::from_str(&content)?;
    tracing::debug!(path = %path.display(), nodes = snapshot.nodes.len(), "snapshot loaded");
    Document::from_snapshot(snapshot)
}
