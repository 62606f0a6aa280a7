//! ShadowLight Library
//!
//! Accessibility contrast remediation for rendered documents, plus a guided
//! step-by-step overlay and an assistant backed by a hosted completion
//! service.
//!
//! # Module Overview
//!
//! - [`color`] - Color parsing, relative luminance, contrast ratio
//! - [`tree`] - Node-accessor traits and the snapshot-backed [`Document`]
//! - [`background`] - Effective background resolution
//! - [`remediation`] - The auto-fix pass and its revert
//! - [`mode`] - Per-site accessibility mode controller
//! - [`guide`] - Guided-step overlay with cancellable position tracking
//! - [`completion`] / [`assistant`] - Completion service client and requests
//! - [`config`] - Configuration file support
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use shadowlight_lib::{AccessibilityMode, Document, DomSnapshot, MemoryStore, ModeController};
//!
//! # fn example(snapshot: DomSnapshot) -> shadowlight_lib::Result<()> {
//! let mut doc = Document::from_snapshot(snapshot)?;
//! let mut controller = ModeController::new("example.com", MemoryStore::new());
//! controller.set_mode(&mut doc, AccessibilityMode::AutoFix);
//! println!("{} nodes now carry forced colors", doc.override_count());
//! # Ok(())
//! # }
//! ```

pub mod assistant;
pub mod background;
pub mod color;
pub mod completion;
pub mod config;
pub mod error;
pub mod guide;
pub mod mode;
pub mod output;
pub mod remediation;
pub mod selector;
pub mod store;
pub mod stylesheet;
pub mod tree;
pub mod types;

pub use assistant::Assistant;
pub use background::effective_background;
pub use color::{adjust_for_contrast, contrast_ratio, parse_color, relative_luminance, Color};
pub use completion::{ChatMessage, CompletionService, OpenAiCompatibleClient, Role};
pub use config::Config;
pub use error::{CompletionError, GuideError, Result, ShadowError};
pub use guide::{
    DocumentAccessor, GuideOverlay, GuideState, GuideStep, GuideTiming, GuideView, SharedDocument,
};
pub use mode::{AccessibilityMode, ActiveOverride, ModeController};
pub use output::{
    ApplyOutput, AuditFinding, AuditOutput, ContrastOutput, ErrorOutput, GuideOutput,
    ShadowOutput, SummarizeOutput, SHADOWLIGHT_OUTPUT_VERSION,
};
pub use remediation::{audit, remediate, revert, ContrastCheck, ContrastThresholds, RemediationReport};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use tree::{Document, NodeAccess, NodeId, NodeMutate};
pub use types::{BoundingBox, ComputedStyle, DomNode, DomSnapshot, StyleOverrides};
