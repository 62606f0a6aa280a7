//! Guided-step overlay.
//!
//! A session walks the user through an ordered list of `{selector,
//! instruction}` steps. Entering a step resolves its target, asks for it to
//! be scrolled into view, and then (after the scroll has settled) keeps
//! re-reading the target's rectangle so the highlight follows reflows. The
//! tracking task is bound to the step: it is cancelled on every transition,
//! on `stop`, and when the overlay is dropped.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::GuideError;
use crate::tree::{Document, NodeId};
use crate::types::BoundingBox;

/// Padding around the target rectangle when drawing the highlight.
pub const HIGHLIGHT_PADDING_PX: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideStep {
    pub selector: String,
    pub instruction: String,
}

impl GuideStep {
    pub fn new(selector: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            instruction: instruction.into(),
        }
    }
}

/// Scroll-settle delay and polling period of the tracking task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideTiming {
    #[serde(with = "humantime_serde")]
    pub scroll_settle: Duration,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl GuideTiming {
    /// A zero poll interval cannot drive a ticker.
    pub fn validate(&self) -> Result<(), GuideError> {
        if self.poll_interval.is_zero() {
            return Err(GuideError::ZeroPollInterval);
        }
        Ok(())
    }
}

impl Default for GuideTiming {
    fn default() -> Self {
        Self {
            scroll_settle: Duration::from_millis(600),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// What the rendering layer draws for the active step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideView {
    pub index: usize,
    pub total: usize,
    pub instruction: String,
    pub target_rect: Option<BoundingBox>,
    pub is_last: bool,
}

impl GuideView {
    pub fn highlight_rect(&self) -> Option<BoundingBox> {
        self.target_rect.map(|r| r.inflate(HIGHLIGHT_PADDING_PX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideState {
    Idle,
    Active(usize),
}

/// Element lookup and position observation the overlay needs from the host.
pub trait DocumentAccessor: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    fn query_selector(&self, selector: &str) -> Option<Self::Handle>;

    /// Current on-screen rectangle; `None` once the element is gone.
    fn rect(&self, handle: &Self::Handle) -> Option<BoundingBox>;

    fn scroll_into_view(&self, handle: &Self::Handle);
}

/// [`DocumentAccessor`] over a [`Document`] that can be updated while a
/// session is running.
#[derive(Debug, Default)]
pub struct SharedDocument {
    document: RwLock<Document>,
    scroll_requests: Mutex<Vec<NodeId>>,
}

impl SharedDocument {
    pub fn new(document: Document) -> Self {
        Self {
            document: RwLock::new(document),
            scroll_requests: Mutex::new(Vec::new()),
        }
    }

    /// Mutates the document in place, e.g. to move an element.
    pub fn update<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let mut doc = self.document.write().unwrap_or_else(|e| e.into_inner());
        f(&mut doc)
    }

    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        let doc = self.document.read().unwrap_or_else(|e| e.into_inner());
        f(&doc)
    }

    /// Nodes that were asked to scroll into view, oldest first.
    pub fn scroll_requests(&self) -> Vec<NodeId> {
        self.scroll_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl DocumentAccessor for SharedDocument {
    type Handle = NodeId;

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.read(|doc| doc.query_selector(selector))
    }

    fn rect(&self, handle: &NodeId) -> Option<BoundingBox> {
        self.read(|doc| (handle.index() < doc.len()).then(|| doc.node(*handle).rect))
    }

    fn scroll_into_view(&self, handle: &NodeId) {
        self.scroll_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*handle);
    }
}

struct Session {
    steps: Vec<GuideStep>,
    index: usize,
}

struct Tracker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub struct GuideOverlay<A: DocumentAccessor> {
    accessor: Arc<A>,
    timing: GuideTiming,
    session: Option<Session>,
    view: Arc<watch::Sender<Option<GuideView>>>,
    // Bumped on every transition; stale trackers compare against it before
    // publishing.
    epoch: Arc<AtomicU64>,
    tracker: Option<Tracker>,
}

impl<A: DocumentAccessor> GuideOverlay<A> {
    pub fn new(accessor: Arc<A>) -> Self {
        let (view, _) = watch::channel(None);
        Self {
            accessor,
            timing: GuideTiming::default(),
            session: None,
            view: Arc::new(view),
            epoch: Arc::new(AtomicU64::new(0)),
            tracker: None,
        }
    }

    pub fn with_timing(mut self, timing: GuideTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn state(&self) -> GuideState {
        match &self.session {
            Some(session) => GuideState::Active(session.index),
            None => GuideState::Idle,
        }
    }

    pub fn view(&self) -> Option<GuideView> {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GuideView>> {
        self.view.subscribe()
    }

    /// True while a tracking task for the current step is alive.
    pub fn is_tracking(&self) -> bool {
        self.tracker
            .as_ref()
            .is_some_and(|t| !t.token.is_cancelled() && !t.handle.is_finished())
    }

    /// Begins a session at the first step. Invalid timing or a failure to
    /// track the first target leaves the overlay idle.
    pub fn start(&mut self, steps: Vec<GuideStep>) -> Result<(), GuideError> {
        if steps.is_empty() {
            return Err(GuideError::EmptySteps);
        }
        if let Err(e) = self.timing.validate() {
            self.stop();
            return Err(e);
        }
        self.session = Some(Session { steps, index: 0 });
        self.enter_step_or_stop()
    }

    /// Moves to the next step; finishing the last step ends the session.
    pub fn advance(&mut self) -> Result<(), GuideError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if session.index + 1 < session.steps.len() {
            session.index += 1;
            self.enter_step_or_stop()
        } else {
            self.stop();
            Ok(())
        }
    }

    pub fn retreat(&mut self) -> Result<(), GuideError> {
        match self.session.as_mut() {
            Some(session) if session.index > 0 => {
                session.index -= 1;
                self.enter_step_or_stop()
            }
            _ => Ok(()),
        }
    }

    pub fn stop(&mut self) {
        self.cancel_tracking();
        if self.session.take().is_some() {
            debug!("guide session stopped");
        }
        self.view.send_replace(None);
    }

    fn cancel_tracking(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        // Dropping the tracker cancels its token.
        self.tracker = None;
    }

    fn enter_step_or_stop(&mut self) -> Result<(), GuideError> {
        let entered = self.enter_step();
        if entered.is_err() {
            self.stop();
        }
        entered
    }

    // Nothing is published until the tracker can be spawned.
    fn enter_step(&mut self) -> Result<(), GuideError> {
        self.cancel_tracking();
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let index = session.index;
        let total = session.steps.len();
        let step = session.steps[index].clone();

        let target = self.accessor.query_selector(&step.selector);
        let runtime = match target {
            Some(_) => {
                Some(tokio::runtime::Handle::try_current().map_err(|_| GuideError::NoRuntime)?)
            }
            None => None,
        };

        self.view.send_replace(Some(GuideView {
            index,
            total,
            instruction: step.instruction.clone(),
            target_rect: None,
            is_last: index + 1 == total,
        }));

        let (Some(target), Some(runtime)) = (target, runtime) else {
            warn!(selector = %step.selector, step = index, "guide step target not found");
            return Ok(());
        };
        self.accessor.scroll_into_view(&target);

        let token = CancellationToken::new();
        let handle = runtime.spawn(track_target(
            Arc::clone(&self.accessor),
            target,
            Arc::clone(&self.view),
            Arc::clone(&self.epoch),
            self.epoch.load(Ordering::SeqCst),
            self.timing,
            token.clone(),
        ));
        self.tracker = Some(Tracker { token, handle });
        debug!(selector = %step.selector, step = index, "tracking guide target");
        Ok(())
    }
}

impl<A: DocumentAccessor> Drop for GuideOverlay<A> {
    fn drop(&mut self) {
        self.cancel_tracking();
    }
}

async fn track_target<A: DocumentAccessor>(
    accessor: Arc<A>,
    target: A::Handle,
    view: Arc<watch::Sender<Option<GuideView>>>,
    epoch: Arc<AtomicU64>,
    own_epoch: u64,
    timing: GuideTiming,
    token: CancellationToken,
) {
    tokio::select! {
        biased;
        _ = token.cancelled() => return,
        _ = tokio::time::sleep(timing.scroll_settle) => {}
    }

    let mut ticker = tokio::time::interval(timing.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let rect = accessor.rect(&target);
                view.send_if_modified(|current| {
                    if epoch.load(Ordering::SeqCst) != own_epoch {
                        return false;
                    }
                    match current {
                        Some(v) if v.target_rect != rect => {
                            v.target_rect = rect;
                            true
                        }
                        _ => false,
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::test_support::SnapshotBuilder;

    fn accessor() -> Arc<SharedDocument> {
        let doc = SnapshotBuilder::default()
            .node("body", "body", None)
            .node("a", "button", Some("body"))
            .rect(BoundingBox::new(10.0, 20.0, 100.0, 30.0))
            .node("b", "input", Some("body"))
            .rect(BoundingBox::new(10.0, 80.0, 200.0, 24.0))
            .build();
        Arc::new(SharedDocument::new(doc))
    }

    fn steps() -> Vec<GuideStep> {
        vec![GuideStep::new("#a", "click"), GuideStep::new("#b", "done")]
    }

    #[test]
    fn empty_step_list_is_rejected() {
        let mut overlay = GuideOverlay::new(accessor());
        assert_eq!(overlay.start(Vec::new()), Err(GuideError::EmptySteps));
        assert_eq!(overlay.state(), GuideState::Idle);
    }

    #[test]
    fn tracking_without_runtime_reports_error() {
        let doc = accessor();
        let mut overlay = GuideOverlay::new(Arc::clone(&doc));
        let views = overlay.subscribe();
        assert_eq!(overlay.start(steps()), Err(GuideError::NoRuntime));
        assert_eq!(overlay.state(), GuideState::Idle);
        assert!(overlay.view().is_none());
        assert!(views.borrow().is_none());
        assert!(doc.scroll_requests().is_empty());
    }

    #[test]
    fn failed_advance_without_runtime_stops_session() {
        let mut overlay = GuideOverlay::new(accessor());
        overlay
            .start(vec![
                GuideStep::new("#missing", "read this"),
                GuideStep::new("#a", "click"),
            ])
            .unwrap();
        assert_eq!(overlay.state(), GuideState::Active(0));

        assert_eq!(overlay.advance(), Err(GuideError::NoRuntime));
        assert_eq!(overlay.state(), GuideState::Idle);
        assert!(overlay.view().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_poll_interval_is_rejected_before_tracking() {
        let mut overlay = GuideOverlay::new(accessor()).with_timing(GuideTiming {
            scroll_settle: Duration::from_millis(10),
            poll_interval: Duration::ZERO,
        });
        assert_eq!(overlay.start(steps()), Err(GuideError::ZeroPollInterval));
        assert_eq!(overlay.state(), GuideState::Idle);
        assert!(overlay.view().is_none());
        assert!(!overlay.is_tracking());
    }

    #[test]
    fn default_timing_is_valid() {
        assert_eq!(GuideTiming::default().validate(), Ok(()));
        let zero = GuideTiming {
            poll_interval: Duration::ZERO,
            ..GuideTiming::default()
        };
        assert_eq!(zero.validate(), Err(GuideError::ZeroPollInterval));
    }

    #[test]
    fn unmatched_step_needs_no_runtime() {
        let mut overlay = GuideOverlay::new(accessor());
        overlay
            .start(vec![GuideStep::new("#missing", "look here")])
            .unwrap();
        assert_eq!(overlay.state(), GuideState::Active(0));
        let view = overlay.view().unwrap();
        assert_eq!(view.target_rect, None);
        assert!(view.is_last);
    }

    #[test]
    fn highlight_is_padded() {
        let view = GuideView {
            index: 0,
            total: 1,
            instruction: "x".into(),
            target_rect: Some(BoundingBox::new(10.0, 10.0, 20.0, 20.0)),
            is_last: true,
        };
        assert_eq!(
            view.highlight_rect(),
            Some(BoundingBox::new(6.0, 6.0, 28.0, 28.0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn advance_twice_returns_to_idle() {
        let mut overlay = GuideOverlay::new(accessor());
        overlay.start(steps()).unwrap();
        assert_eq!(overlay.state(), GuideState::Active(0));
        overlay.advance().unwrap();
        assert_eq!(overlay.state(), GuideState::Active(1));
        assert!(overlay.view().unwrap().is_last);
        overlay.advance().unwrap();
        assert_eq!(overlay.state(), GuideState::Idle);
        assert_eq!(overlay.view(), None);
        assert!(!overlay.is_tracking());
    }

    #[tokio::test(start_paused = true)]
    async fn retreat_at_first_step_is_a_no_op() {
        let mut overlay = GuideOverlay::new(accessor());
        overlay.start(steps()).unwrap();
        overlay.retreat().unwrap();
        assert_eq!(overlay.state(), GuideState::Active(0));
        overlay.advance().unwrap();
        overlay.retreat().unwrap();
        assert_eq!(overlay.state(), GuideState::Active(0));
    }

    #[tokio::test(start_paused = true)]
    async fn rect_appears_after_scroll_settles() {
        let doc = accessor();
        let mut overlay = GuideOverlay::new(Arc::clone(&doc));
        overlay.start(steps()).unwrap();
        assert_eq!(doc.scroll_requests().len(), 1);
        assert_eq!(overlay.view().unwrap().target_rect, None);

        tokio::time::sleep(Duration::from_millis(650)).await;
        assert_eq!(
            overlay.view().unwrap().target_rect,
            Some(BoundingBox::new(10.0, 20.0, 100.0, 30.0))
        );
        assert!(overlay.is_tracking());
    }
}
