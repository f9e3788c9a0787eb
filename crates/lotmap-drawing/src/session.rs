//! Interactive polygon capture.
//!
//! ```text
//!   Idle ──start()──▶ Capturing ──request_commit()──▶ AwaitingCommit
//!    ▲                   │  ▲ add_point / undo_point         │
//!    │                   │  └────────────────────────────────┤ commit() failed
//!    ├────cancel()───────┘                                   │
//!    ├────cancel()───────────────────────────────────────────┤
//!    └────commit() ok────────────────────────────────────────┘
//! ```
//!
//! The session owns the map click subscription while Capturing and releases
//! it on every exit: `request_commit`, `cancel`, and pre-emption by a new
//! `start`. Each start bumps an epoch so a click handler or in-flight
//! commit from an earlier session can never touch the current one.

use lotmap_core::{
    save_lot_geometry, DisplayPoint, GeometryError, LotId, LotStore, LotTarget, Polygon,
    RingStyle,
};
use lotmap_geometry::to_wire_ring;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{DrawingError, DrawingResult};
use crate::surface::{ClickSubscription, MapSurface, SurfaceLayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawingPhase {
    Idle,
    Capturing,
    AwaitingCommit,
}

impl fmt::Display for DrawingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawingPhase::Idle => write!(f, "idle"),
            DrawingPhase::Capturing => write!(f, "capturing"),
            DrawingPhase::AwaitingCommit => write!(f, "awaiting commit"),
        }
    }
}

/// Live feedback for the captured points.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Fewer than 2 points.
    None,
    /// Exactly 2 points.
    Line(Vec<DisplayPoint>),
    /// 3 or more points; savable.
    Polygon(Vec<DisplayPoint>),
}

impl Preview {
    pub fn from_points(points: &[DisplayPoint]) -> Self {
        match points.len() {
            0 | 1 => Preview::None,
            2 => Preview::Line(points.to_vec()),
            _ => Preview::Polygon(points.to_vec()),
        }
    }

    fn render(&self, surface: &dyn MapSurface, style: &RingStyle) {
        surface.clear_layer(SurfaceLayer::Preview);
        match self {
            Preview::None => {}
            Preview::Line(points) => surface.draw_polyline(SurfaceLayer::Preview, points, style),
            Preview::Polygon(points) => {
                surface.draw_rings(SurfaceLayer::Preview, std::slice::from_ref(points), style)
            }
        }
    }
}

#[derive(Debug)]
struct SessionState {
    phase: DrawingPhase,
    points: Vec<DisplayPoint>,
    subscription: Option<ClickSubscription>,
    epoch: u64,
    commit_in_flight: bool,
    /// Lot created by an earlier commit attempt whose geometry update failed.
    created_lot: Option<LotId>,
}

impl SessionState {
    fn transition_error(&self, action: &'static str) -> DrawingError {
        DrawingError::InvalidTransition {
            phase: self.phase,
            action,
        }
    }

    /// Appends a point while capturing in `epoch`. Returns the new preview.
    fn append(&mut self, epoch: u64, point: DisplayPoint) -> DrawingResult<Preview> {
        if self.epoch != epoch || self.phase != DrawingPhase::Capturing {
            return Err(self.transition_error("add a point"));
        }
        if !point.is_finite() {
            return Err(GeometryError::NonFinite {
                index: self.points.len(),
            }
            .into());
        }
        self.points.push(point);
        Ok(Preview::from_points(&self.points))
    }
}

/// Single-slot drawing session.
///
/// There is one session per map: calling [`start`](Self::start) while a
/// session is Capturing or AwaitingCommit cancels it first.
pub struct DrawingSession {
    surface: Arc<dyn MapSurface>,
    state: Arc<Mutex<SessionState>>,
    preview_style: RingStyle,
}

impl DrawingSession {
    pub fn new(surface: Arc<dyn MapSurface>, preview_style: RingStyle) -> Self {
        Self {
            surface,
            state: Arc::new(Mutex::new(SessionState {
                phase: DrawingPhase::Idle,
                points: Vec::new(),
                subscription: None,
                epoch: 0,
                commit_in_flight: false,
                created_lot: None,
            })),
            preview_style,
        }
    }

    pub fn phase(&self) -> DrawingPhase {
        self.state.lock().phase
    }

    /// True while Capturing or AwaitingCommit.
    pub fn is_active(&self) -> bool {
        self.phase() != DrawingPhase::Idle
    }

    pub fn points(&self) -> Vec<DisplayPoint> {
        self.state.lock().points.clone()
    }

    pub fn preview(&self) -> Preview {
        Preview::from_points(&self.state.lock().points)
    }

    pub fn is_commit_in_flight(&self) -> bool {
        self.state.lock().commit_in_flight
    }

    /// Lot already created by a failed commit of this session. The next
    /// commit attaches the polygon to it whatever target it is given.
    pub fn created_lot(&self) -> Option<LotId> {
        self.state.lock().created_lot
    }

    /// Starts capturing. Returns true if an active session was cancelled
    /// to make room.
    pub fn start(&self) -> bool {
        let pre_empted = self.cancel();

        let mut state = self.state.lock();
        state.epoch += 1;
        state.phase = DrawingPhase::Capturing;
        state.points.clear();
        state.created_lot = None;

        let epoch = state.epoch;
        let weak_state = Arc::downgrade(&self.state);
        let weak_surface = Arc::downgrade(&self.surface);
        let style = self.preview_style.clone();

        // Subscribed under the lock so a concurrent cancel cannot miss it.
        state.subscription = Some(self.surface.subscribe_clicks(Box::new(move |point| {
            on_click(&weak_state, &weak_surface, &style, epoch, point);
        })));

        tracing::debug!("Drawing session {} started", epoch);
        pre_empted
    }

    /// Appends a vertex. Returns the number of captured points.
    pub fn add_point(&self, point: DisplayPoint) -> DrawingResult<usize> {
        let (preview, count) = {
            let mut state = self.state.lock();
            let epoch = state.epoch;
            let preview = state.append(epoch, point)?;
            (preview, state.points.len())
        };
        preview.render(self.surface.as_ref(), &self.preview_style);
        Ok(count)
    }

    /// Removes the last captured vertex. No-op when nothing is captured or
    /// the session is not Capturing.
    pub fn undo_point(&self) -> Option<DisplayPoint> {
        let (removed, preview) = {
            let mut state = self.state.lock();
            if state.phase != DrawingPhase::Capturing {
                return None;
            }
            let removed = state.points.pop()?;
            (removed, Preview::from_points(&state.points))
        };
        preview.render(self.surface.as_ref(), &self.preview_style);
        Some(removed)
    }

    /// Closes the capture and waits for a commit decision.
    ///
    /// Requires at least 3 points forming a conforming ring. On error the
    /// session stays Capturing. On success the click subscription is
    /// released; returns the polygon that [`commit`](Self::commit) will save.
    pub fn request_commit(&self) -> DrawingResult<Polygon> {
        let mut state = self.state.lock();
        if state.phase != DrawingPhase::Capturing {
            return Err(state.transition_error("request a commit"));
        }
        if state.points.len() < 3 {
            return Err(DrawingError::NotEnoughPoints {
                have: state.points.len(),
            });
        }

        let ring = to_wire_ring(&state.points);
        ring.validate()?;

        if let Some(subscription) = state.subscription.take() {
            self.surface.unsubscribe_clicks(subscription);
        }
        state.phase = DrawingPhase::AwaitingCommit;
        tracing::debug!(
            "Drawing session {} awaiting commit with {} points",
            state.epoch,
            state.points.len()
        );
        Ok(Polygon::from_ring(ring))
    }

    /// Persists the captured polygon on `target` through
    /// [`save_lot_geometry`].
    ///
    /// Only one commit may be in flight. On success the session returns to
    /// Idle; on failure it stays AwaitingCommit with its points so the
    /// commit can be retried. When a new lot was created but its geometry
    /// was not saved, retries update that lot instead of creating another.
    /// If the session is cancelled or restarted while the store call is
    /// pending, the result is returned but the new state is left alone.
    pub async fn commit(&self, store: &dyn LotStore, target: &LotTarget) -> DrawingResult<LotId> {
        let (epoch, polygon, target) = {
            let mut state = self.state.lock();
            if state.phase != DrawingPhase::AwaitingCommit {
                return Err(state.transition_error("commit"));
            }
            if state.commit_in_flight {
                return Err(DrawingError::CommitInFlight);
            }
            state.commit_in_flight = true;
            let target = match state.created_lot {
                Some(lot_id) => LotTarget::Existing(lot_id),
                None => target.clone(),
            };
            (
                state.epoch,
                Polygon::from_ring(to_wire_ring(&state.points)),
                target,
            )
        };

        let guard = InFlight {
            state: self.state.as_ref(),
            epoch,
        };
        let result = save_lot_geometry(store, &target, &polygon).await;
        drop(guard);

        let mut state = self.state.lock();
        if state.epoch != epoch {
            tracing::debug!("Drawing session {} ended before its commit returned", epoch);
            return result.map_err(DrawingError::from);
        }

        match result {
            Ok(lot_id) => {
                state.phase = DrawingPhase::Idle;
                state.points.clear();
                state.created_lot = None;
                drop(state);
                self.surface.clear_layer(SurfaceLayer::Preview);
                tracing::debug!("Drawing session {} committed to lot {}", epoch, lot_id);
                Ok(lot_id)
            }
            Err(err) => {
                if let Some(lot_id) = err.created_lot_id() {
                    state.created_lot = Some(lot_id);
                }
                tracing::debug!("Drawing session {} commit failed: {}", epoch, err);
                Err(err.into())
            }
        }
    }

    /// Discards the captured points and releases the click subscription
    /// without any store call. Returns false if the session was Idle.
    pub fn cancel(&self) -> bool {
        let subscription = {
            let mut state = self.state.lock();
            if state.phase == DrawingPhase::Idle {
                return false;
            }
            state.phase = DrawingPhase::Idle;
            state.points.clear();
            state.commit_in_flight = false;
            state.created_lot = None;
            state.epoch += 1;
            state.subscription.take()
        };

        if let Some(subscription) = subscription {
            self.surface.unsubscribe_clicks(subscription);
        }
        self.surface.clear_layer(SurfaceLayer::Preview);
        tracing::debug!("Drawing session cancelled");
        true
    }
}

impl Drop for DrawingSession {
    fn drop(&mut self) {
        if let Some(subscription) = self.state.lock().subscription.take() {
            self.surface.unsubscribe_clicks(subscription);
        }
    }
}

impl fmt::Debug for DrawingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DrawingSession")
            .field("phase", &state.phase)
            .field("points", &state.points.len())
            .field("epoch", &state.epoch)
            .finish()
    }
}

/// Clears the in-flight flag when a commit finishes or its future is
/// dropped, unless the session has moved on.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    epoch: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.epoch == self.epoch {
            state.commit_in_flight = false;
        }
    }
}

fn on_click(
    state: &Weak<Mutex<SessionState>>,
    surface: &Weak<dyn MapSurface>,
    style: &RingStyle,
    epoch: u64,
    point: DisplayPoint,
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let preview = match state.lock().append(epoch, point) {
        Ok(preview) => preview,
        Err(err) => {
            tracing::debug!("Ignoring map click: {}", err);
            return;
        }
    };
    if let Some(surface) = surface.upgrade() {
        preview.render(surface.as_ref(), style);
    }
}
