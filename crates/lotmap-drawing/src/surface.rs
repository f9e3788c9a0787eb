//! Map surface collaborator.
//!
//! The drawing session and controller only need two things from the map:
//! a stream of clicks as geographic points, and a way to draw rings with a
//! style. Tiles, popups, and the actual rendering stay on the other side.

use lotmap_core::{DisplayPoint, RingStyle};
use lotmap_geometry::GeoBounds;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Callback receiving one map click as a display-order point.
pub type ClickHandler = Box<dyn Fn(DisplayPoint) + Send + Sync>;

/// Handle for a click subscription. Release it with
/// [`MapSurface::unsubscribe_clicks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClickSubscription(Uuid);

impl ClickSubscription {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClickSubscription {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClickSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Click({})", &self.0.simple().to_string()[..8])
    }
}

/// Drawing layers, cleared independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceLayer {
    Lots,
    Sublots,
    /// Live feedback while drawing.
    Preview,
}

/// Rendering surface for lots, sublots, and the drawing preview.
pub trait MapSurface: Send + Sync {
    /// Registers a click handler. Handlers must not be invoked while the
    /// surface is inside this call.
    fn subscribe_clicks(&self, handler: ClickHandler) -> ClickSubscription;

    /// Returns true if the subscription existed.
    fn unsubscribe_clicks(&self, subscription: ClickSubscription) -> bool;

    /// Draws closed rings (outer first, then holes) on a layer.
    fn draw_rings(&self, layer: SurfaceLayer, rings: &[Vec<DisplayPoint>], style: &RingStyle);

    /// Draws an open line on a layer.
    fn draw_polyline(&self, layer: SurfaceLayer, points: &[DisplayPoint], style: &RingStyle);

    fn clear_layer(&self, layer: SurfaceLayer);

    /// Moves the view so that `bounds` is visible.
    fn fit_bounds(&self, bounds: &GeoBounds);
}

/// A draw call recorded by [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rings {
        layer: SurfaceLayer,
        rings: Vec<Vec<DisplayPoint>>,
        style: RingStyle,
    },
    Polyline {
        layer: SurfaceLayer,
        points: Vec<DisplayPoint>,
        style: RingStyle,
    },
    Clear(SurfaceLayer),
    Fit(GeoBounds),
}

impl DrawCommand {
    pub fn layer(&self) -> Option<SurfaceLayer> {
        match self {
            DrawCommand::Rings { layer, .. }
            | DrawCommand::Polyline { layer, .. }
            | DrawCommand::Clear(layer) => Some(*layer),
            DrawCommand::Fit(_) => None,
        }
    }
}

type SharedHandler = Arc<dyn Fn(DisplayPoint) + Send + Sync>;

/// Surface without a display: records draw calls and lets callers inject
/// clicks. Used by the CLI and by tests.
#[derive(Default)]
pub struct HeadlessSurface {
    handlers: RwLock<HashMap<ClickSubscription, SharedHandler>>,
    commands: Mutex<Vec<DrawCommand>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a click to every subscriber. Returns how many received it.
    pub fn click(&self, point: DisplayPoint) -> usize {
        let handlers: Vec<SharedHandler> = self.handlers.read().values().cloned().collect();
        for handler in &handlers {
            handler(point);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.lock().clone()
    }

    /// Recorded commands for one layer.
    pub fn commands_on(&self, layer: SurfaceLayer) -> Vec<DrawCommand> {
        self.commands
            .lock()
            .iter()
            .filter(|c| c.layer() == Some(layer))
            .cloned()
            .collect()
    }

    /// The last command recorded on a layer.
    pub fn last_on(&self, layer: SurfaceLayer) -> Option<DrawCommand> {
        self.commands
            .lock()
            .iter()
            .rev()
            .find(|c| c.layer() == Some(layer))
            .cloned()
    }

    pub fn clear_commands(&self) {
        self.commands.lock().clear();
    }

    fn record(&self, command: DrawCommand) {
        self.commands.lock().push(command);
    }
}

impl MapSurface for HeadlessSurface {
    fn subscribe_clicks(&self, handler: ClickHandler) -> ClickSubscription {
        let subscription = ClickSubscription::new();
        self.handlers.write().insert(subscription, Arc::from(handler));
        tracing::debug!("Click subscription {} added", subscription);
        subscription
    }

    fn unsubscribe_clicks(&self, subscription: ClickSubscription) -> bool {
        let removed = self.handlers.write().remove(&subscription).is_some();
        if removed {
            tracing::debug!("Click subscription {} removed", subscription);
        }
        removed
    }

    fn draw_rings(&self, layer: SurfaceLayer, rings: &[Vec<DisplayPoint>], style: &RingStyle) {
        self.record(DrawCommand::Rings {
            layer,
            rings: rings.to_vec(),
            style: style.clone(),
        });
    }

    fn draw_polyline(&self, layer: SurfaceLayer, points: &[DisplayPoint], style: &RingStyle) {
        self.record(DrawCommand::Polyline {
            layer,
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    fn clear_layer(&self, layer: SurfaceLayer) {
        self.record(DrawCommand::Clear(layer));
    }

    fn fit_bounds(&self, bounds: &GeoBounds) {
        self.record(DrawCommand::Fit(*bounds));
    }
}

impl std::fmt::Debug for HeadlessSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessSurface")
            .field("subscribers", &self.subscriber_count())
            .field("commands", &self.commands.lock().len())
            .finish()
    }
}
