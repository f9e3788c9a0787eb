//! # LotMap Drawing
//!
//! Interactive polygon capture on a map surface.
//!
//! [`MapSurface`] is the rendering collaborator: it delivers clicks as
//! display-order points and draws rings with a style. [`DrawingSession`]
//! owns the click subscription while capturing and turns the captured
//! points into a persisted lot geometry.

pub mod error;
pub mod session;
pub mod surface;

pub use error::{DrawingError, DrawingResult};
pub use session::{DrawingPhase, DrawingSession, Preview};
pub use surface::{
    ClickHandler, ClickSubscription, DrawCommand, HeadlessSurface, MapSurface, SurfaceLayer,
};
