pub mod canvas;
pub mod clock;
pub mod error;
pub mod math;
pub mod overlay;
pub mod plane;
pub mod sampling;

pub use canvas::{Canvas, PixelCanvas, Rgba};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{OverlayError, Result};
pub use math::{ScreenPoint, Viewport};
pub use overlay::{OverlayParams, OverlayState, UpdateSummary};
pub use plane::{Plane, PlaneId, PlaneRegistry, TrackedPlane};
pub use sampling::{PolygonSampler, SamplerParams};
