pub mod bounds_2d;
pub mod polygon_2d;
pub mod viewport;

pub use bounds_2d::Bounds2;
pub use viewport::Viewport;

/// Point in view pixel space.
pub type ScreenPoint = nalgebra::Point2<f32>;

/// 3D point in world space.
pub type Point3 = nalgebra::Point3<f32>;

/// Rigid transform (position + orientation) of a tracked plane.
pub type Pose = nalgebra::Isometry3<f32>;
