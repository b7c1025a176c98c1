mod registry;

pub use registry::PlaneRegistry;

use std::borrow::Cow;

use crate::error::Result;
use crate::math::Pose;

slotmap::new_key_type! {
    /// Opaque identity token of a tracked plane.
    ///
    /// Generational: once a slot is released and reused, the new key never
    /// compares equal to the old one.
    pub struct PlaneId;
}

/// A plane as seen by the overlay.
///
/// The overlay only needs a stable identity and the boundary outline.
/// `boundary` is fallible because reading it may touch data owned by the
/// tracking subsystem; it is only called the first time an identity is seen.
pub trait TrackedPlane {
    /// Identity token, extracted once per plane.
    fn id(&self) -> PlaneId;

    /// Boundary polygon as alternating `(x, z)` scalars in plane-local space.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary data cannot be read.
    fn boundary(&self) -> Result<Cow<'_, [f32]>>;
}

impl<T: TrackedPlane + ?Sized> TrackedPlane for &T {
    fn id(&self) -> PlaneId {
        (**self).id()
    }

    fn boundary(&self) -> Result<Cow<'_, [f32]>> {
        (**self).boundary()
    }
}

/// Owned snapshot of a tracked plane.
#[derive(Debug, Clone)]
pub struct Plane {
    id: PlaneId,
    center_pose: Pose,
    boundary: Vec<f32>,
}

impl Plane {
    /// Creates a plane snapshot at the identity pose.
    #[must_use]
    pub fn new(id: PlaneId, boundary: Vec<f32>) -> Self {
        Self {
            id,
            center_pose: Pose::identity(),
            boundary,
        }
    }

    /// Sets the center pose reported by the tracker.
    #[must_use]
    pub fn with_center_pose(mut self, pose: Pose) -> Self {
        self.center_pose = pose;
        self
    }

    /// Center pose of the plane in world space. Not used for projection.
    #[must_use]
    pub fn center_pose(&self) -> &Pose {
        &self.center_pose
    }
}

impl TrackedPlane for Plane {
    fn id(&self) -> PlaneId {
        self.id
    }

    fn boundary(&self) -> Result<Cow<'_, [f32]>> {
        Ok(Cow::Borrowed(&self.boundary))
    }
}
