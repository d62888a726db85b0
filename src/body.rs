//! Physics bodies: moving particles and static planes.

use crate::error::{PhysicsError, PhysicsResult};
use crate::math::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//----------------------------------------------------------------------------------
// Types and Structures Definition
//----------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyKind {
    /// Dynamic body, `position` is its center and `extents` its half size
    #[default]
    Particle,
    /// Static rectangle, `position` is its top-left corner and `extents` its full size
    Plane,
}

/// Identity of a body inside its [`World`](crate::World)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u32);

impl BodyId {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Reference unique identifier
    pub(crate) id: BodyId,
    /// Particle or plane
    pub(crate) kind: BodyKind,
    /// Particle center or plane top-left corner
    pub position: Vector2,
    /// Particle half size or plane full size
    pub(crate) extents: Vector2,
    /// Current velocity, in units per second
    pub velocity: Vector2,
    /// Constant acceleration for the step (gravity if enabled, zero otherwise)
    pub acceleration: Vector2,
    /// Physics body mass
    pub mass: f32,
    /// Apply world gravity to acceleration, fixed at creation
    pub(crate) applies_gravity: bool,
    /// Velocity produced by the previous contact resolution, used to settle jitter
    pub(crate) last_resolved_velocity: Option<Vector2>,
}

/// Creation parameters for a [`Body`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyDef {
    pub kind: BodyKind,
    pub position: Vector2,
    pub extents: Vector2,
    pub velocity: Vector2,
    pub mass: f32,
    pub applies_gravity: bool,
}

impl BodyDef {
    /// A particle centered on `position` with half size `extents`, affected by gravity
    pub fn particle(position: Vector2, extents: Vector2) -> Self {
        Self {
            kind: BodyKind::Particle,
            position,
            extents,
            velocity: Vector2::zero(),
            mass: 1.0,
            applies_gravity: true,
        }
    }

    /// A static plane with top-left corner `position` and full size `size`
    pub fn plane(position: Vector2, size: Vector2) -> Self {
        Self {
            kind: BodyKind::Plane,
            position,
            extents: size,
            velocity: Vector2::zero(),
            mass: 0.0,
            applies_gravity: false,
        }
    }

    #[must_use]
    pub fn velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }

    #[must_use]
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    #[must_use]
    pub fn gravity(mut self, applies_gravity: bool) -> Self {
        self.applies_gravity = applies_gravity;
        self
    }

    /// Checks the extents invariant
    pub fn validate(&self) -> PhysicsResult<()> {
        let Vector2 { x, y } = self.extents;
        if !(x >= 0.0 && y >= 0.0 && x.is_finite() && y.is_finite()) {
            return Err(PhysicsError::InvalidExtents { x, y });
        }
        Ok(())
    }
}

impl Body {
    pub(crate) fn from_def(id: BodyId, def: BodyDef, gravity: Vector2) -> Self {
        // Planes never move, so they never carry gravity
        let applies_gravity = def.applies_gravity && def.kind == BodyKind::Particle;

        Self {
            id,
            kind: def.kind,
            position: def.position,
            extents: def.extents,
            velocity: def.velocity,
            acceleration: if applies_gravity { gravity } else { Vector2::zero() },
            mass: def.mass,
            applies_gravity,
            last_resolved_velocity: None,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn extents(&self) -> Vector2 {
        self.extents
    }

    pub fn applies_gravity(&self) -> bool {
        self.applies_gravity
    }

    pub fn last_resolved_velocity(&self) -> Option<Vector2> {
        self.last_resolved_velocity
    }

    /// Forgets the previous contact resolution, the next contact is treated as a first contact
    pub fn clear_contact_memory(&mut self) {
        self.last_resolved_velocity = None;
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Plane
    }

    /// Axis aligned bounds as `(min, max)` corners
    pub fn bounds(&self) -> (Vector2, Vector2) {
        match self.kind {
            BodyKind::Particle => (self.position - self.extents, self.position + self.extents),
            BodyKind::Plane => (self.position, self.position + self.extents),
        }
    }
}
