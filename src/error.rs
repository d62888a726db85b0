//! Error types for the physics world, the scheduler and render submission.

use thiserror::Error;

use crate::body::{BodyId, BodyKind};
use crate::render::DrawKind;

/// Errors raised by the [`World`](crate::World) and the collision dispatcher.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// Every body slot is taken.
    #[error("physics body creation failed because there is no available id to use (capacity {capacity})")]
    WorldFull {
        /// Maximum number of live bodies.
        capacity: usize,
    },

    /// Body id is not registered in this world.
    #[error("physics body id {0} is not registered")]
    UnknownBody(BodyId),

    /// The dispatcher has no contact test for this kind pair.
    #[error("no contact test between {0:?} and {1:?}")]
    UnsupportedPair(BodyKind, BodyKind),

    /// Body extents must be non-negative and finite.
    #[error("invalid body extents ({x}, {y})")]
    InvalidExtents {
        /// Horizontal extent.
        x: f32,
        /// Vertical extent.
        y: f32,
    },

    /// Sub-step count must be positive.
    #[error("invalid sub-step count: {0} (must be positive)")]
    InvalidSubSteps(u32),

    /// A tick-affecting parameter was changed while the world is stepping.
    #[error("attempting to change {setting} while the physics world is running")]
    LockedWhileRunning {
        /// Name of the rejected setting.
        setting: &'static str,
    },

    /// Invalid world configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

impl PhysicsError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }
}

/// Errors raised by the [`Engine`](crate::Engine) scheduler.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// `start` was called before a platform was attached with `init`.
    #[error("attempting to run engine when it is uninitialised")]
    NotInitialized,

    /// A tick-affecting setting was changed while the loop is running.
    #[error("attempting to change {setting} while the engine is still running")]
    LockedWhileRunning {
        /// Name of the rejected setting.
        setting: &'static str,
    },

    /// Tick rate must be positive.
    #[error("invalid tick rate: {0} (must be positive)")]
    InvalidTickRate(u32),

    /// `run_frame` was called with no active scene.
    #[error("no active scene to step")]
    NoScene,

    /// Invalid engine configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// A scene step failed inside the physics world.
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// A scene reported its own failure.
    #[error("scene error: {0}")]
    Scene(String),
}

impl EngineError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }

    /// Check if this error comes from changing a setting at the wrong time.
    #[must_use]
    pub fn is_config_violation(&self) -> bool {
        matches!(
            self,
            Self::LockedWhileRunning { .. } | Self::Physics(PhysicsError::LockedWhileRunning { .. })
        )
    }
}

/// Per-drawable failures, absorbed by the render pass.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// The platform has no draw function for this kind.
    #[error("invalid render type: {0:?}")]
    UnsupportedKind(DrawKind),
}

/// Result alias for physics operations.
pub type PhysicsResult<T> = std::result::Result<T, PhysicsError>;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
