/*!********************************************************************************************
*
*   fixstep v0.1 - Fixed-timestep scheduler and 2D particle/plane collisions for small games
*
*   DESCRIPTION:
*
*   fixstep drives a game with two nested fixed-timestep accumulators. The outer engine loop steps
*   the active scene a whole number of times per iteration of real time and renders exactly once per
*   iteration. The inner physics world converts the time reported by the scene into fixed sub-steps,
*   each one integrating every body and resolving axis-aligned plane/particle contacts.
*
*   CONFIGURATION:
*
*   feature "debug"
*       Traces log messages when creating and destroying physics bodies and makes strict error
*       handling the engine default: misuse is returned to the caller instead of stopping the loop.
*
*   feature "raylib"
*       Enables the raylib window backend and conversions between raylib and fixstep types.
*
*   feature "serde"
*       Derives Serialize/Deserialize for the configuration types.
*
*
*   LICENSE: zlib/libpng
*
*   This software is provided "as-is", without any express or implied warranty. In no event
*   will the authors be held liable for any damages arising from the use of this software.
*
*   Permission is granted to anyone to use this software for any purpose, including commercial
*   applications, and to alter it and redistribute it freely, subject to the following restrictions:
*
*     1. The origin of this software must not be misrepresented; you must not claim that you
*     wrote the original software. If you use this software in a product, an acknowledgment
*     in the product documentation would be appreciated but is not required.
*
*     2. Altered source versions must be plainly marked as such, and must not be misrepresented
*     as being the original software.
*
*     3. This notice may not be removed or altered from any source distribution.
*
**********************************************************************************************/

pub mod body;
pub mod collision;
pub mod engine;
pub mod error;
pub mod input;
pub mod integrator;
pub mod math;
pub mod platform;
pub mod render;
pub mod scene;
pub mod step;
pub mod world;

#[cfg(feature = "raylib")]
pub mod raylib_platform;

pub use body::{Body, BodyDef, BodyId, BodyKind};
pub use collision::{Contact, CONTACT_CLEARANCE, CONTACT_DAMPING};
pub use engine::{DisplayConfig, Engine, EngineConfig, FrameStats};
pub use error::{EngineError, PhysicsError, PhysicsResult, RenderError, Result};
pub use input::{ButtonState, CallbackId, InputEvent, KeyEvent, MouseEvent};
pub use math::Vector2;
pub use platform::Platform;
pub use render::{Color, DrawKind, Drawable, Rect, Refresh, RenderQueue};
pub use scene::Scene;
pub use step::FixedStep;
pub use world::{World, WorldConfig};

#[cfg(feature = "raylib")]
pub use raylib_platform::RaylibPlatform;

//----------------------------------------------------------------------------------
// Defines and Macros
//----------------------------------------------------------------------------------
pub const DEFAULT_MAX_BODIES:              usize = 64;
pub const DEFAULT_SUB_STEPS:               u32   = 32;
pub const DEFAULT_TICKS_PER_SECOND:        u32   = 60;

pub const DEFAULT_GRAVITY:                 Vector2 = Vector2::new(0.0, 120.0);
pub const DEFAULT_RESTITUTION:             f32     = 0.7;
pub const DEFAULT_STABILIZATION_THRESHOLD: f32     = 1.0;

pub mod prelude {
    pub use crate::{
        Body, BodyDef, BodyId, BodyKind,
        Contact,
        Engine, EngineConfig, DisplayConfig,
        EngineError, PhysicsError,
        InputEvent, KeyEvent, MouseEvent, ButtonState,
        Platform, Scene,
        Color, Refresh, RenderQueue,
        Vector2,
        World, WorldConfig,
    };

    #[cfg(feature = "raylib")]
    pub use crate::RaylibPlatform;
}
