//! Scenes driven by the engine loop.

use crate::error::Result;
use crate::input::{KeyEvent, MouseEvent};
use crate::render::RenderQueue;

/// The active scene of an [`Engine`](crate::Engine)
///
/// `step` runs once per fixed tick and is expected to feed the tick's duration to its physics world.
/// `draw` runs once per frame and queues this frame's drawables.
pub trait Scene {
    /// Advances the scene by one tick
    fn step(&mut self) -> Result<()>;

    /// Queues the scene's drawables for this frame
    fn draw(&mut self, queue: &mut RenderQueue);

    /// Called for every key event, after the engine's key callbacks
    fn on_key_event(&mut self, _event: &KeyEvent) {}

    /// Called for every mouse event, after the engine's mouse callbacks
    fn on_mouse_event(&mut self, _event: &MouseEvent) {}
}
