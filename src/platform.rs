//! The window, clock and input source the engine runs on.

use crate::error::RenderError;
use crate::input::InputEvent;
use crate::render::{Drawable, Rect};

/// Display, input and timing services consumed by the [`Engine`](crate::Engine)
pub trait Platform {
    /// Monotonic time in milliseconds
    fn now_ms(&mut self) -> f64;

    /// Appends every event received since the last call
    fn poll_events(&mut self, events: &mut Vec<InputEvent>);

    /// Draws one queued item and returns its screen bounds
    ///
    /// Kinds the platform has no draw function for are reported with [`RenderError::UnsupportedKind`].
    fn draw(&mut self, item: &Drawable) -> Result<Rect, RenderError>;

    /// Ends the frame, `region` is the part of the screen that changed
    fn present(&mut self, region: Option<Rect>);

    /// Shows a blocking error message to the user
    fn notify_error(&mut self, message: &str);

    /// Releases the window once the engine loop has ended
    fn shutdown(&mut self) {}
}
