//! [`Platform`] implementation on top of a raylib window.

use raylib::prelude::*;
use tracing::{error, info};

use crate::engine::DisplayConfig;
use crate::error::RenderError;
use crate::input::{ButtonState, InputEvent, KeyEvent, MouseEvent};
use crate::platform::Platform;
use crate::render::{self, DrawKind, Drawable, Rect};

/// Size of the checkerboard drawn for textures, there is no texture bank
const PLACEHOLDER_SIZE: f32 = 50.0;

const MOUSE_BUTTONS: [MouseButton; 3] = [
    MouseButton::MOUSE_BUTTON_LEFT,
    MouseButton::MOUSE_BUTTON_RIGHT,
    MouseButton::MOUSE_BUTTON_MIDDLE,
];

pub struct RaylibPlatform {
    rl: RaylibHandle,
    thread: RaylibThread,
    /// Items accepted by `draw`, rendered by `present`
    frame: Vec<(Drawable, Rect)>,
}

impl RaylibPlatform {
    /// Opens a window described by `display`
    pub fn new(display: &DisplayConfig) -> Self {
        let (width, height) = display.resolution;
        let mut builder = raylib::init();
        builder
            .size(width as i32, height as i32)
            .title(&display.title);
        if display.vsync {
            builder.vsync();
        }
        if display.fullscreen {
            builder.fullscreen();
        }
        if display.borderless {
            builder.undecorated();
        }

        let (rl, thread) = builder.build();
        info!(width, height, "opened window");

        Self { rl, thread, frame: Vec::new() }
    }

    pub fn handle(&self) -> &RaylibHandle {
        &self.rl
    }
}

impl Platform for RaylibPlatform {
    fn now_ms(&mut self) -> f64 {
        self.rl.get_time()*1e3
    }

    fn poll_events(&mut self, events: &mut Vec<InputEvent>) {
        if self.rl.window_should_close() {
            events.push(InputEvent::Quit);
            return;
        }

        while let Some(key) = self.rl.get_key_pressed() {
            events.push(InputEvent::Key(KeyEvent {
                key: key as u32,
                state: ButtonState::Pressed,
            }));
        }

        let position = self.rl.get_mouse_position();
        for button in MOUSE_BUTTONS {
            let state = if self.rl.is_mouse_button_pressed(button) {
                ButtonState::Pressed
            } else if self.rl.is_mouse_button_released(button) {
                ButtonState::Released
            } else {
                continue;
            };

            events.push(InputEvent::Mouse(MouseEvent {
                button: button as u32,
                state,
                position: position.into(),
            }));
        }
    }

    fn draw(&mut self, item: &Drawable) -> Result<Rect, RenderError> {
        let bounds = match item.kind {
            DrawKind::Rect | DrawKind::Ellipse => item.bounds().ok_or(RenderError::UnsupportedKind(item.kind))?,
            DrawKind::Texture => {
                let width = if item.size.x > 0.0 { item.size.x } else { PLACEHOLDER_SIZE };
                let height = if item.size.y > 0.0 { item.size.y } else { PLACEHOLDER_SIZE };
                Rect::new(item.position.x, item.position.y, width, height)
            }
        };

        self.frame.push((item.clone(), bounds));
        Ok(bounds)
    }

    fn present(&mut self, _region: Option<Rect>) {
        // raylib redraws the whole back buffer every frame
        let mut d = self.rl.begin_drawing(&self.thread);
        d.clear_background(Color::BLACK);

        for (item, bounds) in self.frame.drain(..) {
            match item.kind {
                DrawKind::Rect => {
                    let rect = Rectangle::new(bounds.x, bounds.y, bounds.width, bounds.height);
                    if let Some(fill) = item.fill {
                        d.draw_rectangle_rec(rect, Color::from(fill));
                    }
                    if item.outline_width > 0.0 {
                        d.draw_rectangle_lines_ex(rect, item.outline_width, Color::from(item.outline));
                    }
                }
                DrawKind::Ellipse => {
                    let (cx, cy) = (item.position.x as i32, item.position.y as i32);
                    if let Some(fill) = item.fill {
                        d.draw_ellipse(cx, cy, item.size.x, item.size.y, Color::from(fill));
                    }
                    if item.outline_width > 0.0 {
                        d.draw_ellipse_lines(cx, cy, item.size.x, item.size.y, Color::from(item.outline));
                    }
                }
                DrawKind::Texture => {
                    let half_w = bounds.width/2.0;
                    let half_h = bounds.height/2.0;
                    for (i, (dx, dy)) in [(0.0, 0.0), (half_w, 0.0), (0.0, half_h), (half_w, half_h)].into_iter().enumerate() {
                        let colour = if i == 0 || i == 3 { render::Color::MISSING } else { render::Color::BLACK };
                        d.draw_rectangle_rec(
                            Rectangle::new(bounds.x + dx, bounds.y + dy, half_w, half_h),
                            Color::from(colour),
                        );
                    }
                }
            }
        }
    }

    fn notify_error(&mut self, message: &str) {
        // no native message box, the log is the user-facing channel
        error!("{message}");
    }

    fn shutdown(&mut self) {
        self.frame.clear();
        info!("closing window");
    }
}
