//! Render submission: drawables queued by scenes and drained once per frame.

use crate::math::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//----------------------------------------------------------------------------------
// Types and Structures Definition
//----------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    /// Magenta used by the missing texture placeholder
    pub const MISSING: Color = Color::rgb(255, 16, 240);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[cfg(feature = "raylib")]
impl From<Color> for raylib::prelude::Color {
    fn from(c: Color) -> Self {
        raylib::prelude::Color::new(c.r, c.g, c.b, c.a)
    }
}

/// Axis aligned screen region
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        Rect {
            x: left,
            y: top,
            width: self.right().max(other.right()) - left,
            height: self.bottom().max(other.bottom()) - top,
        }
    }
}

/// Unions two optional regions, either side may be absent
pub fn combine_regions(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DrawKind {
    Rect,
    Ellipse,
    Texture,
}

/// One queued draw request
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub kind: DrawKind,
    /// Top-left corner for rects and textures, center for ellipses
    pub position: Vector2,
    /// Width/height for rects and textures, radii for ellipses. Zero keeps a texture's own size.
    pub size: Vector2,
    /// Fill colour, [`None`] draws the outline only
    pub fill: Option<Color>,
    pub outline: Color,
    pub outline_width: f32,
    /// Texture id for [`DrawKind::Texture`]
    pub texture: Option<String>,
    /// Allow the platform to keep a resized copy of the texture
    pub cache: bool,
    /// Include this item's bounds in the refresh region
    pub affects_region: bool,
}

impl Drawable {
    fn new(kind: DrawKind, position: Vector2, size: Vector2) -> Self {
        Self {
            kind,
            position,
            size,
            fill: None,
            outline: Color::BLACK,
            outline_width: 0.0,
            texture: None,
            cache: true,
            affects_region: true,
        }
    }

    /// Unfilled one pixel outline of `rect`
    pub fn outline(rect: Rect, colour: Color) -> Self {
        let mut item = Drawable::new(DrawKind::Rect, Vector2::new(rect.x, rect.y), Vector2::new(rect.width, rect.height));
        item.outline = colour;
        item.outline_width = 1.0;
        item.affects_region = false;
        item
    }

    /// Screen bounds for geometry-only kinds, textures depend on the loaded image
    pub fn bounds(&self) -> Option<Rect> {
        match self.kind {
            DrawKind::Rect => Some(Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)),
            DrawKind::Ellipse => {
                let rx = self.size.x + self.outline_width;
                let ry = self.size.y + self.outline_width;
                Some(Rect::new(self.position.x - rx, self.position.y - ry, rx*2.0, ry*2.0))
            }
            DrawKind::Texture => None,
        }
    }
}

/// What the screen is cleared with by [`RenderQueue::refresh_window`]
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh {
    Colour(Color),
    Texture(String),
}

/// Draw requests for the current frame, in submission order
#[derive(Debug, Clone)]
pub struct RenderQueue {
    items: Vec<Drawable>,
    resolution: (u32, u32),
    last_refresh: Option<Refresh>,
}

//----------------------------------------------------------------------------------
// Module Functions Definition
//----------------------------------------------------------------------------------
impl RenderQueue {
    pub fn new(resolution: (u32, u32)) -> Self {
        Self {
            items: Vec::new(),
            resolution,
            last_refresh: None,
        }
    }

    pub fn push(&mut self, item: Drawable) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Drawable] {
        &self.items
    }

    /// Takes every queued item, oldest first
    pub fn drain(&mut self) -> std::vec::Drain<'_, Drawable> {
        self.items.drain(..)
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub(crate) fn set_resolution(&mut self, resolution: (u32, u32)) {
        self.resolution = resolution;
    }

    /// Clears the whole window with a colour or texture
    ///
    /// The refresh only counts towards the dirty region when its target changed since the last call.
    pub fn refresh_window(&mut self, refresh: Refresh) {
        let (width, height) = self.resolution;
        let size = Vector2::new(width as f32, height as f32);

        let mut item = match &refresh {
            Refresh::Colour(colour) => {
                let mut item = Drawable::new(DrawKind::Rect, Vector2::zero(), size);
                item.fill = Some(*colour);
                item
            }
            Refresh::Texture(id) => {
                let mut item = Drawable::new(DrawKind::Texture, Vector2::zero(), size);
                item.texture = Some(id.clone());
                item
            }
        };
        item.affects_region = self.last_refresh.as_ref() != Some(&refresh);

        self.push(item);
        self.last_refresh = Some(refresh);
    }

    /// Outline of a rectangle with top-left corner `(x, y)`
    pub fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Color, outline_width: f32) {
        let mut item = Drawable::new(DrawKind::Rect, Vector2::new(x, y), Vector2::new(w, h));
        item.outline = colour;
        item.outline_width = outline_width;
        self.push(item);
    }

    /// Filled rectangle with top-left corner `(x, y)` and an optional outline
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Color, outline_width: f32, outline_colour: Color) {
        let mut item = Drawable::new(DrawKind::Rect, Vector2::new(x, y), Vector2::new(w, h));
        item.fill = Some(colour);
        item.outline = outline_colour;
        item.outline_width = outline_width;
        self.push(item);
    }

    pub fn draw_square(&mut self, x: f32, y: f32, length: f32, colour: Color, outline_width: f32) {
        self.draw_rect(x, y, length, length, colour, outline_width);
    }

    pub fn fill_square(&mut self, x: f32, y: f32, length: f32, colour: Color, outline_width: f32, outline_colour: Color) {
        self.fill_rect(x, y, length, length, colour, outline_width, outline_colour);
    }

    /// Outline of an ellipse centered on `(x, y)` with radii `(rx, ry)`
    pub fn draw_ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32, colour: Color, outline_width: f32) {
        let mut item = Drawable::new(DrawKind::Ellipse, Vector2::new(x, y), Vector2::new(rx, ry));
        item.outline = colour;
        item.outline_width = outline_width;
        self.push(item);
    }

    pub fn fill_ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32, colour: Color, outline_width: f32, outline_colour: Color) {
        let mut item = Drawable::new(DrawKind::Ellipse, Vector2::new(x, y), Vector2::new(rx, ry));
        item.fill = Some(colour);
        item.outline = outline_colour;
        item.outline_width = outline_width;
        self.push(item);
    }

    pub fn draw_circle(&mut self, x: f32, y: f32, r: f32, colour: Color, outline_width: f32) {
        self.draw_ellipse(x, y, r, r, colour, outline_width);
    }

    pub fn fill_circle(&mut self, x: f32, y: f32, r: f32, colour: Color, outline_width: f32, outline_colour: Color) {
        self.fill_ellipse(x, y, r, r, colour, outline_width, outline_colour);
    }

    /// Texture `id` with top-left corner `(x, y)`, scaled to `(w, h)` unless both are zero
    pub fn draw_texture(&mut self, x: f32, y: f32, id: impl Into<String>, w: f32, h: f32, cache: bool) {
        let mut item = Drawable::new(DrawKind::Texture, Vector2::new(x, y), Vector2::new(w, h));
        item.texture = Some(id.into());
        item.cache = cache;
        self.push(item);
    }
}
