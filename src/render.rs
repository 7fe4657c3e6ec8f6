use std::io;

use crate::snake::Position;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const RED: Rgb = Rgb(255, 0, 0);
pub const GREEN: Rgb = Rgb(0, 255, 0);
pub const DARK_GREEN: Rgb = Rgb(0, 155, 0);
pub const DARK_GRAY: Rgb = Rgb(40, 40, 40);
pub const BLUE: Rgb = Rgb(18, 0, 181);

pub const BG_COLOR: Rgb = DARK_GRAY;
pub const GRID_COLOR: Rgb = BLUE;
pub const WORM_OUTER: Rgb = Rgb(128, 0, 128);
pub const WORM_INNER: Rgb = Rgb(186, 85, 211);
pub const APPLE_COLOR: Rgb = Rgb(255, 165, 0);
pub const TEXT_COLOR: Rgb = WHITE;

/// A point on the drawing surface, in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Which part of a text block sits on the given point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    MidTop,
    Center,
}

/// Draws frames. Holds no game state; every call gets what it needs.
pub trait Renderer {
    fn clear(&mut self, color: Rgb) -> io::Result<()>;

    fn draw_grid_lines(&mut self, cell_size: u32, color: Rgb) -> io::Result<()>;

    fn draw_worm_segments<'a, I>(&mut self, segments: I, cell_size: u32, outer: Rgb, inner: Rgb) -> io::Result<()>
    where
        I: IntoIterator<Item = &'a Position>;

    fn draw_apple(&mut self, pos: Position, cell_size: u32, color: Rgb) -> io::Result<()>;

    fn draw_text(&mut self, text: &str, at: Point, anchor: Anchor, color: Rgb) -> io::Result<()>;

    fn present(&mut self) -> io::Result<()>;
}
