//! Display List - a recorded sequence of drawing calls
//!
//! A [`DisplayList`] is a [`RenderSurface`] that draws nothing: it keeps every
//! call as a [`DisplayCommand`] so a renderer can replay them later, or a test
//! can inspect them.

use serde::Serialize;

use super::RenderSurface;
use crate::color::ColorValue;
use crate::layout::box_model::{Point, Rect};
use crate::object::{FontId, ImageId};

/// A single drawing command.
///
/// Commands are stored in painting order (back to front).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DisplayCommand {
    /// Fill a rectangle with a solid color.
    ///
    /// Used for the selection background and the caret.
    FillRect {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        color: ColorValue,
    },

    /// Draw an image scaled into a rectangle.
    DrawImage {
        /// Image handle.
        image: ImageId,
        /// Destination rectangle.
        rect: Rect,
    },

    /// Draw text with its baseline origin at `(x, y)`.
    DrawText {
        /// X coordinate of the text baseline origin.
        x: f32,
        /// Y coordinate of the text baseline origin.
        y: f32,
        /// The text content to draw.
        text: String,
        /// Font handle.
        font: FontId,
        /// Text color.
        color: ColorValue,
    },
}

/// A list of drawing commands in painting order.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DisplayCommand>,
}

impl DisplayList {
    /// Create an empty display list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Add a command to the display list.
    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    /// Get the commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[DisplayCommand] {
        &self.commands
    }

    /// Get the number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the display list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Concatenated text of every `DrawText` command, in order.
    #[must_use]
    pub fn text(&self) -> String {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DisplayCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replay the recorded commands onto another surface.
    pub fn replay<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        for command in &self.commands {
            match command {
                DisplayCommand::FillRect { rect, color } => surface.fill_rect(*rect, *color),
                DisplayCommand::DrawImage { image, rect } => surface.draw_image(*image, *rect),
                DisplayCommand::DrawText {
                    x,
                    y,
                    text,
                    font,
                    color,
                } => surface.draw_text(Point::new(*x, *y), text, *font, *color),
            }
        }
    }
}

impl RenderSurface for DisplayList {
    fn draw_text(&mut self, position: Point, text: &str, font: FontId, color: ColorValue) {
        self.push(DisplayCommand::DrawText {
            x: position.x,
            y: position.y,
            text: text.to_owned(),
            font,
            color,
        });
    }

    fn draw_image(&mut self, image: ImageId, rect: Rect) {
        self.push(DisplayCommand::DrawImage { image, rect });
    }

    fn fill_rect(&mut self, rect: Rect, color: ColorValue) {
        self.push(DisplayCommand::FillRect { rect, color });
    }
}
