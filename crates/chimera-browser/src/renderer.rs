//! Software renderer for headless screenshot generation.
//!
//! Executes a [`PageLayout`] to a pixel buffer using fontdue for text
//! rasterization.
//!
//! # Architecture
//!
//! ```text
//! DomTree → LayoutEngine → PageLayout → Renderer → Pixels
//! ```
//!
//! The renderer knows nothing about the DOM or the style table. It iterates
//! the commands once, in order, and only measures text to center it.

use std::path::Path;

use anyhow::{Context, Result};
use chimera_layout::{
    Color, FontFamily, FontSpec, FontWeight, ImageRef, PageLayout, Rect, RenderCommand,
    TableCellCommand, TextCommand,
};
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::fonts::FontSet;
use crate::image_loader::ImageStore;

/// Header line of the diagnostics panel.
pub const LOG_PANEL_HEADER: &str = "--- Log (JS Sandbox/Security) ---";

/// Distance of the diagnostics panel header from the bottom of the surface.
const LOG_PANEL_OFFSET: f32 = 100.0;

/// Font of the diagnostics panel.
const LOG_FONT: FontSpec = FontSpec::new(FontFamily::Courier, FontWeight::Normal, 12.0);

/// Software renderer that executes render commands to a pixel buffer.
pub struct Renderer<'a> {
    /// RGBA pixel buffer
    buffer: RgbaImage,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    fonts: &'a FontSet,
    images: &'a ImageStore,
    margin: f32,
}

impl<'a> Renderer<'a> {
    /// Create a renderer with a white surface of the given size.
    #[must_use]
    pub fn new(
        width: u32,
        height: u32,
        margin: f32,
        fonts: &'a FontSet,
        images: &'a ImageStore,
    ) -> Self {
        Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgba(Color::WHITE.to_array())),
            width,
            height,
            fonts,
            images,
            margin,
        }
    }

    /// Draw a layout clipped to `viewport`, followed by the diagnostics panel.
    pub fn render(&mut self, layout: &PageLayout, viewport: Rect) {
        self.fill_rect(viewport, Color::WHITE);
        for command in &layout.commands {
            match command {
                RenderCommand::Text(text) => self.draw_text_command(text, viewport),
                RenderCommand::Image(image) => self.draw_image(&image.image, image.x, image.y),
                RenderCommand::TableCell(cell) => self.draw_cell(cell),
            }
        }
        self.draw_log_panel(&layout.diagnostics, viewport);
    }

    fn draw_text_command(&mut self, command: &TextCommand, viewport: Rect) {
        if let Some(background) = command.background {
            self.fill_rect(command.background_rect(&viewport), background);
        }
        let measured = self.text_width(&command.font, &command.text);
        let x = command.draw_x(&viewport, measured);
        let baseline = command.baseline_y(self.margin);
        self.draw_text(&command.text, x, baseline, &command.font, command.color);
    }

    fn draw_cell(&mut self, cell: &TableCellCommand) {
        self.stroke_rect(cell.border_rect(self.margin), Color::LIGHT_GREY);
        if !cell.text.is_empty() {
            self.draw_text(
                &cell.text,
                cell.x + self.margin,
                cell.y + cell.font.size,
                &cell.font,
                cell.color,
            );
        }
        if let Some(image) = &cell.image {
            self.draw_image(image, cell.x + self.margin, cell.y + self.margin);
        }
    }

    /// Draw the header and one line per log entry near the bottom of the
    /// viewport.
    pub fn draw_log_panel(&mut self, entries: &[String], viewport: Rect) {
        let x = viewport.x + 5.0;
        let top = viewport.bottom() - LOG_PANEL_OFFSET;
        self.draw_text(LOG_PANEL_HEADER, x, top, &LOG_FONT, Color::DARK_RED);
        for (i, entry) in entries.iter().enumerate() {
            let baseline = (i as f32).mul_add(14.0, top + 20.0);
            self.draw_text(entry, x, baseline, &LOG_FONT, Color::DARK_RED);
        }
    }

    fn text_width(&self, font: &FontSpec, text: &str) -> f32 {
        self.fonts.select(font).map_or(0.0, |face| {
            text.chars()
                .filter(|ch| !ch.is_control())
                .map(|ch| face.metrics(ch, font.size).advance_width)
                .sum()
        })
    }

    /// Fill a rectangle with the given color.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rgba = Rgba(color.to_array());
        let x = rect.x as i32;
        let y = rect.y as i32;
        for dy in 0..rect.height.max(0.0) as u32 {
            for dx in 0..rect.width.max(0.0) as u32 {
                self.put(x + dx as i32, y + dy as i32, rgba);
            }
        }
    }

    /// Draw a one pixel rectangle outline.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        let rgba = Rgba(color.to_array());
        let (x0, y0) = (rect.x as i32, rect.y as i32);
        let (x1, y1) = (rect.right() as i32 - 1, rect.bottom() as i32 - 1);
        for x in x0..=x1 {
            self.put(x, y0, rgba);
            self.put(x, y1, rgba);
        }
        for y in y0..=y1 {
            self.put(x0, y, rgba);
            self.put(x1, y, rgba);
        }
    }

    /// Draw an image at its natural size, alpha-blending onto the buffer.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn draw_image(&mut self, image: &ImageRef, x: f32, y: f32) {
        let Some(img) = self.images.get(image.handle) else {
            return;
        };
        let (dest_x, dest_y) = (x as i32, y as i32);
        for sy in 0..img.height() {
            for sx in 0..img.width() {
                let Some([r, g, b, a]) = img.pixel(sx, sy) else {
                    continue;
                };
                if a == 0 {
                    continue;
                }
                self.blend(dest_x + sx as i32, dest_y + sy as i32, Rgba([r, g, b, 255]), a);
            }
        }
    }

    /// Draw text with its baseline at `baseline`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn draw_text(&mut self, text: &str, x: f32, baseline: f32, font: &FontSpec, color: Color) {
        let fonts = self.fonts;
        let Some(face) = fonts.select(font) else {
            return;
        };
        let rgba = Rgba(color.to_array());
        let mut cursor_x = x;

        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let (metrics, bitmap) = face.rasterize(ch, font.size);

            // fontdue gives the bitmap offset relative to the baseline.
            let glyph_x = cursor_x as i32 + metrics.xmin;
            let glyph_y = baseline as i32 - metrics.ymin - metrics.height as i32;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let alpha = bitmap[gy * metrics.width + gx];
                    if alpha > 0 {
                        self.blend(glyph_x + gx as i32, glyph_y + gy as i32, rgba, alpha);
                    }
                }
            }
            cursor_x += metrics.advance_width;
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn put(&mut self, x: i32, y: i32, rgba: Rgba<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.buffer.put_pixel(x as u32, y as u32, rgba);
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn blend(&mut self, x: i32, y: i32, fg: Rgba<u8>, alpha: u8) {
        if x < 0 || y < 0 || (x as u32) >= self.width || (y as u32) >= self.height {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let blended = if alpha == 255 {
            fg
        } else {
            alpha_blend(fg, *self.buffer.get_pixel(x, y), alpha)
        };
        self.buffer.put_pixel(x, y, blended);
    }

    /// Pixel at `(x, y)`, if inside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.buffer.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// The rendered buffer.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    /// Save the rendered image to a file. The format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be saved to the given path.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.buffer
            .save(path)
            .with_context(|| format!("failed to save screenshot to '{}'", path.display()))
    }
}

/// Alpha blend a foreground color onto a background color.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alpha_blend(fg: Rgba<u8>, bg: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = f32::from(alpha) / 255.0;
    let inv_a = 1.0 - a;

    Rgba([
        f32::from(fg[0]).mul_add(a, f32::from(bg[0]) * inv_a) as u8,
        f32::from(fg[1]).mul_add(a, f32::from(bg[1]) * inv_a) as u8,
        f32::from(fg[2]).mul_add(a, f32::from(bg[2]) * inv_a) as u8,
        255,
    ])
}
