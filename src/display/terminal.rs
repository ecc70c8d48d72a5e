/// Terminal backend for [`Surface`].
///
/// The terminal grid is treated as a pixel canvas: every cell covers
/// `CellSize` pixels, and shapes light up the cells they cover.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use glam::Vec2;

use super::{Surface, TextAlign};
use crate::geometry::Canvas;

const BLOCK: &str = "█";
const DOT: &str = "•";

/// Pixels covered by one terminal cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CellSize {
    // Cells are roughly twice as tall as they are wide.
    fn default() -> Self {
        Self { width: 8.0, height: 16.0 }
    }
}

impl CellSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pixel position at the middle of cell `(col, row)`.
    pub fn center_of(&self, col: u16, row: u16) -> Vec2 {
        Vec2::new(
            (col as f32 + 0.5) * self.width,
            (row as f32 + 0.5) * self.height,
        )
    }

    pub fn canvas(&self, cols: u16, rows: u16) -> Canvas {
        Canvas::new(cols as f32 * self.width, rows as f32 * self.height)
    }
}

pub struct TerminalSurface<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
    cell: CellSize,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, cols: u16, rows: u16, cell: CellSize) -> Self {
        Self { out, cols, rows, cell }
    }

    /// Pick up a new terminal size; the next frame uses it.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    pub fn grid(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Cells `first..=last` overlapping the pixel span `[from, to)` on one
    /// axis, clipped to `0..limit`.
    fn span(from: f32, to: f32, cell: f32, limit: u16) -> Option<(u16, u16)> {
        if limit == 0 || to <= from {
            return None;
        }
        let first = (from / cell).floor().max(0.0);
        let last = ((to / cell).ceil() - 1.0).min(limit as f32 - 1.0);
        if last < first || last < 0.0 {
            return None;
        }
        Some((first as u16, last as u16))
    }

    fn cell_at(&self, p: Vec2) -> Option<(u16, u16)> {
        let col = (p.x / self.cell.width).floor();
        let row = (p.y / self.cell.height).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some((col as u16, row as u16))
    }

    fn put(&mut self, col: u16, row: u16, glyph: &str) -> std::io::Result<()> {
        self.out.queue(cursor::MoveTo(col, row))?;
        self.out.queue(Print(glyph))?;
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn size(&self) -> (f32, f32) {
        let canvas = self.cell.canvas(self.cols, self.rows);
        (canvas.width, canvas.height)
    }

    fn clear(&mut self, background: Color) -> std::io::Result<()> {
        self.out.queue(style::SetBackgroundColor(background))?;
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) -> std::io::Result<()> {
        let cols = Self::span(pos.x, pos.x + size.x, self.cell.width, self.cols);
        let rows = Self::span(pos.y, pos.y + size.y, self.cell.height, self.rows);
        let (Some((c0, c1)), Some((r0, r1))) = (cols, rows) else {
            return Ok(());
        };

        let run = BLOCK.repeat((c1 - c0 + 1) as usize);
        self.out.queue(style::SetForegroundColor(color))?;
        for row in r0..=r1 {
            self.put(c0, row, &run)?;
        }
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) -> std::io::Result<()> {
        let cols = Self::span(center.x - radius, center.x + radius, self.cell.width, self.cols);
        let rows = Self::span(center.y - radius, center.y + radius, self.cell.height, self.rows);

        self.out.queue(style::SetForegroundColor(color))?;
        let mut painted = false;
        if let (Some((c0, c1)), Some((r0, r1))) = (cols, rows) {
            for row in r0..=r1 {
                for col in c0..=c1 {
                    if self.cell.center_of(col, row).distance(center) <= radius {
                        self.put(col, row, BLOCK)?;
                        painted = true;
                    }
                }
            }
        }

        // Smaller than a cell: mark the cell holding the center.
        if !painted {
            if let Some((col, row)) = self.cell_at(center) {
                self.put(col, row, DOT)?;
            }
        }
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        pos: Vec2,
        align: TextAlign,
        color: Color,
    ) -> std::io::Result<()> {
        let row = (pos.y / self.cell.height).floor();
        if row < 0.0 || row >= self.rows as f32 {
            return Ok(());
        }

        let len = text.chars().count() as i32;
        let mut start = (pos.x / self.cell.width).floor() as i32;
        if align == TextAlign::Center {
            start -= len / 2;
        }
        let skip = (-start).max(0);
        let room = self.cols as i32 - start.max(0);
        if room <= 0 || skip >= len {
            return Ok(());
        }

        let visible: String = text.chars().skip(skip as usize).take(room as usize).collect();
        self.out.queue(style::SetForegroundColor(color))?;
        self.put(start.max(0) as u16, row as u16, &visible)
    }

    fn present(&mut self) -> std::io::Result<()> {
        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, self.rows.saturating_sub(1)))?;
        self.out.flush()
    }
}
