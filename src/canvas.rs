// The persistent drawing surface and its undo/redo history.
//
// The canvas is an RGBA buffer the size of the camera frame. Alpha 0 means
// "show whatever is underneath", so a fresh canvas is all zeros. Every
// destructive edit pushes a full snapshot first; history is a pair of
// bounded stacks that evict their oldest entry when full.

use std::collections::VecDeque;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{BresenhamLineIter, draw_filled_circle_mut};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{Color, Point};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// How an erase stroke touches the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraseMode {
    /// Paint opaque background color (white on the white canvas, else black).
    #[default]
    Paint,
    /// Reset pixels to fully transparent.
    Clear,
}

/// Bounded stack of canvas snapshots. Pushing past capacity drops the oldest.
pub struct History {
    entries: VecDeque<RgbaImage>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: RgbaImage) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<RgbaImage> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Color and width for one stroke segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    pub color: Rgba<u8>,
    pub thickness: u32,
}

impl Brush {
    pub fn paint(color: Color, thickness: u32) -> Self {
        Self { color: color.to_rgba(), thickness }
    }

    /// Brush that resets pixels to transparent.
    pub fn eraser(thickness: u32) -> Self {
        Self { color: TRANSPARENT, thickness }
    }
}

pub struct Canvas {
    image: RgbaImage,
    undo: History,
    redo: History,
}

impl Canvas {
    pub fn new(width: u32, height: u32, history_capacity: usize) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            undo: History::new(history_capacity),
            redo: History::new(history_capacity),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Snapshot before a fresh edit. A new edit forks history, so redo is dropped.
    fn checkpoint(&mut self) {
        self.undo.push(self.image.clone());
        self.redo.clear();
    }

    /// A stroke is starting: remember the canvas as it was.
    pub fn begin_stroke(&mut self) {
        self.checkpoint();
        debug!("Stroke started (undo depth {})", self.undo.len());
    }

    /// Lay a round-capped segment from `from` to `to`.
    ///
    /// Caps are discs of radius `thickness / 2`, so an even width comes out
    /// one pixel wider (8 -> 9).
    pub fn extend_stroke(&mut self, from: Point, to: Point, brush: Brush) {
        let radius = (brush.thickness / 2).max(1) as i32;
        let start = (from.x as f32, from.y as f32);
        let end = (to.x as f32, to.y as f32);
        for (x, y) in BresenhamLineIter::new(start, end) {
            draw_filled_circle_mut(&mut self.image, (x, y), radius, brush.color);
        }
        // End caps, whatever the iterator does with its endpoints.
        draw_filled_circle_mut(&mut self.image, (from.x, from.y), radius, brush.color);
        draw_filled_circle_mut(&mut self.image, (to.x, to.y), radius, brush.color);
    }

    /// Wipe to transparent. Undoable.
    pub fn clear(&mut self) {
        self.checkpoint();
        let (w, h) = self.image.dimensions();
        self.image = RgbaImage::new(w, h);
        info!("Canvas cleared");
    }

    /// Step back one edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.image, previous);
        self.redo.push(current);
        true
    }

    /// Re-apply the last undone edit. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.image, next);
        self.undo.push(current);
        true
    }

    /// Write the canvas as PNG, replacing any existing file. History is untouched.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| Error::Save { path: path.to_path_buf(), source })?;
        info!("Saved canvas to {}", path.display());
        Ok(())
    }
}
