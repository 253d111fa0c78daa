//! Preview frames
//!
//! Photos are decoded and scaled to fit the viewer budget. Video backends
//! produce the same [`Frame`] type.

use crate::error::{Error, Result};
use image::imageops::FilterType;
use std::path::Path;
use tracing::debug;

/// Pixel area available for a preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewBudget {
    pub width: u32,
    pub height: u32,
}

impl PreviewBudget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl Default for PreviewBudget {
    fn default() -> Self {
        Self::new(160, 90)
    }
}

/// Packed RGB8 pixels, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Wrap raw RGB bytes; `None` if the length does not match the size
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize * 3).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// RGB triple at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        Some((
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ))
    }
}

/// What the viewer shows for the current entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// Nothing loaded yet, or the session has finished
    Empty,
    Frame(Frame),
    /// Stand-in when no frame is available
    Placeholder { title: String, detail: String },
}

/// Decode a photo scaled to fit within `budget`, keeping its aspect ratio
pub fn load_photo(path: &Path, budget: PreviewBudget) -> Result<Frame> {
    let image = image::open(path).map_err(|e| Error::PreviewLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let scaled = if image.width() > budget.width || image.height() > budget.height {
        image.resize(budget.width, budget.height, FilterType::Triangle)
    } else {
        image
    };
    let rgb = scaled.to_rgb8();
    debug!(?path, width = rgb.width(), height = rgb.height(), "Photo decoded");

    Ok(Frame {
        width: rgb.width(),
        height: rgb.height(),
        pixels: rgb.into_raw(),
    })
}
