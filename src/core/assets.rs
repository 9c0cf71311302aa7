// FILE: src/core/assets.rs
use crate::config::{BUILTIN_ARROW_COLOR, BUILTIN_ARROW_PX};
use crate::core::gfx::types::Bitmap;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::{debug, info};
use once_cell::sync::Lazy;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Decodes the arrow artwork and hands out copies scaled to a requested size.
pub trait BitmapSource {
    fn load_scaled(&self, width: u32, height: u32) -> Result<Bitmap, Box<dyn Error>>;
}

fn check_size(width: u32, height: u32) -> Result<(), Box<dyn Error>> {
    if width == 0 || height == 0 {
        return Err(format!("Cannot scale bitmap to {}x{}", width, height).into());
    }
    Ok(())
}

#[inline(always)]
fn scale(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::Triangle)
}

// -----------------------------------------------------------------------------
// Built-in arrow (drawn once, no file needed)
// -----------------------------------------------------------------------------
static BUILTIN_MASTER: Lazy<RgbaImage> = Lazy::new(|| draw_down_arrow(BUILTIN_ARROW_PX));

/// Downward arrow: a centred shaft over a triangular head, on transparency.
fn draw_down_arrow(px: u32) -> RgbaImage {
    let s = px as f32;
    let cx = s / 2.0;
    let shaft_half = s / 12.0;
    let shaft_top = s / 12.0;
    let head_top = s / 2.0;
    let head_bottom = s * 11.0 / 12.0;
    let head_half = s * 3.0 / 8.0;
    let color = Rgba(BUILTIN_ARROW_COLOR);

    RgbaImage::from_fn(px, px, |x, y| {
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        let in_shaft = (fx - cx).abs() <= shaft_half && fy >= shaft_top && fy < head_top;
        let in_head = fy >= head_top && fy < head_bottom && {
            let remaining = (head_bottom - fy) / (head_bottom - head_top);
            (fx - cx).abs() <= head_half * remaining
        };
        if in_shaft || in_head { color } else { Rgba([0, 0, 0, 0]) }
    })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinArrow;

impl BitmapSource for BuiltinArrow {
    fn load_scaled(&self, width: u32, height: u32) -> Result<Bitmap, Box<dyn Error>> {
        check_size(width, height)?;
        debug!("Scaling built-in arrow to {}x{}", width, height);
        Ok(Bitmap::from_rgba(scale(&BUILTIN_MASTER, width, height)))
    }
}

// -----------------------------------------------------------------------------
// Arrow artwork from disk
// -----------------------------------------------------------------------------
#[derive(Clone, Debug)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BitmapSource for ImageFileSource {
    fn load_scaled(&self, width: u32, height: u32) -> Result<Bitmap, Box<dyn Error>> {
        check_size(width, height)?;
        info!("Loading arrow image from: {:?}", self.path);
        let img = image::open(&self.path)
            .map_err(|e| format!("Failed to open image {:?}: {}", self.path, e))?
            .to_rgba8();
        debug!(
            "Arrow image {:?} is {}x{}, scaling to {}x{}",
            self.path,
            img.width(),
            img.height(),
            width,
            height
        );
        Ok(Bitmap::from_rgba(scale(&img, width, height)))
    }
}

/// Picks the file source when a path is configured, the built-in arrow otherwise.
pub fn source_for(path: Option<&Path>) -> Box<dyn BitmapSource> {
    match path {
        Some(p) => Box::new(ImageFileSource::new(p)),
        None => Box::new(BuiltinArrow),
    }
}
