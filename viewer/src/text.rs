//! HUD text rendering behind a small trait so the viewer still works,
//! minus text, when no usable font is present.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, warn};

/// Well-known locations of monospace TTFs, tried in order.
const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
];

pub trait TextPainter {
    /// Draw `text` with its top-left corner at (x, y).
    fn draw_text(&self, img: &mut RgbaImage, x: i32, y: i32, size: f32, color: Rgba<u8>, text: &str);
}

/// Draws nothing. Installed when no font could be found; also handy in
/// headless tests.
pub struct NullPainter;

impl TextPainter for NullPainter {
    fn draw_text(
        &self,
        _img: &mut RgbaImage,
        _x: i32,
        _y: i32,
        _size: f32,
        _color: Rgba<u8>,
        _text: &str,
    ) {
    }
}

/// Painter backed by a TTF loaded at startup.
pub struct FontPainter {
    font: FontVec,
}

impl FontPainter {
    pub fn from_file(path: &Path) -> Result<Self, crate::Error> {
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| crate::Error::Font(format!("{} is not a usable font", path.display())))?;
        Ok(FontPainter { font })
    }

    /// Try the well-known system font locations, skipping unusable files.
    pub fn discover() -> Option<Self> {
        for candidate in FONT_SEARCH_PATHS {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(painter) => {
                    debug!("using font {candidate}");
                    return Some(painter);
                }
                Err(err) => warn!("skipping font {candidate}: {err}"),
            }
        }
        None
    }
}

impl TextPainter for FontPainter {
    fn draw_text(&self, img: &mut RgbaImage, x: i32, y: i32, size: f32, color: Rgba<u8>, text: &str) {
        draw_text_mut(img, color, x, y, PxScale::from(size), &self.font, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_null_painter_leaves_the_image_untouched() {
        let mut img = RgbaImage::new(32, 32);
        NullPainter.draw_text(&mut img, 2, 2, 14.0, Rgba([255, 255, 255, 255]), "hello");
        assert!(img.pixels().all(|pixel| pixel[3] == 0));
    }

    #[test]
    fn loading_a_non_font_file_fails() {
        let path = std::env::temp_dir().join("birdview_not_a_font.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let result = FontPainter::from_file(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(crate::Error::Font(_))));
    }
}
