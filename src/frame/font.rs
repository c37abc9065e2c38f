use std::path::{Path, PathBuf};

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use image::RgbaImage;
use tracing::{debug, info, warn};

/// Typeface used for the caption of the closing frame
///
/// Either a TrueType font found on the system or, when none of the
/// candidates load, a tiny built-in bitmap face. Rendering never fails.
pub enum CaptionFont {
    TrueType { font: Font, source: PathBuf },
    Builtin,
}

impl CaptionFont {
    /// Load the first candidate that exists and parses
    pub fn load_first(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            if !path.exists() {
                continue;
            }

            match Self::load(path) {
                Ok(font) => {
                    info!("Using font {:?}", path);
                    return font;
                }
                Err(reason) => warn!("Could not load font {:?}: {}", path, reason),
            }
        }

        info!("No system font available, falling back to the built-in bitmap font");
        Self::Builtin
    }

    fn load(path: &Path) -> std::result::Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| e.to_string())?;
        Ok(Self::TrueType {
            font,
            source: path.to_path_buf(),
        })
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }

    /// Ink extent `(left, width)` of `text` at `px`, measured from the pen origin.
    ///
    /// Returns `None` for the built-in face, whose metrics are not meaningful
    /// for layout.
    pub fn measure(&self, text: &str, px: f32) -> Option<(i64, u32)> {
        let Self::TrueType { font, .. } = self else {
            return None;
        };

        let layout = layout_line(font, text, px, 0.0, 0.0);
        let mut left = i64::MAX;
        let mut right = i64::MIN;
        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let x = glyph.x.round() as i64;
            left = left.min(x);
            right = right.max(x + glyph.width as i64);
        }

        if left > right {
            return Some((0, 0));
        }
        Some((left, (right - left) as u32))
    }

    /// Draw one line of text with its pen origin at `(x, y)`, `y` being the top of the line
    pub fn draw(&self, canvas: &mut RgbaImage, x: i64, y: i64, text: &str, px: f32, color: [u8; 3]) {
        match self {
            Self::TrueType { font, source } => {
                debug!("Drawing {:?} at ({}, {}) with {:?}", text, x, y, source);
                let layout = layout_line(font, text, px, x as f32, y as f32);
                for glyph in layout.glyphs() {
                    if glyph.width == 0 || glyph.height == 0 {
                        continue;
                    }
                    let (_, coverage) = font.rasterize_config(glyph.key);
                    for gy in 0..glyph.height {
                        for gx in 0..glyph.width {
                            let alpha = coverage[gy * glyph.width + gx];
                            blend(
                                canvas,
                                glyph.x.round() as i64 + gx as i64,
                                glyph.y.round() as i64 + gy as i64,
                                color,
                                alpha,
                            );
                        }
                    }
                }
            }
            Self::Builtin => draw_builtin(canvas, x, y, text, builtin_scale(px), color),
        }
    }
}

fn layout_line(font: &Font, text: &str, px: f32, x: f32, y: f32) -> Layout {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings {
        x,
        y,
        ..LayoutSettings::default()
    });
    layout.append(&[font], &TextStyle::new(text, px, 0));
    layout
}

/// Alpha-blend `color` onto the canvas; out-of-bounds pixels are ignored
fn blend(canvas: &mut RgbaImage, x: i64, y: i64, color: [u8; 3], alpha: u8) {
    if alpha == 0 || x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }

    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    let a = alpha as u32;
    for channel in 0..3 {
        let under = pixel[channel] as u32;
        pixel[channel] = ((color[channel] as u32 * a + under * (255 - a) + 127) / 255) as u8;
    }
    pixel[3] = 255;
}

const BUILTIN_WIDTH: u32 = 5;
const BUILTIN_HEIGHT: u32 = 7;

/// Bitmap cells are 6 units wide (5 + spacing); one unit per 24px of requested size
fn builtin_scale(px: f32) -> u32 {
    ((px / 24.0).round() as u32).max(1)
}

fn draw_builtin(canvas: &mut RgbaImage, x: i64, y: i64, text: &str, scale: u32, color: [u8; 3]) {
    let advance = ((BUILTIN_WIDTH + 1) * scale) as i64;
    let scale = scale as i64;

    for (index, c) in text.chars().enumerate() {
        let rows = builtin_glyph(c);
        let origin_x = x + index as i64 * advance;

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..BUILTIN_WIDTH {
                if bits & (1 << (BUILTIN_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        blend(
                            canvas,
                            origin_x + col as i64 * scale + dx,
                            y + row as i64 * scale + dy,
                            color,
                            255,
                        );
                    }
                }
            }
        }
    }
}

/// 5x7 glyph rows, most significant of the low five bits is the leftmost column.
/// Lowercase letters reuse the uppercase shapes; unknown characters render as '?'.
fn builtin_glyph(c: char) -> [u8; BUILTIN_HEIGHT as usize] {
    match c.to_ascii_uppercase() {
        ' ' => [0; 7],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '@' => [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '\'' => [0b01100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        _ => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn white(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    fn dark_pixels(canvas: &RgbaImage) -> usize {
        canvas.pixels().filter(|p| p[0] < 128).count()
    }

    fn system_font() -> Option<CaptionFont> {
        let font = CaptionFont::load_first(&crate::config::TitleConfig::default().font_candidates);
        (!font.is_builtin()).then_some(font)
    }

    #[test]
    fn test_missing_candidates_fall_back_to_builtin() {
        let font = CaptionFont::load_first(&[PathBuf::from("/no/such/font.ttf")]);
        assert!(font.is_builtin());
        assert!(font.measure("Hello", 72.0).is_none());
    }

    #[test]
    fn test_unparseable_font_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"definitely not a font").unwrap();

        let font = CaptionFont::load_first(&[bogus]);
        assert!(font.is_builtin());
    }

    #[test]
    fn test_builtin_draw_marks_pixels() {
        let mut canvas = white(200, 40);
        CaptionFont::Builtin.draw(&mut canvas, 2, 2, "Hi @", 48.0, [0, 0, 0]);

        let lit: u32 = "Hi @"
            .chars()
            .flat_map(builtin_glyph)
            .map(|row| row.count_ones())
            .sum();
        // scale 2: every lit cell is a 2x2 block
        assert_eq!(dark_pixels(&canvas), lit as usize * 4);
    }

    #[test]
    fn test_builtin_draw_clips_out_of_bounds() {
        let mut canvas = white(10, 10);
        CaptionFont::Builtin.draw(&mut canvas, -30, -3, "WWWWWWWW", 72.0, [0, 0, 0]);
        assert!(canvas.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_blend_half_alpha() {
        let mut canvas = white(1, 1);
        blend(&mut canvas, 0, 0, [0, 0, 0], 128);
        let value = canvas.get_pixel(0, 0)[0];
        assert!((126..=128).contains(&value));
    }

    #[test]
    fn test_truetype_measure_matches_drawn_ink() {
        let Some(font) = system_font() else {
            eprintln!("no system font installed, skipping");
            return;
        };

        let (left, width) = font.measure("Galilai", 72.0).unwrap();
        assert!(width > 0);

        let mut canvas = white(600, 120);
        font.draw(&mut canvas, 50 - left, 10, "Galilai", 72.0, [0, 0, 0]);

        let ink: Vec<u32> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] < 128)
            .map(|(x, _, _)| x)
            .collect();
        let min = *ink.iter().min().unwrap() as i64;
        let max = *ink.iter().max().unwrap() as i64;
        assert!((min - 50).abs() <= 2, "ink starts at {}", min);
        assert!((max + 1 - (50 + width as i64)).abs() <= 2, "ink ends at {}", max);
    }
}
