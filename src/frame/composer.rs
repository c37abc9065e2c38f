use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::{debug, info, warn};

use crate::config::TitleConfig;
use crate::frame::font::CaptionFont;
use crate::frame::types::Frame;

/// Distance from the bottom of the logo block to the headline
const CAPTION_DROP: i64 = 100;

/// Headline sits this far above the vertical center when there is no logo
const CAPTION_RISE: i64 = 50;

/// Average glyph advance used to center text when no real font is available
const FALLBACK_HEADLINE_ADVANCE: i64 = 20;
const FALLBACK_SUBLINE_ADVANCE: i64 = 15;

/// Where the pieces of the title frame go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleLayout {
    /// Top-left corner and size of the logo, if one is placed
    pub logo: Option<(i64, i64, u32, u32)>,

    /// Top of the headline
    pub headline_top: i64,

    /// Top of the second caption line
    pub subline_top: i64,
}

/// Synthesizes the branded closing frame
pub struct FrameComposer {
    title: TitleConfig,
    width: u32,
    height: u32,
    font: CaptionFont,
}

impl FrameComposer {
    /// Create a composer, loading the caption font from the configured candidates
    pub fn new(title: TitleConfig, width: u32, height: u32) -> Self {
        let font = CaptionFont::load_first(&title.font_candidates);
        Self::with_font(title, width, height, font)
    }

    pub fn with_font(title: TitleConfig, width: u32, height: u32, font: CaptionFont) -> Self {
        Self { title, width, height, font }
    }

    /// Split the caption at the delimiter.
    ///
    /// The first line is the text before the delimiter; the second line is
    /// the delimiter followed by the next piece. Both are trimmed.
    pub fn caption_lines(&self) -> (String, Option<String>) {
        let delimiter = self.title.delimiter;
        let mut parts = self.title.caption.split(delimiter);

        let headline = parts.next().unwrap_or_default().trim().to_string();
        let subline = parts
            .next()
            .map(|rest| format!("{}{}", delimiter, rest.trim()));

        (headline, subline)
    }

    /// Positions for a logo of the given size, or none
    pub fn layout(&self, logo_size: Option<(u32, u32)>) -> TitleLayout {
        let quarter = (self.height / 4) as i64;

        let (logo, headline_top) = match logo_size {
            Some((logo_width, logo_height)) => {
                let x = (self.width as i64 - logo_width as i64) / 2;
                let below_logo = quarter + logo_height as i64 + self.title.logo_gap as i64;
                (
                    Some((x, quarter, logo_width, logo_height)),
                    below_logo + CAPTION_DROP,
                )
            }
            None => (None, self.height as i64 / 2 - CAPTION_RISE),
        };

        TitleLayout {
            logo,
            headline_top,
            subline_top: headline_top + self.title.line_spacing as i64,
        }
    }

    /// Render the closing frame; a missing or unreadable logo is skipped
    pub fn compose(&self, logo_path: Option<&Path>) -> Frame {
        let [r, g, b] = self.title.background;
        let mut canvas = RgbaImage::from_pixel(self.width, self.height, Rgba([r, g, b, 255]));

        let logo = logo_path.and_then(|path| self.load_logo(path));
        let layout = self.layout(logo.as_ref().map(|l| l.dimensions()));

        if let (Some(logo), Some((x, y, _, _))) = (&logo, layout.logo) {
            debug!("Placing logo at ({}, {})", x, y);
            imageops::overlay(&mut canvas, logo, x, y);
        }

        let (headline, subline) = self.caption_lines();
        self.draw_centered(
            &mut canvas,
            &headline,
            layout.headline_top,
            self.title.headline_size,
            FALLBACK_HEADLINE_ADVANCE,
        );
        if let Some(subline) = subline {
            self.draw_centered(
                &mut canvas,
                &subline,
                layout.subline_top,
                self.title.subline_size,
                FALLBACK_SUBLINE_ADVANCE,
            );
        }

        Frame::new(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }

    fn draw_centered(&self, canvas: &mut RgbaImage, text: &str, top: i64, px: f32, fallback_advance: i64) {
        let x = match self.font.measure(text, px) {
            Some((left, width)) => (self.width as i64 - width as i64) / 2 - left,
            None => (self.width as i64 - text.chars().count() as i64 * fallback_advance) / 2,
        };

        self.font.draw(canvas, x, top, text, px, self.title.text_color);
    }

    /// Load the logo and shrink it into the configured box.
    ///
    /// Vector logos are only usable through a PNG file next to them.
    fn load_logo(&self, path: &Path) -> Option<RgbaImage> {
        if !path.exists() {
            debug!("No logo at {:?}", path);
            return None;
        }

        let raster: PathBuf = if is_vector(path) {
            let png = path.with_extension("png");
            if !png.exists() {
                warn!("SVG logo found but no PNG version available. Skipping logo.");
                return None;
            }
            png
        } else {
            path.to_path_buf()
        };

        let logo = match image::open(&raster) {
            Ok(logo) => logo.to_rgba8(),
            Err(e) => {
                warn!("Could not load logo {:?}: {}", raster, e);
                return None;
            }
        };

        let box_size = self.title.logo_box_size;
        let (width, height) = fit_within(logo.width(), logo.height(), box_size);
        info!("Using logo {:?} at {}x{}", raster, width, height);

        if (width, height) == logo.dimensions() {
            Some(logo)
        } else {
            Some(imageops::resize(&logo, width, height, FilterType::Lanczos3))
        }
    }
}

fn is_vector(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

/// Shrink (never enlarge) to fit a square box, keeping the aspect ratio
pub fn fit_within(width: u32, height: u32, box_size: u32) -> (u32, u32) {
    if width <= box_size && height <= box_size {
        return (width, height);
    }

    let (w, h, b) = (width as u64, height as u64, box_size as u64);
    if width >= height {
        (box_size, ((h * b + w / 2) / w).max(1) as u32)
    } else {
        (((w * b + h / 2) / h).max(1) as u32, box_size)
    }
}
