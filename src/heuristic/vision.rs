use std::fmt;

use image::DynamicImage;

/// Fixed confidence reported for metadata captions. Not derived from the image.
pub const CAPTION_CONFIDENCE: f64 = 0.7;

const LANDSCAPE_RATIO: f64 = 1.2;
const PORTRAIT_RATIO: f64 = 0.8;
const BRIGHT_LUMA: f64 = 150.0;
const DARK_LUMA: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    SquareIsh,
}

impl Orientation {
    /// Ratios in the closed band `[0.8, 1.2]` are square-ish.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let ratio = f64::from(width) / f64::from(height.max(1));
        if ratio > LANDSCAPE_RATIO {
            Orientation::Landscape
        } else if ratio < PORTRAIT_RATIO {
            Orientation::Portrait
        } else {
            Orientation::SquareIsh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::SquareIsh => "square-ish",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Bright,
    Dark,
    Balanced,
}

impl Tone {
    /// Brightness in the closed band `[90, 150]` is balanced.
    pub fn from_brightness(brightness: f64) -> Self {
        if brightness > BRIGHT_LUMA {
            Tone::Bright
        } else if brightness < DARK_LUMA {
            Tone::Dark
        } else {
            Tone::Balanced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Bright => "bright",
            Tone::Dark => "dark",
            Tone::Balanced => "balanced",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescription {
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
    pub tone: Tone,
    pub caption: String,
    pub confidence: f64,
}

impl ImageDescription {
    pub fn from_parts(width: u32, height: u32, brightness: f64) -> Self {
        let orientation = Orientation::from_dimensions(width, height);
        let tone = Tone::from_brightness(brightness);
        let caption = format!(
            "A {}, {} image with resolution {}x{}.",
            tone, orientation, width, height
        );

        Self {
            width,
            height,
            orientation,
            tone,
            caption,
            confidence: CAPTION_CONFIDENCE,
        }
    }
}

/// ITU-R 601-2 luma in 16-bit fixed point, rounded the way PIL's `L` mode is.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471;
    ((weighted + 0x8000) >> 16) as u8
}

/// Unweighted mean of per-pixel luma over the whole image. Alpha is ignored.
pub fn mean_brightness(image: &DynamicImage) -> f64 {
    let rgb = image.to_rgb8();
    let count = rgb.pixels().len();
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = rgb
        .pixels()
        .map(|p| u64::from(luma(p[0], p[1], p[2])))
        .sum();
    sum as f64 / count as f64
}

pub fn describe(image: &DynamicImage) -> ImageDescription {
    ImageDescription::from_parts(image.width(), image.height(), mean_brightness(image))
}
