use base64::Engine as _;
use chrono::{DateTime, Local};

use crate::errors::TinderResult;

/// A still image of the window region, as handed to perception.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: image::RgbaImage,
    pub captured_at: DateTime<Local>,
}

impl Frame {
    pub fn new(image: image::RgbaImage) -> Self {
        Self {
            image,
            captured_at: Local::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> TinderResult<Vec<u8>> {
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(self.image.clone())
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)?;
        Ok(out)
    }

    pub fn to_png_base64(&self) -> TinderResult<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_png()?))
    }
}

/// A labelled box drawn onto persisted frames, in frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub label: String,
}

impl Annotation {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, label: impl Into<String>) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            label: label.into(),
        }
    }
}
