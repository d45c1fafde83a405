use std::path::PathBuf;

use crate::config::CaptureConfig;
use crate::errors::{TinderError, TinderResult};
use crate::perception::annotator;
use crate::perception::types::{Annotation, Frame};
use crate::window::{CoordinateMapper, Region};

/// Produces raw pixels for a screen region.
pub trait FrameSource {
    fn grab(&self, region: &Region) -> TinderResult<image::RgbaImage>;
}

/// Captures the monitor containing the region's origin and crops to the region.
pub struct XcapFrameSource;

impl FrameSource for XcapFrameSource {
    fn grab(&self, region: &Region) -> TinderResult<image::RgbaImage> {
        let monitors = xcap::Monitor::all()
            .map_err(|e| TinderError::Capture(format!("failed to list monitors: {e}")))?;

        let monitor = monitors
            .iter()
            .find(|m| {
                region.x >= m.x()
                    && region.y >= m.y()
                    && region.x < m.x() + m.width() as i32
                    && region.y < m.y() + m.height() as i32
            })
            .or_else(|| monitors.first())
            .ok_or_else(|| TinderError::Capture("no monitor found".into()))?;

        let screen = monitor
            .capture_image()
            .map_err(|e| TinderError::Capture(format!("screen capture failed: {e}")))?;

        crop_clamped(
            &screen,
            region.x - monitor.x(),
            region.y - monitor.y(),
            region.width,
            region.height,
        )
    }
}

/// Crop `(x, y, width, height)` out of `src`, clamped to its bounds.
/// An empty intersection is a capture failure.
pub fn crop_clamped(
    src: &image::RgbaImage,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
) -> TinderResult<image::RgbaImage> {
    let (w, h) = (src.width() as i32, src.height() as i32);
    let cx1 = x.max(0);
    let cy1 = y.max(0);
    let cx2 = (x + width).min(w);
    let cy2 = (y + height).min(h);

    if cx2 <= cx1 || cy2 <= cy1 {
        return Err(TinderError::Capture(format!(
            "region ({x}, {y}, {width}x{height}) lies outside the {w}x{h} image"
        )));
    }

    Ok(image::imageops::crop_imm(
        src,
        cx1 as u32,
        cy1 as u32,
        (cx2 - cx1) as u32,
        (cy2 - cy1) as u32,
    )
    .to_image())
}

/// Whether a capture should be persisted, and what to draw on the saved copy.
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    pub save: bool,
    pub annotations: Vec<Annotation>,
}

impl CaptureOptions {
    pub fn transient() -> Self {
        Self::default()
    }

    pub fn saved() -> Self {
        Self {
            save: true,
            annotations: Vec::new(),
        }
    }

    pub fn annotated(annotations: Vec<Annotation>) -> Self {
        Self {
            save: true,
            annotations,
        }
    }
}

/// Captures the located region and optionally persists frames.
pub struct FrameCapture {
    source: Box<dyn FrameSource>,
    mapper: CoordinateMapper,
    settings: CaptureConfig,
    sequence: u64,
}

impl FrameCapture {
    pub fn new(source: Box<dyn FrameSource>, mapper: CoordinateMapper, settings: CaptureConfig) -> Self {
        Self {
            source,
            mapper,
            settings,
            sequence: 0,
        }
    }

    /// `None` on any capture failure; the failure is logged here.
    pub fn capture(&mut self, options: CaptureOptions) -> Option<Frame> {
        let frame = match self.grab() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "failed to capture frame");
                return None;
            }
        };

        if options.save {
            if let Err(e) = self.persist(&frame, &options.annotations) {
                tracing::warn!(error = %e, "failed to save frame");
            }
        }

        Some(frame)
    }

    /// Window-relative sub-rectangle of a fresh frame.
    pub fn capture_sub_region(&mut self, x: i32, y: i32, width: i32, height: i32, save: bool) -> Option<Frame> {
        let full = self.capture(CaptureOptions::transient())?;
        let cropped = match crop_clamped(&full.image, x, y, width, height) {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(error = %e, x, y, width, height, "failed to crop sub-region");
                return None;
            }
        };
        let frame = Frame {
            image: cropped,
            captured_at: full.captured_at,
        };
        if save {
            if let Err(e) = self.persist(&frame, &[]) {
                tracing::warn!(error = %e, "failed to save frame");
            }
        }
        Some(frame)
    }

    /// Write `frame` (annotated when enabled) as
    /// `frame_<timestamp>_<seq>.png`. Saving disabled in config is a no-op.
    pub fn persist(&mut self, frame: &Frame, annotations: &[Annotation]) -> TinderResult<Option<PathBuf>> {
        if !self.settings.save_frames {
            return Ok(None);
        }
        self.sequence += 1;

        std::fs::create_dir_all(&self.settings.frames_dir)?;
        let filename = format!(
            "frame_{}_{:04}.png",
            frame.captured_at.format("%Y%m%d_%H%M%S"),
            self.sequence
        );
        let path = self.settings.frames_dir.join(filename);

        if self.settings.annotate && !annotations.is_empty() {
            annotator::annotate(&frame.image, annotations).save(&path)?;
        } else {
            frame.image.save(&path)?;
        }

        tracing::debug!(path = %path.display(), "frame saved");
        Ok(Some(path))
    }

    pub fn frames_saved(&self) -> u64 {
        self.sequence
    }

    fn grab(&self) -> TinderResult<Frame> {
        let region = self.mapper.region().map_err(|_| {
            TinderError::Capture("window region not ready".into())
        })?;
        let image = self.source.grab(region)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(TinderError::Capture("empty image".into()));
        }
        Ok(Frame::new(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{region, SolidSource};

    struct BrokenSource;

    impl FrameSource for BrokenSource {
        fn grab(&self, _region: &Region) -> TinderResult<image::RgbaImage> {
            Err(TinderError::Capture("display gone".into()))
        }
    }

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(Some(region(0, 0, 64, 48)))
    }

    fn settings(dir: &std::path::Path) -> CaptureConfig {
        CaptureConfig {
            save_frames: true,
            annotate: true,
            frames_dir: dir.to_path_buf(),
        }
    }

    #[test]
    fn captures_region_sized_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = FrameCapture::new(Box::new(SolidSource), mapper(), settings(dir.path()));
        let frame = capture.capture(CaptureOptions::transient()).unwrap();
        assert_eq!((frame.width(), frame.height()), (64, 48));
        assert_eq!(capture.frames_saved(), 0);
    }

    #[test]
    fn not_ready_region_is_a_capture_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = FrameCapture::new(
            Box::new(SolidSource),
            CoordinateMapper::new(None),
            settings(dir.path()),
        );
        assert!(capture.capture(CaptureOptions::saved()).is_none());
    }

    #[test]
    fn backend_failure_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = FrameCapture::new(Box::new(BrokenSource), mapper(), settings(dir.path()));
        assert!(capture.capture(CaptureOptions::transient()).is_none());
    }

    #[test]
    fn saved_frames_get_increasing_sequence_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = FrameCapture::new(Box::new(SolidSource), mapper(), settings(dir.path()));

        let plain = capture.capture(CaptureOptions::saved()).unwrap();
        let boxed = capture
            .capture(CaptureOptions::annotated(vec![Annotation::new(1, 1, 10, 10, "ok")]))
            .unwrap();

        // returned frames are never annotated
        assert_eq!(boxed.image.get_pixel(1, 5), plain.image.get_pixel(1, 5));

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort_by_key(|n| n[n.len() - 8..].to_string());
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("frame_") && names[0].ends_with("_0001.png"));
        assert!(names[1].ends_with("_0002.png"));
    }

    #[test]
    fn sub_region_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = FrameCapture::new(Box::new(SolidSource), mapper(), settings(dir.path()));
        let frame = capture.capture_sub_region(50, 40, 30, 30, false).unwrap();
        assert_eq!((frame.width(), frame.height()), (14, 8));
        assert!(capture.capture_sub_region(100, 100, 5, 5, false).is_none());
    }

    #[test]
    fn disabled_saving_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = settings(dir.path());
        config.save_frames = false;
        let mut capture = FrameCapture::new(Box::new(SolidSource), mapper(), config);
        capture.capture(CaptureOptions::saved()).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
