use crate::errors::{TinderError, TinderResult};
use crate::window::types::Region;

/// Converts window-relative coordinates to absolute screen coordinates.
#[derive(Debug, Clone, Default)]
pub struct CoordinateMapper {
    region: Option<Region>,
}

impl CoordinateMapper {
    pub fn new(region: Option<Region>) -> Self {
        Self { region }
    }

    pub fn is_ready(&self) -> bool {
        self.region.as_ref().is_some_and(Region::is_ready)
    }

    /// The region, only when it is usable for mapping and capture.
    pub fn region(&self) -> TinderResult<&Region> {
        match &self.region {
            Some(region) if region.is_ready() => Ok(region),
            _ => Err(TinderError::NotReady),
        }
    }

    /// No clamping: out-of-bounds relative points pass through.
    pub fn to_absolute(&self, relative_x: i32, relative_y: i32) -> TinderResult<(i32, i32)> {
        let region = self.region()?;
        Ok((region.x + relative_x, region.y + relative_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: i32, y: i32, width: i32, height: i32) -> Region {
        Region {
            x,
            y,
            width,
            height,
            title: "RuneLite".into(),
        }
    }

    #[test]
    fn adds_region_origin() {
        let origins = [(0, 0), (4, 28), (1920, 0), (-1280, 100)];
        let points = [(0, 0), (21, 18), (600, 400), (-5, 2000)];
        for (ox, oy) in origins {
            let mapper = CoordinateMapper::new(Some(region(ox, oy, 800, 600)));
            for (dx, dy) in points {
                assert_eq!(mapper.to_absolute(dx, dy).unwrap(), (ox + dx, oy + dy));
            }
        }
    }

    #[test]
    fn fails_without_region() {
        let mapper = CoordinateMapper::new(None);
        assert!(!mapper.is_ready());
        assert!(matches!(mapper.to_absolute(1, 1), Err(TinderError::NotReady)));
    }

    #[test]
    fn fails_for_zero_width_region() {
        let mapper = CoordinateMapper::new(Some(region(10, 10, 0, 600)));
        assert!(!mapper.is_ready());
        assert!(matches!(mapper.to_absolute(5, 5), Err(TinderError::NotReady)));
    }
}
