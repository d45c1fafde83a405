use crate::config::GridConfig;
use crate::errors::{TinderError, TinderResult};
use crate::perception::Annotation;
use crate::vision::SlotIndex;

/// Fixed row-major slot layout. Coordinates are window-relative.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    origin: Option<(i32, i32)>,
    slot_width: u32,
    slot_height: u32,
    slots_per_row: u32,
    slot_count: u32,
}

impl SlotGrid {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            origin: config.origin,
            slot_width: config.slot_width,
            slot_height: config.slot_height,
            slots_per_row: config.slots_per_row.max(1),
            slot_count: config.slot_count,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.origin.is_some()
    }

    pub fn origin(&self) -> Option<(i32, i32)> {
        self.origin
    }

    pub fn set_origin(&mut self, x: i32, y: i32) {
        self.origin = Some((x, y));
    }

    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    pub fn slots_per_row(&self) -> u32 {
        self.slots_per_row
    }

    /// `(col, row)` of a slot.
    pub fn cell(&self, slot: SlotIndex) -> (u32, u32) {
        let i = slot.get();
        (i % self.slots_per_row, i / self.slots_per_row)
    }

    /// Top-left corner of a slot.
    pub fn top_left(&self, slot: SlotIndex) -> TinderResult<(i32, i32)> {
        let (ox, oy) = self.origin.ok_or(TinderError::GridNotCalibrated)?;
        let (col, row) = self.cell(slot);
        Ok((
            ox + (col * self.slot_width) as i32,
            oy + (row * self.slot_height) as i32,
        ))
    }

    pub fn center(&self, slot: SlotIndex) -> TinderResult<(i32, i32)> {
        let (x, y) = self.top_left(slot)?;
        Ok((x + (self.slot_width / 2) as i32, y + (self.slot_height / 2) as i32))
    }

    /// Box around a slot for frame annotation.
    pub fn outline(&self, slot: SlotIndex, label: impl Into<String>) -> TinderResult<Annotation> {
        let (x, y) = self.top_left(slot)?;
        Ok(Annotation::new(
            x,
            y,
            x + self.slot_width as i32 - 1,
            y + self.slot_height as i32 - 1,
            label,
        ))
    }
}
