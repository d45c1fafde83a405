use std::time::Duration;

use async_trait::async_trait;

use crate::config::TaskConfig;
use crate::errors::{TinderError, TinderResult};
use crate::executor::{ActionExecutor, CoordSpace};
use crate::perception::capture::CaptureOptions;
use crate::perception::{Annotation, FrameCapture};
use crate::skills::grid::SlotGrid;
use crate::skills::types::{SkillOutcome, TaskSkills};
use crate::vision::{PerceptionClient, ResourceCount, SlotIndex};

/// Composes capture, perception and actuation into the task's skills.
pub struct SkillLibrary {
    capture: FrameCapture,
    perception: PerceptionClient,
    executor: ActionExecutor,
    grid: SlotGrid,
    task: TaskConfig,
}

impl SkillLibrary {
    pub fn new(
        capture: FrameCapture,
        perception: PerceptionClient,
        executor: ActionExecutor,
        grid: SlotGrid,
        task: TaskConfig,
    ) -> Self {
        Self {
            capture,
            perception,
            executor,
            grid,
            task,
        }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Ask perception for the grid origin unless one is already known.
    pub async fn calibrate_grid(&mut self) -> bool {
        if let Some((x, y)) = self.grid.origin() {
            tracing::debug!(x, y, "grid origin already set");
            return true;
        }
        if !self.perception.is_available() {
            tracing::error!("cannot calibrate grid: perception unavailable");
            return false;
        }
        let Some(frame) = self.capture.capture(CaptureOptions::transient()) else {
            return false;
        };
        match self
            .perception
            .locate_grid_origin(&frame, self.grid.slots_per_row())
            .await
        {
            Some((x, y)) => {
                self.grid.set_origin(x, y);
                tracing::info!(x, y, "grid calibrated");
                true
            }
            None => {
                tracing::error!("grid calibration failed");
                false
            }
        }
    }

    pub async fn locate_slot(&mut self, item: &str) -> Option<SlotIndex> {
        if !self.perception.is_available() {
            tracing::error!(item, "cannot locate item: perception unavailable");
            return None;
        }
        let frame = self.capture.capture(CaptureOptions::transient())?;
        let slot = self.perception.locate_named_item(&frame, item).await;
        match slot {
            Some(slot) => tracing::info!(item, %slot, "item located"),
            None => tracing::warn!(item, "item not found"),
        }
        slot
    }

    pub async fn click_slot(&mut self, slot: SlotIndex, item: Option<&str>) -> TinderResult<()> {
        let (x, y) = self.grid.center(slot)?;
        self.executor.click(x, y, CoordSpace::Window, item).await;
        Ok(())
    }

    /// Both items must be found; there is no partial path.
    pub async fn use_item_on_item(&mut self, tool: &str, target: &str) -> TinderResult<SkillOutcome> {
        if !self.grid.is_calibrated() {
            return Err(TinderError::GridNotCalibrated);
        }
        tracing::info!(tool, target, "use item on item");

        let tool_slot = self.locate_slot(tool).await;
        let target_slot = self.locate_slot(target).await;
        let (Some(tool_slot), Some(target_slot)) = (tool_slot, target_slot) else {
            return Ok(SkillOutcome::failed(format!("could not find items: {tool}, {target}")));
        };

        self.click_slot(tool_slot, Some(tool)).await?;
        self.executor
            .wait(Some(Duration::from_millis(self.task.between_clicks_ms)))
            .await;
        self.click_slot(target_slot, Some(target)).await?;
        self.executor
            .wait(Some(Duration::from_millis(self.task.after_use_ms)))
            .await;

        Ok(SkillOutcome::succeeded().with_detail(format!("{tool} (slot {tool_slot}) on {target} (slot {target_slot})")))
    }

    /// Use the tool on the target, wait for the effect, then verify it.
    pub async fn perform_task(&mut self) -> TinderResult<SkillOutcome> {
        let tool = self.task.tool_item.clone();
        let target = self.task.target_item.clone();

        let used = self.use_item_on_item(&tool, &target).await?;
        if !used.success {
            return Ok(used);
        }

        self.executor
            .wait(Some(Duration::from_millis(self.task.effect_wait_ms)))
            .await;

        let Some(frame) = self.capture.capture(CaptureOptions::transient()) else {
            return Ok(SkillOutcome::failed("verification capture failed"));
        };
        let question = self.task.effect_question.clone();
        let confirmed = self.perception.verify_binary_condition(&frame, &question).await;

        let label = if confirmed { "verified" } else { "not verified" };
        let outline = Annotation::new(0, 0, frame.width() as i32 - 1, frame.height() as i32 - 1, label);
        if let Err(e) = self.capture.persist(&frame, &[outline]) {
            tracing::warn!(error = %e, "failed to save verification frame");
        }

        if confirmed {
            tracing::info!(question = %question, "task effect verified");
            Ok(SkillOutcome::succeeded())
        } else {
            tracing::warn!(question = %question, "task effect not detected");
            Ok(SkillOutcome::failed("effect not detected"))
        }
    }

    /// Collapsed count: any perception failure reads as 0.
    pub async fn count_remaining_resource(&mut self) -> u32 {
        self.probe_remaining_resource().await.or_zero()
    }

    pub async fn probe_remaining_resource(&mut self) -> ResourceCount {
        if !self.perception.is_available() {
            return ResourceCount::Unknown;
        }
        let Some(frame) = self.capture.capture(CaptureOptions::transient()) else {
            return ResourceCount::Unknown;
        };
        let description = self.task.resource_description.clone();
        let count = self
            .perception
            .count_matching_slots_checked(&frame, &description)
            .await;
        tracing::debug!(what = %description, ?count, "resource remaining");
        count
    }
}

#[async_trait(?Send)]
impl TaskSkills for SkillLibrary {
    fn ready(&self) -> TinderResult<()> {
        if !self.perception.is_available() {
            return Err(TinderError::PerceptionUnavailable);
        }
        if !self.grid.is_calibrated() {
            return Err(TinderError::GridNotCalibrated);
        }
        Ok(())
    }

    async fn perform_task(&mut self) -> TinderResult<SkillOutcome> {
        SkillLibrary::perform_task(self).await
    }

    async fn probe_remaining_resource(&mut self) -> ResourceCount {
        SkillLibrary::probe_remaining_resource(self).await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::config::{CaptureConfig, GridConfig, HumanizeConfig};
    use crate::executor::input::{ButtonAction, MouseButton};
    use crate::executor::Humanizer;
    use crate::test_support::{region, InputEvent, RecordingDriver, ScriptedProvider, SolidSource};
    use crate::window::CoordinateMapper;

    struct Fixture {
        skills: SkillLibrary,
        events: Rc<RefCell<Vec<InputEvent>>>,
        frames: tempfile::TempDir,
    }

    fn fixture(replies: Option<&[&str]>, origin: Option<(i32, i32)>) -> Fixture {
        let frames = tempfile::tempdir().unwrap();
        let mapper = CoordinateMapper::new(Some(region(0, 0, 800, 600)));
        let capture = FrameCapture::new(
            Box::new(SolidSource),
            mapper.clone(),
            CaptureConfig {
                save_frames: true,
                annotate: true,
                frames_dir: frames.path().to_path_buf(),
            },
        );
        let perception = match replies {
            Some(r) => PerceptionClient::new(Some(Arc::new(ScriptedProvider::new(r))), None, 28),
            None => PerceptionClient::unavailable(28),
        };
        let driver = RecordingDriver::default();
        let events = driver.events();
        let executor = ActionExecutor::new(Box::new(driver), mapper, Humanizer::seeded(HumanizeConfig::instant(), 0));
        let grid = SlotGrid::new(&GridConfig {
            origin,
            ..GridConfig::default()
        });
        Fixture {
            skills: SkillLibrary::new(capture, perception, executor, grid, TaskConfig::default().without_waits()),
            events,
            frames,
        }
    }

    fn clicks(events: &Rc<RefCell<Vec<InputEvent>>>) -> Vec<(i32, i32)> {
        let events = events.borrow();
        events
            .iter()
            .zip(events.iter().skip(1))
            .filter_map(|pair| match pair {
                (InputEvent::Move(x, y), InputEvent::Button(MouseButton::Left, ButtonAction::Click)) => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    fn saved_frames(dir: &tempfile::TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn successful_task_clicks_both_slots_and_verifies() {
        let mut f = fixture(Some(&["0", "5", "yes"]), Some((560, 210)));
        assert!(f.skills.ready().is_ok());

        let outcome = f.skills.perform_task().await.unwrap();
        assert!(outcome.success);
        assert_eq!(clicks(&f.events), vec![(581, 228), (623, 264)]);
        assert_eq!(saved_frames(&f.frames), 1);
    }

    #[tokio::test]
    async fn missing_item_fails_without_clicking() {
        let mut f = fixture(Some(&["-1", "3"]), Some((560, 210)));
        let outcome = f.skills.perform_task().await.unwrap();
        assert!(!outcome.success);
        assert!(f.events.borrow().is_empty());
        assert_eq!(saved_frames(&f.frames), 0);
    }

    #[tokio::test]
    async fn unverified_effect_is_a_failure() {
        let mut f = fixture(Some(&["0", "1", "No fire visible."]), Some((560, 210)));
        let outcome = f.skills.perform_task().await.unwrap();
        assert!(!outcome.success);
        assert_eq!(clicks(&f.events).len(), 2);
        assert_eq!(saved_frames(&f.frames), 1);
    }

    #[tokio::test]
    async fn uncalibrated_grid_is_fatal() {
        let mut f = fixture(Some(&["0", "1"]), None);
        assert!(matches!(f.skills.ready(), Err(TinderError::GridNotCalibrated)));
        let result = f.skills.use_item_on_item("tinderbox", "logs").await;
        assert!(matches!(result, Err(TinderError::GridNotCalibrated)));
        assert!(f.events.borrow().is_empty());
    }

    #[tokio::test]
    async fn calibration_reads_origin_from_perception() {
        let mut f = fixture(Some(&["{\"x\": 100, \"y\": 200}"]), None);
        assert!(f.skills.calibrate_grid().await);
        assert_eq!(f.skills.grid().origin(), Some((100, 200)));
        // already calibrated, no further query
        assert!(f.skills.calibrate_grid().await);
    }

    #[tokio::test]
    async fn resource_counts() {
        let mut f = fixture(Some(&["5", "many", "many"]), Some((0, 0)));
        assert_eq!(f.skills.count_remaining_resource().await, 5);
        assert_eq!(f.skills.count_remaining_resource().await, 0);
        assert_eq!(f.skills.probe_remaining_resource().await, ResourceCount::Unknown);
    }

    #[tokio::test]
    async fn unavailable_perception_short_circuits() {
        let mut f = fixture(None, Some((0, 0)));
        assert!(matches!(f.skills.ready(), Err(TinderError::PerceptionUnavailable)));
        assert_eq!(f.skills.locate_slot("logs").await, None);
        assert!(!f.skills.perform_task().await.unwrap().success);
        assert_eq!(f.skills.count_remaining_resource().await, 0);
        assert!(f.events.borrow().is_empty());
    }

    #[tokio::test]
    async fn calibration_without_perception_fails() {
        let mut f = fixture(None, None);
        assert!(!f.skills.calibrate_grid().await);
        assert!(!f.skills.grid().is_calibrated());
    }
}
