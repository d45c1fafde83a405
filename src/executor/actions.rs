use std::time::Duration;

use crate::config::MsRange;
use crate::errors::{TinderError, TinderResult};
use crate::executor::humanize::Humanizer;
use crate::executor::input::{ButtonAction, InputDriver, KeyCode, MouseButton};
use crate::window::CoordinateMapper;

const MOTION_STEP: Duration = Duration::from_millis(10);
const DRAG_SETTLE: Duration = Duration::from_millis(100);

/// Which frame a target point is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSpace {
    /// Relative to the located window region.
    Window,
    /// Absolute screen pixels.
    Screen,
}

/// Randomization for a single action, replacing the executor's configured
/// jitter radius and duration range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Humanization {
    pub jitter_radius: u32,
    /// Pointer motion time, or the interval between keystrokes when typing.
    pub duration: MsRange,
}

impl Humanization {
    /// Exact placement with no motion time.
    pub const NONE: Humanization = Humanization {
        jitter_radius: 0,
        duration: MsRange::ZERO,
    };
}

/// A requested input action. Not persisted. `humanize: None` uses the
/// executor's configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionIntent {
    Move {
        to: (i32, i32),
        space: CoordSpace,
        humanize: Option<Humanization>,
    },
    Click {
        at: (i32, i32),
        space: CoordSpace,
        button: MouseButton,
        item: Option<String>,
        humanize: Option<Humanization>,
    },
    Drag {
        from: (i32, i32),
        to: (i32, i32),
        space: CoordSpace,
        humanize: Option<Humanization>,
    },
    TypeText {
        text: String,
        humanize: Option<Humanization>,
    },
    PressKey {
        key: String,
    },
    Wait {
        duration: Option<Duration>,
    },
}

impl ActionIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            ActionIntent::Move { .. } => "move",
            ActionIntent::Click {
                button: MouseButton::Right,
                ..
            } => "right_click",
            ActionIntent::Click { .. } => "click",
            ActionIntent::Drag { .. } => "drag",
            ActionIntent::TypeText { .. } => "type",
            ActionIntent::PressKey { .. } => "key",
            ActionIntent::Wait { .. } => "wait",
        }
    }
}

/// Humanized pointer and keyboard actions.
///
/// Actuation is best effort: every public method logs and swallows backend
/// failures. Whether an action had an effect is decided by perception.
pub struct ActionExecutor {
    driver: Box<dyn InputDriver>,
    mapper: CoordinateMapper,
    humanizer: Humanizer,
}

impl ActionExecutor {
    pub fn new(driver: Box<dyn InputDriver>, mapper: CoordinateMapper, humanizer: Humanizer) -> Self {
        Self {
            driver,
            mapper,
            humanizer,
        }
    }

    pub async fn execute(&mut self, intent: ActionIntent) {
        let kind = intent.kind();
        if let Err(e) = self.try_execute(intent).await {
            tracing::error!(kind, error = %e, "action failed");
        }
    }

    pub async fn move_to(&mut self, x: i32, y: i32, space: CoordSpace) {
        self.execute(ActionIntent::Move {
            to: (x, y),
            space,
            humanize: None,
        })
        .await
    }

    pub async fn click(&mut self, x: i32, y: i32, space: CoordSpace, item: Option<&str>) {
        self.execute(ActionIntent::Click {
            at: (x, y),
            space,
            button: MouseButton::Left,
            item: item.map(str::to_string),
            humanize: None,
        })
        .await
    }

    pub async fn right_click(&mut self, x: i32, y: i32, space: CoordSpace, item: Option<&str>) {
        self.execute(ActionIntent::Click {
            at: (x, y),
            space,
            button: MouseButton::Right,
            item: item.map(str::to_string),
            humanize: None,
        })
        .await
    }

    pub async fn drag(&mut self, from: (i32, i32), to: (i32, i32), space: CoordSpace) {
        self.execute(ActionIntent::Drag {
            from,
            to,
            space,
            humanize: None,
        })
        .await
    }

    pub async fn type_text(&mut self, text: &str) {
        self.execute(ActionIntent::TypeText {
            text: text.to_string(),
            humanize: None,
        })
        .await
    }

    pub async fn press_key(&mut self, key: &str) {
        self.execute(ActionIntent::PressKey { key: key.to_string() }).await
    }

    /// `None` waits a sampled human reaction time.
    pub async fn wait(&mut self, duration: Option<Duration>) {
        self.execute(ActionIntent::Wait { duration }).await
    }

    async fn try_execute(&mut self, intent: ActionIntent) -> TinderResult<()> {
        match intent {
            ActionIntent::Move { to, space, humanize } => self.try_move(to, space, humanize).await,
            ActionIntent::Click {
                at,
                space,
                button,
                item,
                humanize,
            } => self.try_click(at, space, button, item.as_deref(), humanize).await,
            ActionIntent::Drag {
                from,
                to,
                space,
                humanize,
            } => self.try_drag(from, to, space, humanize).await,
            ActionIntent::TypeText { text, humanize } => self.try_type(&text, humanize).await,
            ActionIntent::PressKey { key } => self.try_press(&key).await,
            ActionIntent::Wait { duration } => {
                let d = duration.unwrap_or_else(|| self.humanizer.reaction());
                tokio::time::sleep(d).await;
                Ok(())
            }
        }
    }

    fn resolve(
        &mut self,
        (x, y): (i32, i32),
        space: CoordSpace,
        humanize: Option<Humanization>,
    ) -> TinderResult<(i32, i32)> {
        let absolute = match space {
            CoordSpace::Window => self.mapper.to_absolute(x, y)?,
            CoordSpace::Screen => (x, y),
        };
        Ok(match humanize {
            Some(h) => self.humanizer.jitter_within(absolute, h.jitter_radius),
            None => self.humanizer.jitter(absolute),
        })
    }

    fn motion_time(&mut self, humanize: Option<Humanization>) -> Duration {
        match humanize {
            Some(h) => self.humanizer.sample(h.duration),
            None => self.humanizer.move_duration(),
        }
    }

    async fn try_move(&mut self, to: (i32, i32), space: CoordSpace, humanize: Option<Humanization>) -> TinderResult<()> {
        let (x, y) = self.resolve(to, space, humanize)?;
        let duration = self.motion_time(humanize);
        self.glide(x, y, duration).await?;
        tracing::debug!(kind = "move", x, y, "pointer moved");
        tokio::time::sleep(self.humanizer.post_action()).await;
        Ok(())
    }

    async fn try_click(
        &mut self,
        at: (i32, i32),
        space: CoordSpace,
        button: MouseButton,
        item: Option<&str>,
        humanize: Option<Humanization>,
    ) -> TinderResult<()> {
        let (x, y) = self.resolve(at, space, humanize)?;
        let duration = self.motion_time(humanize);
        self.glide(x, y, duration).await?;
        tokio::time::sleep(self.humanizer.pre_click()).await;

        self.driver.button(button, ButtonAction::Click)?;
        tracing::info!(kind = "click", %button, x, y, item = item.unwrap_or("-"), "click");

        tokio::time::sleep(self.humanizer.post_action()).await;
        Ok(())
    }

    async fn try_drag(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        space: CoordSpace,
        humanize: Option<Humanization>,
    ) -> TinderResult<()> {
        let start = self.resolve(from, space, humanize)?;
        let end = self.resolve(to, space, humanize)?;
        let duration = self.motion_time(humanize);

        self.glide(start.0, start.1, duration / 2).await?;
        tokio::time::sleep(DRAG_SETTLE).await;

        self.driver.button(MouseButton::Left, ButtonAction::Press)?;
        let moved = self.glide(end.0, end.1, duration).await;
        // always release, even when the motion failed halfway
        let released = self.driver.button(MouseButton::Left, ButtonAction::Release);
        moved?;
        released?;

        tracing::info!(kind = "drag", from = ?start, to = ?end, "drag");
        tokio::time::sleep(self.humanizer.post_action()).await;
        Ok(())
    }

    async fn try_type(&mut self, text: &str, humanize: Option<Humanization>) -> TinderResult<()> {
        for (i, c) in text.chars().enumerate() {
            if i > 0 {
                let interval = match humanize {
                    Some(h) => self.humanizer.sample(h.duration),
                    None => self.humanizer.keystroke(),
                };
                tokio::time::sleep(interval).await;
            }
            let mut buf = [0u8; 4];
            self.driver.text(c.encode_utf8(&mut buf))?;
        }
        tracing::info!(kind = "type", chars = text.chars().count(), "typed text");
        tokio::time::sleep(self.humanizer.post_action()).await;
        Ok(())
    }

    async fn try_press(&mut self, name: &str) -> TinderResult<()> {
        let key = KeyCode::parse(name).ok_or_else(|| TinderError::Actuation(format!("unknown key name {name:?}")))?;
        self.driver.key(key)?;
        tracing::info!(kind = "key", key = name, "key pressed");
        tokio::time::sleep(self.humanizer.post_action()).await;
        Ok(())
    }

    /// Smoothstep interpolation from the current cursor to `(x, y)`.
    async fn glide(&mut self, x: i32, y: i32, duration: Duration) -> TinderResult<()> {
        let steps = (duration.as_millis() / MOTION_STEP.as_millis()) as u32;
        let start = match self.driver.cursor_position() {
            Ok(p) if steps > 1 => p,
            _ => return self.driver.move_cursor(x, y),
        };

        let step_sleep = duration / steps;
        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            let eased = t * t * (3.0 - 2.0 * t);
            let px = start.0 + ((x - start.0) as f64 * eased).round() as i32;
            let py = start.1 + ((y - start.1) as f64 * eased).round() as i32;
            self.driver.move_cursor(px, py)?;
            tokio::time::sleep(step_sleep).await;
        }
        Ok(())
    }
}
