//! Scripted fakes shared by unit tests.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{TinderError, TinderResult};
use crate::executor::input::{ButtonAction, InputDriver, KeyCode, MouseButton};
use crate::perception::{Frame, FrameSource};
use crate::vision::VisionProvider;
use crate::window::Region;

pub fn region(x: i32, y: i32, width: i32, height: i32) -> Region {
    Region {
        x,
        y,
        width,
        height,
        title: "RuneLite".into(),
    }
}

pub fn frame() -> Frame {
    Frame::new(image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255])))
}

/// Replies in order; once the script runs out every call fails.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    failing: bool,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            failing: false,
            delay: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(&[])
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn analyze(&self, _image_png_base64: &str, prompt: &str) -> TinderResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(TinderError::Perception("503 Service Unavailable".into()));
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TinderError::Perception("script exhausted".into()))
    }
}

pub struct SolidSource;

impl FrameSource for SolidSource {
    fn grab(&self, region: &Region) -> TinderResult<image::RgbaImage> {
        Ok(image::RgbaImage::from_pixel(
            region.width as u32,
            region.height as u32,
            image::Rgba([40, 40, 40, 255]),
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Move(i32, i32),
    Button(MouseButton, ButtonAction),
    Key(KeyCode),
    Text(String),
}

/// Records every successful call; `failing` rejects them all.
#[derive(Default)]
pub struct RecordingDriver {
    events: Rc<RefCell<Vec<InputEvent>>>,
    cursor: Option<(i32, i32)>,
    failing: bool,
}

impl RecordingDriver {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            cursor: Some((x, y)),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Rc<RefCell<Vec<InputEvent>>> {
        self.events.clone()
    }

    fn record(&mut self, event: InputEvent) -> TinderResult<()> {
        if self.failing {
            return Err(TinderError::Actuation("input rejected".into()));
        }
        self.events.borrow_mut().push(event);
        Ok(())
    }
}

impl InputDriver for RecordingDriver {
    fn cursor_position(&self) -> TinderResult<(i32, i32)> {
        self.cursor
            .ok_or_else(|| TinderError::Actuation("cursor position unknown".into()))
    }

    fn move_cursor(&mut self, x: i32, y: i32) -> TinderResult<()> {
        self.record(InputEvent::Move(x, y))?;
        if self.cursor.is_some() {
            self.cursor = Some((x, y));
        }
        Ok(())
    }

    fn button(&mut self, button: MouseButton, action: ButtonAction) -> TinderResult<()> {
        self.record(InputEvent::Button(button, action))
    }

    fn key(&mut self, key: KeyCode) -> TinderResult<()> {
        self.record(InputEvent::Key(key))
    }

    fn text(&mut self, text: &str) -> TinderResult<()> {
        self.record(InputEvent::Text(text.to_string()))
    }
}
