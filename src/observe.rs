//! Observation-only mode: checks each stage of the pipeline and then
//! answers free-form questions about the window. Nothing here can act.
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::errors::TinderResult;
use crate::perception::capture::CaptureOptions;
use crate::perception::{Frame, FrameCapture};
use crate::vision::{prompts, PerceptionClient};
use crate::window::Region;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

pub struct Observer {
    capture: FrameCapture,
    perception: PerceptionClient,
    frame: Option<Frame>,
}

impl Observer {
    pub fn new(capture: FrameCapture, perception: PerceptionClient) -> Self {
        Self {
            capture,
            perception,
            frame: None,
        }
    }

    pub async fn diagnostics(&mut self, region: Option<&Region>) -> Vec<CheckResult> {
        let mut results = Vec::new();

        results.push(match region {
            Some(r) if r.is_ready() => CheckResult::pass(
                "window detection",
                format!("{} at ({}, {}) {}x{}", r.title, r.x, r.y, r.width, r.height),
            ),
            _ => CheckResult::fail("window detection", "no usable window region"),
        });

        self.frame = self.capture.capture(CaptureOptions::saved());
        let Some(frame) = self.frame.as_ref() else {
            results.push(CheckResult::fail("frame capture", "capture failed"));
            results.push(CheckResult::fail("scene description", "no frame"));
            results.push(CheckResult::fail("inventory listing", "no frame"));
            return log_results(results);
        };
        results.push(CheckResult::pass(
            "frame capture",
            format!("{}x{}", frame.width(), frame.height()),
        ));

        if !self.perception.is_available() {
            results.push(CheckResult::fail("scene description", "perception unavailable"));
            results.push(CheckResult::fail("inventory listing", "perception unavailable"));
            return log_results(results);
        }

        results.push(match self.perception.ask(frame, prompts::DESCRIBE_SCENE).await {
            Some(text) if !text.trim().is_empty() => CheckResult::pass("scene description", text.trim()),
            _ => CheckResult::fail("scene description", "no answer"),
        });

        let items = self.perception.list_items(frame).await;
        results.push(if items.is_empty() {
            CheckResult::fail("inventory listing", "no items recognised")
        } else {
            let names: Vec<String> = items.iter().map(|i| format!("{}@{}", i.name, i.slot)).collect();
            CheckResult::pass("inventory listing", names.join(", "))
        });

        log_results(results)
    }

    /// Reads one command per line until EOF or `quit`. Returns the number of
    /// questions sent to perception.
    pub async fn interactive<R, W>(&mut self, input: R, mut output: W) -> TinderResult<u32>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.frame.is_none() {
            self.frame = self.capture.capture(CaptureOptions::transient());
        }
        output
            .write_all(b"Ask about the current frame. 'refresh' re-captures, 'quit' exits.\n")
            .await?;

        let mut asked = 0u32;
        let mut lines = input.lines();
        loop {
            output.write_all(b"> ").await?;
            output.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            let reply = match line.to_lowercase().as_str() {
                "" => continue,
                "quit" | "exit" | "q" => break,
                "refresh" => {
                    self.frame = self.capture.capture(CaptureOptions::transient());
                    match &self.frame {
                        Some(f) => format!("frame refreshed ({}x{})", f.width(), f.height()),
                        None => "capture failed".to_string(),
                    }
                }
                _ => match &self.frame {
                    None => "no frame yet; type 'refresh'".to_string(),
                    Some(frame) => {
                        asked += 1;
                        match self.perception.ask(frame, line).await {
                            Some(answer) => {
                                tracing::info!(question = line, answer = %answer, "observation");
                                answer
                            }
                            None => "(no answer)".to_string(),
                        }
                    }
                },
            };
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
        output.flush().await?;
        Ok(asked)
    }
}

fn log_results(results: Vec<CheckResult>) -> Vec<CheckResult> {
    for r in &results {
        if r.passed {
            tracing::info!(check = r.name, detail = %r.detail, "PASS");
        } else {
            tracing::warn!(check = r.name, detail = %r.detail, "FAIL");
        }
    }
    results
}
