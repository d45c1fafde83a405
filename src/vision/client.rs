use std::sync::Arc;
use std::time::Duration;

use crate::errors::{TinderError, TinderResult};
use crate::perception::Frame;
use crate::vision::parse;
use crate::vision::prompts;
use crate::vision::provider::VisionProvider;
use crate::vision::types::{InventoryItem, InventoryListing, PointAnswer, ResourceCount, SlotIndex};

/// Front door to the perception provider.
///
/// Availability is fixed at construction: without a provider every call
/// returns `PerceptionUnavailable` and every helper its safe default.
pub struct PerceptionClient {
    provider: Option<Arc<dyn VisionProvider>>,
    timeout: Option<Duration>,
    slot_count: u32,
}

impl PerceptionClient {
    pub fn new(provider: Option<Arc<dyn VisionProvider>>, timeout: Option<Duration>, slot_count: u32) -> Self {
        match &provider {
            Some(p) => tracing::info!(provider = p.name(), "perception available"),
            None => tracing::warn!("perception unavailable: no provider credential configured"),
        }
        Self {
            provider,
            timeout,
            slot_count,
        }
    }

    pub fn unavailable(slot_count: u32) -> Self {
        Self::new(None, None, slot_count)
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// Free-text answer about an unannotated frame.
    pub async fn analyze(&self, frame: &Frame, prompt: &str) -> TinderResult<String> {
        let provider = self.provider.as_ref().ok_or(TinderError::PerceptionUnavailable)?;
        let image = frame.to_png_base64()?;

        let call = provider.analyze(&image, prompt);
        let reply = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| TinderError::PerceptionTimeout(limit.as_secs()))??,
            None => call.await?,
        };

        tracing::debug!(provider = provider.name(), reply = %parse::truncate(&reply, 100), "perception reply");
        Ok(reply)
    }

    /// Like `analyze`, but failures are logged and become `None`.
    pub async fn ask(&self, frame: &Frame, prompt: &str) -> Option<String> {
        match self.analyze(frame, prompt).await {
            Ok(reply) => Some(reply),
            Err(TinderError::PerceptionUnavailable) => {
                tracing::debug!("perception unavailable, skipping query");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "perception query failed");
                None
            }
        }
    }

    pub async fn locate_named_item(&self, frame: &Frame, name: &str) -> Option<SlotIndex> {
        let reply = self.ask(frame, &prompts::locate_item(name, self.slot_count)).await?;
        let slot = parse::parse_slot(&reply, self.slot_count);
        if slot.is_none() {
            tracing::debug!(item = name, reply = %parse::truncate(&reply, 40), "no slot in reply");
        }
        slot
    }

    /// Unknown counts collapse to 0.
    pub async fn count_matching_slots(&self, frame: &Frame, description: &str) -> u32 {
        self.count_matching_slots_checked(frame, description).await.or_zero()
    }

    pub async fn count_matching_slots_checked(&self, frame: &Frame, description: &str) -> ResourceCount {
        let Some(reply) = self.ask(frame, &prompts::count_slots(description)).await else {
            return ResourceCount::Unknown;
        };
        let count = parse::parse_count(&reply);
        if count == ResourceCount::Unknown {
            tracing::warn!(what = description, reply = %parse::truncate(&reply, 40), "failed to parse count");
        }
        count
    }

    pub async fn verify_binary_condition(&self, frame: &Frame, question: &str) -> bool {
        match self.ask(frame, &prompts::binary_condition(question)).await {
            Some(reply) => parse::parse_affirmative(&reply),
            None => false,
        }
    }

    /// Window-relative top-left of slot 0, when the provider can see it.
    pub async fn locate_grid_origin(&self, frame: &Frame, slots_per_row: u32) -> Option<(i32, i32)> {
        let reply = self
            .ask(frame, &prompts::grid_origin(self.slot_count, slots_per_row))
            .await?;
        match parse::parse_json::<PointAnswer>(&reply) {
            Ok(point) if point.x >= 0 && point.y >= 0 => Some((point.x, point.y)),
            Ok(point) => {
                tracing::warn!(x = point.x, y = point.y, "grid origin outside the frame");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse grid origin");
                None
            }
        }
    }

    /// Items with slots outside the grid are dropped; a mismatch is empty.
    pub async fn list_items(&self, frame: &Frame) -> Vec<InventoryItem> {
        let Some(reply) = self.ask(frame, &prompts::list_items(self.slot_count)).await else {
            return Vec::new();
        };
        match parse::parse_json::<InventoryListing>(&reply) {
            Ok(listing) => listing
                .items
                .into_iter()
                .filter(|item| SlotIndex::new(item.slot, self.slot_count).is_some())
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse inventory listing");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{frame, ScriptedProvider};

    fn client(replies: &[&str]) -> PerceptionClient {
        PerceptionClient::new(Some(Arc::new(ScriptedProvider::new(replies))), None, 28)
    }

    #[tokio::test]
    async fn unavailable_client_returns_defaults() {
        let client = PerceptionClient::unavailable(28);
        let f = frame();
        assert!(!client.is_available());
        assert!(matches!(client.analyze(&f, "hi").await, Err(TinderError::PerceptionUnavailable)));
        assert_eq!(client.locate_named_item(&f, "logs").await, None);
        assert_eq!(client.count_matching_slots(&f, "logs").await, 0);
        assert_eq!(client.count_matching_slots_checked(&f, "logs").await, ResourceCount::Unknown);
        assert!(!client.verify_binary_condition(&f, "fire?").await);
        assert!(client.list_items(&f).await.is_empty());
    }

    #[tokio::test]
    async fn locate_maps_replies_to_slots() {
        let client = client(&["7", "-1", "the logs are in slot 3", ""]);
        let f = frame();
        assert_eq!(client.locate_named_item(&f, "logs").await.map(SlotIndex::get), Some(7));
        assert_eq!(client.locate_named_item(&f, "logs").await, None);
        assert_eq!(client.locate_named_item(&f, "logs").await, None);
        assert_eq!(client.locate_named_item(&f, "logs").await, None);
    }

    #[tokio::test]
    async fn count_and_verify() {
        let client = client(&["4", "lots", "Yes, there is a fire", "no"]);
        let f = frame();
        assert_eq!(client.count_matching_slots(&f, "logs").await, 4);
        assert_eq!(client.count_matching_slots(&f, "logs").await, 0);
        assert!(client.verify_binary_condition(&f, "fire?").await);
        assert!(!client.verify_binary_condition(&f, "fire?").await);
    }

    #[tokio::test]
    async fn provider_errors_become_defaults() {
        let provider = ScriptedProvider::failing();
        let client = PerceptionClient::new(Some(Arc::new(provider)), None, 28);
        let f = frame();
        assert!(client.is_available());
        assert_eq!(client.locate_named_item(&f, "logs").await, None);
        assert_eq!(client.count_matching_slots_checked(&f, "logs").await, ResourceCount::Unknown);
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let provider = ScriptedProvider::new(&["7"]).with_delay(Duration::from_millis(200));
        let client = PerceptionClient::new(Some(Arc::new(provider)), Some(Duration::from_millis(10)), 28);
        let result = client.analyze(&frame(), "hi").await;
        assert!(matches!(result, Err(TinderError::PerceptionTimeout(_))));
    }

    #[tokio::test]
    async fn structured_answers() {
        let client = client(&[
            "```json\n{\"x\": 560, \"y\": 210}\n```",
            "{\"x\": -3, \"y\": 4}",
            r#"{"items": [{"name": "Tinderbox", "slot": 0}, {"name": "Ghost", "slot": 40}]}"#,
        ]);
        let f = frame();
        assert_eq!(client.locate_grid_origin(&f, 4).await, Some((560, 210)));
        assert_eq!(client.locate_grid_origin(&f, 4).await, None);
        let items = client.list_items(&f).await;
        assert_eq!(items, vec![InventoryItem { name: "Tinderbox".into(), slot: 0 }]);
    }

    #[tokio::test]
    async fn prompts_reach_the_provider() {
        let provider = Arc::new(ScriptedProvider::new(&["3"]));
        let client = PerceptionClient::new(Some(provider.clone()), None, 28);
        client.locate_named_item(&frame(), "tinderbox").await;
        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Find the tinderbox"));
    }
}
