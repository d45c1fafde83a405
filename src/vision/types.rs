use serde::{Deserialize, Serialize};

// ── OpenAI-compatible request shapes ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatMessage {
    /// A single user turn carrying the prompt and a PNG image.
    pub fn user_with_image(prompt: &str, image_png_base64: &str) -> Self {
        Self {
            role: "user".into(),
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/png;base64,{image_png_base64}"),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

// ── Parsed perception answers ────────────────────────────────────────────────

/// Zero-based row-major position in the slot grid. Only constructible for
/// values inside `[0, slot_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(u32);

impl SlotIndex {
    pub fn new(raw: i64, slot_count: u32) -> Option<Self> {
        if raw >= 0 && raw < slot_count as i64 {
            Some(Self(raw as u32))
        } else {
            None
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of counting something on screen. `Unknown` covers both an
/// unparsable answer and no answer at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCount {
    Known(u32),
    Unknown,
}

impl ResourceCount {
    /// The collapsed view: unknown counts as zero.
    pub fn or_zero(self) -> u32 {
        match self {
            ResourceCount::Known(n) => n,
            ResourceCount::Unknown => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub slot: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryListing {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

/// Window-relative point answered by the provider, e.g. a grid corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PointAnswer {
    pub x: i32,
    pub y: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_index_bounds() {
        assert_eq!(SlotIndex::new(0, 28).map(SlotIndex::get), Some(0));
        assert_eq!(SlotIndex::new(27, 28).map(SlotIndex::get), Some(27));
        assert_eq!(SlotIndex::new(28, 28), None);
        assert_eq!(SlotIndex::new(-1, 28), None);
    }

    #[test]
    fn image_part_is_a_data_url() {
        let msg = ChatMessage::user_with_image("what is this", "QUJD");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(json["content"][1]["image_url"]["url"], "data:image/png;base64,QUJD");
    }
}
