use async_trait::async_trait;

use crate::errors::TinderResult;

/// A vision-capable reasoning service: image + instruction in, free text out.
/// New providers only need to implement this trait and get an adapter name
/// in the config file.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Returns the provider's identifier (matches the config key).
    fn name(&self) -> &str;

    /// `image_png_base64` is a base64-encoded PNG.
    async fn analyze(&self, image_png_base64: &str, prompt: &str) -> TinderResult<String>;
}
