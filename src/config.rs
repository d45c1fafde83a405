use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{TinderError, TinderResult};

pub const CONFIG_FILE_NAME: &str = "tinderbox.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub humanize: HumanizeConfig,
    #[serde(default)]
    pub perception: PerceptionConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub task: TaskConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Inclusive `[min, max]` range in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsRange(pub u64, pub u64);

impl MsRange {
    pub const ZERO: MsRange = MsRange(0, 0);

    pub fn min(&self) -> u64 {
        self.0.min(self.1)
    }

    pub fn max(&self) -> u64 {
        self.0.max(self.1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Case-insensitive substring matched against window titles.
    #[serde(default = "default_title_pattern")]
    pub title_pattern: String,
    #[serde(default = "default_region_file")]
    pub region_file: PathBuf,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title_pattern: default_title_pattern(),
            region_file: default_region_file(),
        }
    }
}

fn default_title_pattern() -> String {
    "RuneLite".into()
}

fn default_region_file() -> PathBuf {
    PathBuf::from("window_config.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_true")]
    pub save_frames: bool,
    #[serde(default = "default_true")]
    pub annotate: bool,
    #[serde(default = "default_frames_dir")]
    pub frames_dir: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            save_frames: true,
            annotate: true,
            frames_dir: default_frames_dir(),
        }
    }
}

fn default_frames_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanizeConfig {
    /// Max pointer offset in pixels on each axis.
    #[serde(default = "default_jitter_radius")]
    pub jitter_radius: u32,
    #[serde(default = "default_move_ms")]
    pub move_ms: MsRange,
    #[serde(default = "default_pre_click_ms")]
    pub pre_click_ms: MsRange,
    #[serde(default = "default_post_action_ms")]
    pub post_action_ms: MsRange,
    #[serde(default = "default_keystroke_ms")]
    pub keystroke_ms: MsRange,
    #[serde(default = "default_reaction_ms")]
    pub reaction_ms: MsRange,
}

impl HumanizeConfig {
    /// No jitter and no delays. Used by tests and dry runs.
    pub fn instant() -> Self {
        Self {
            jitter_radius: 0,
            move_ms: MsRange::ZERO,
            pre_click_ms: MsRange::ZERO,
            post_action_ms: MsRange::ZERO,
            keystroke_ms: MsRange::ZERO,
            reaction_ms: MsRange::ZERO,
        }
    }
}

impl Default for HumanizeConfig {
    fn default() -> Self {
        Self {
            jitter_radius: default_jitter_radius(),
            move_ms: default_move_ms(),
            pre_click_ms: default_pre_click_ms(),
            post_action_ms: default_post_action_ms(),
            keystroke_ms: default_keystroke_ms(),
            reaction_ms: default_reaction_ms(),
        }
    }
}

fn default_jitter_radius() -> u32 {
    3
}

fn default_move_ms() -> MsRange {
    MsRange(300, 800)
}

fn default_pre_click_ms() -> MsRange {
    MsRange(50, 150)
}

fn default_post_action_ms() -> MsRange {
    MsRange(100, 300)
}

fn default_keystroke_ms() -> MsRange {
    MsRange(50, 150)
}

fn default_reaction_ms() -> MsRange {
    MsRange(500, 1500)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptionConfig {
    #[serde(default = "default_active_provider")]
    pub active_provider: String,
    /// Upper bound for a single analyze call. 0 disables the bound.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Omitting the table keeps the built-in anthropic and openai entries.
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderEntry>,
}

impl PerceptionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            active_provider: default_active_provider(),
            timeout_secs: default_timeout_secs(),
            providers: default_providers(),
        }
    }
}

fn default_active_provider() -> String {
    "anthropic".into()
}

fn default_providers() -> HashMap<String, ProviderEntry> {
    let mut providers = HashMap::new();
    providers.insert(
        "anthropic".to_string(),
        ProviderEntry {
            display_name: "Anthropic Claude".into(),
            api_base: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-5-sonnet-20241022".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            adapter: Some("anthropic".into()),
            api_key: None,
            api_key_env: None,
        },
    );
    providers.insert(
        "openai".to_string(),
        ProviderEntry {
            display_name: "OpenAI".into(),
            api_base: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            adapter: None,
            api_key: None,
            api_key_env: None,
        },
    );
    providers
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub display_name: String,
    pub api_base: String,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// "anthropic" for the messages API, None for OpenAI-compatible
    pub adapter: Option<String>,
    /// Optional API key stored in the config file (env vars take precedence).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Name of an extra env var consulted for the key.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl ProviderEntry {
    pub fn is_anthropic(&self) -> bool {
        self.adapter.as_deref() == Some("anthropic")
    }
}

fn default_temperature() -> f64 {
    0.1
}

fn default_max_tokens() -> u32 {
    1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Window-relative top-left corner of slot 0. Calibrated at startup when absent.
    #[serde(default)]
    pub origin: Option<(i32, i32)>,
    #[serde(default = "default_slot_width")]
    pub slot_width: u32,
    #[serde(default = "default_slot_height")]
    pub slot_height: u32,
    #[serde(default = "default_slots_per_row")]
    pub slots_per_row: u32,
    #[serde(default = "default_slot_count")]
    pub slot_count: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin: None,
            slot_width: default_slot_width(),
            slot_height: default_slot_height(),
            slots_per_row: default_slots_per_row(),
            slot_count: default_slot_count(),
        }
    }
}

fn default_slot_width() -> u32 {
    42
}

fn default_slot_height() -> u32 {
    36
}

fn default_slots_per_row() -> u32 {
    4
}

fn default_slot_count() -> u32 {
    28
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Item clicked first ("use").
    #[serde(default = "default_tool_item")]
    pub tool_item: String,
    /// Item the tool is used on.
    #[serde(default = "default_target_item")]
    pub target_item: String,
    /// What the resource count prompt asks the provider to count.
    #[serde(default = "default_resource_description")]
    pub resource_description: String,
    /// Yes/no question confirming the effect after a use.
    #[serde(default = "default_effect_question")]
    pub effect_question: String,
    #[serde(default = "default_between_clicks_ms")]
    pub between_clicks_ms: u64,
    #[serde(default = "default_after_use_ms")]
    pub after_use_ms: u64,
    #[serde(default = "default_effect_wait_ms")]
    pub effect_wait_ms: u64,
}

impl TaskConfig {
    pub fn without_waits(mut self) -> Self {
        self.between_clicks_ms = 0;
        self.after_use_ms = 0;
        self.effect_wait_ms = 0;
        self
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            tool_item: default_tool_item(),
            target_item: default_target_item(),
            resource_description: default_resource_description(),
            effect_question: default_effect_question(),
            between_clicks_ms: default_between_clicks_ms(),
            after_use_ms: default_after_use_ms(),
            effect_wait_ms: default_effect_wait_ms(),
        }
    }
}

fn default_tool_item() -> String {
    "tinderbox".into()
}

fn default_target_item() -> String {
    "logs".into()
}

fn default_resource_description() -> String {
    "logs (any type)".into()
}

fn default_effect_question() -> String {
    "Is there a fire visible on the ground?".into()
}

fn default_between_clicks_ms() -> u64 {
    300
}

fn default_after_use_ms() -> u64 {
    500
}

fn default_effect_wait_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCountPolicy {
    /// An unparsable count is charged to the retry budget.
    #[default]
    Failure,
    /// An unparsable count ends the run as if the resource were gone.
    Exhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
    #[serde(default = "default_success_delay_ms")]
    pub success_delay_ms: u64,
    #[serde(default = "default_failure_backoff_ms")]
    pub failure_backoff_ms: u64,
    #[serde(default)]
    pub unknown_count_policy: UnknownCountPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            success_delay_ms: default_success_delay_ms(),
            failure_backoff_ms: default_failure_backoff_ms(),
            unknown_count_policy: UnknownCountPolicy::default(),
        }
    }
}

fn default_max_failures() -> u32 {
    3
}

fn default_success_delay_ms() -> u64 {
    500
}

fn default_failure_backoff_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub to_file: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: true,
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_true() -> bool {
    true
}

fn resolve_config_path(explicit: Option<&Path>) -> TinderResult<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(TinderError::Config(format!(
            "config file {} does not exist",
            path.display()
        )));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join(CONFIG_FILE_NAME);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    if let Some(dir) = dirs::config_dir() {
        let candidate = dir.join("tinderbox").join(CONFIG_FILE_NAME);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in user config dir");
            return Ok(candidate);
        }
    }

    Err(TinderError::Config(format!(
        "{CONFIG_FILE_NAME} not found next to executable, in working directory or user config dir"
    )))
}

/// Load the config, falling back to defaults when no file exists.
/// An explicitly requested path that is missing or malformed is an error.
pub fn load_config(explicit: Option<&Path>) -> TinderResult<AppConfig> {
    let path = match resolve_config_path(explicit) {
        Ok(path) => path,
        Err(e) if explicit.is_none() => {
            tracing::info!(reason = %e, "using default configuration");
            return Ok(AppConfig::default());
        }
        Err(e) => return Err(e),
    };
    let content = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), provider = %config.perception.active_provider, "config loaded");
    Ok(config)
}

pub fn save_config(config: &AppConfig, path: &Path) -> TinderResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
