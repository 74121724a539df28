use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::client::{GenerateError, ScenarioClient, NO_SCENARIO};

/// The only failure text the user ever sees.
pub const GENERATION_FAILED: &str =
    "An error occurred while generating the scenario. Please try again.";

/// Where the interaction currently stands. Derived from the state fields,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Editing,
    Loading,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,

    // Scenario state
    pub idea: String,
    pub scenario: String,
    pub loading: bool,
    pub generated: bool,

    // Presentation state
    pub idea_cursor: usize, // cursor position in idea, in chars
    pub scenario_scroll: u16,
    pub scenario_height: u16,      // visible rows of the scenario panel
    pub total_scenario_lines: u16, // wrapped rows of the scenario text
    pub animation_frame: u8,       // 0-2 for ellipsis animation
    pub backend_status: BackendStatus,

    // Request
    pub generate_task: Option<JoinHandle<Result<String, GenerateError>>>,
    pub client: ScenarioClient,
}

impl App {
    pub fn new(client: ScenarioClient) -> Self {
        Self {
            should_quit: false,

            idea: String::new(),
            scenario: String::new(),
            loading: false,
            generated: false,

            idea_cursor: 0,
            scenario_scroll: 0,
            scenario_height: 0,
            total_scenario_lines: 0,
            animation_frame: 0,
            backend_status: BackendStatus::Unknown,

            generate_task: None,
            client,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.generated {
            Phase::Result
        } else if self.loading {
            Phase::Loading
        } else if self.idea.trim().is_empty() {
            Phase::Idle
        } else {
            Phase::Editing
        }
    }

    /// The idea can only change before submission.
    pub fn editable(&self) -> bool {
        !self.loading && !self.generated
    }

    /// Whether a generate trigger would start a request right now.
    pub fn can_generate(&self) -> bool {
        self.editable() && self.generate_task.is_none() && !self.idea.trim().is_empty()
    }

    // Idea editing
    pub fn insert_char(&mut self, c: char) {
        if !self.editable() {
            return;
        }
        let byte_pos = char_to_byte_index(&self.idea, self.idea_cursor);
        self.idea.insert(byte_pos, c);
        self.idea_cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Inserts pasted text at the cursor. Line breaks are kept as `\n`.
    pub fn insert_str(&mut self, text: &str) {
        if !self.editable() {
            return;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let byte_pos = char_to_byte_index(&self.idea, self.idea_cursor);
        self.idea.insert_str(byte_pos, &text);
        self.idea_cursor += text.chars().count();
    }

    pub fn delete_backward(&mut self) {
        if !self.editable() || self.idea_cursor == 0 {
            return;
        }
        self.idea_cursor -= 1;
        let byte_pos = char_to_byte_index(&self.idea, self.idea_cursor);
        self.idea.remove(byte_pos);
    }

    pub fn delete_forward(&mut self) {
        if !self.editable() {
            return;
        }
        if self.idea_cursor < self.idea.chars().count() {
            let byte_pos = char_to_byte_index(&self.idea, self.idea_cursor);
            self.idea.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.idea_cursor = self.idea_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.idea.chars().count();
        self.idea_cursor = (self.idea_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.idea_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.idea_cursor = self.idea.chars().count();
    }

    /// Enters `Loading` and hands back the trimmed idea to send, or leaves
    /// everything untouched when a request may not start.
    pub fn begin_generate(&mut self) -> Option<String> {
        if !self.can_generate() {
            return None;
        }
        self.loading = true;
        self.animation_frame = 0;
        Some(self.idea.trim().to_string())
    }

    /// Starts the request in the background. Returns false when nothing was sent.
    pub fn generate(&mut self) -> bool {
        let Some(idea) = self.begin_generate() else {
            return false;
        };

        info!(chars = idea.chars().count(), endpoint = %self.client.endpoint(), "generating scenario");
        let client = self.client.clone();
        self.generate_task = Some(tokio::spawn(async move { client.generate(&idea).await }));
        true
    }

    /// Applies the outcome of a request. Always leaves `Loading`.
    pub fn finish_generate(&mut self, outcome: Result<String, GenerateError>) {
        self.scenario = match outcome {
            Ok(scenario) if scenario.is_empty() => NO_SCENARIO.to_string(),
            Ok(scenario) => scenario,
            Err(e) => {
                error!(error = %e, "scenario generation failed");
                GENERATION_FAILED.to_string()
            }
        };
        self.generated = true;
        self.loading = false;
        self.scenario_scroll = 0;
    }

    pub fn generation_finished(&self) -> bool {
        self.generate_task
            .as_ref()
            .is_some_and(|task| task.is_finished())
    }

    /// Waits for the outstanding request, if any, and applies its outcome.
    pub async fn collect_generation(&mut self) {
        let Some(task) = self.generate_task.take() else {
            return;
        };
        let outcome = task.await.unwrap_or_else(|e| Err(e.into()));
        self.finish_generate(outcome);
    }

    /// Back to a blank idea. Only meaningful once a result is shown.
    pub fn reset(&mut self) {
        if self.loading {
            return;
        }
        self.idea.clear();
        self.scenario.clear();
        self.generated = false;

        self.idea_cursor = 0;
        self.scenario_scroll = 0;
        self.total_scenario_lines = 0;
    }

    pub async fn check_backend(&mut self) {
        self.backend_status = match self.client.ping().await {
            Ok(()) => {
                info!(endpoint = %self.client.endpoint(), "backend reachable");
                BackendStatus::Online
            }
            Err(e) => {
                warn!(endpoint = %self.client.endpoint(), error = %e, "backend not reachable");
                BackendStatus::Offline
            }
        };
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Scenario scrolling
    pub fn scroll_down(&mut self) {
        if self.scenario_scroll < self.max_scroll() {
            self.scenario_scroll = self.scenario_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.scenario_scroll = self.scenario_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.scenario_height / 2;
        self.scenario_scroll = (self.scenario_scroll + half_page).min(self.max_scroll());
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.scenario_height / 2;
        self.scenario_scroll = self.scenario_scroll.saturating_sub(half_page);
    }

    pub fn scroll_top(&mut self) {
        self.scenario_scroll = 0;
    }

    pub fn scroll_bottom(&mut self) {
        self.scenario_scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        self.total_scenario_lines.saturating_sub(self.scenario_height)
    }
}
