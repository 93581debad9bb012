use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use tracing::debug;

pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("maxpane").join("config.toml"))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub settings: Settings,
    /// Window commands that stand for a deliberate pane switch. Running one of
    /// them lets the next focus change re-maximize the newly focused group.
    pub intentional_commands: Vec<IntentionalCommand>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub timing: TimingSettings,
    /// Clone views opened into a hidden group back into the maximized one
    /// instead of switching panes. Only needed on hosts that lose the
    /// viewport when a view is reopened in another group.
    pub clone_workaround: bool,
    /// Status bar text shown on the maximized view. Empty disables it.
    pub status_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            settings: Settings::default(),
            intentional_commands: default_intentional_commands(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            timing: TimingSettings::default(),
            clone_workaround: true,
            status_label: "MAXIMIZED".to_string(),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingSettings {
    /// Delay between the steps of an unmaximize/re-maximize sequence.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub fix_delay: Duration,
    /// Watchdog that releases the focus guard if a sequence never finishes.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub guard_timeout: Duration,
    /// Default grace window for intentional pane switches.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub switch_grace: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub handoff_index_delay: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub handoff_focus_delay: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub handoff_selection_delay: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub restore_step_delay: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub loading_poll: Duration,
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            fix_delay: Duration::from_millis(100),
            guard_timeout: Duration::from_millis(3000),
            switch_grace: Duration::from_millis(2000),
            handoff_index_delay: Duration::from_millis(100),
            handoff_focus_delay: Duration::from_millis(100),
            handoff_selection_delay: Duration::from_millis(150),
            restore_step_delay: Duration::from_millis(100),
            loading_poll: Duration::from_millis(100),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentionalCommand {
    pub name: String,
    /// Overrides `settings.timing.switch_grace` for this command.
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub grace: Option<Duration>,
}

impl IntentionalCommand {
    fn new(name: &str) -> Self { Self { name: name.to_string(), grace: None } }

    fn with_grace(name: &str, grace: Duration) -> Self {
        Self { name: name.to_string(), grace: Some(grace) }
    }
}

fn default_intentional_commands() -> Vec<IntentionalCommand> {
    let mut commands: Vec<IntentionalCommand> = [
        "travel_to_pane",
        "carry_file_to_pane",
        "clone_file_to_pane",
        "create_pane",
        "destroy_pane",
        "set_layout",
        "new_pane",
        "focus_group",
        "move_to_group",
        "drag_select",
        "jump_back",
        "jump_forward",
        "context_menu",
        "reopen_last_file",
    ]
    .into_iter()
    .map(IntentionalCommand::new)
    .collect();
    // Switching projects reloads every view before focus settles.
    commands.push(IntentionalCommand::with_grace(
        "prompt_select_workspace",
        Duration::from_millis(10_000),
    ));
    commands
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&buf).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }

    /// Loads `path` if given, otherwise the default config file when it
    /// exists, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        if let Some(path) = path {
            return Self::read(path);
        }
        match config_file() {
            Some(path) if path.exists() => Self::read(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Grace window armed by `command`, if it is an intentional pane switch.
    pub fn switch_grace_for(&self, command: &str) -> Option<Duration> {
        self.intentional_commands
            .iter()
            .find(|c| c.name == command)
            .map(|c| c.grace.unwrap_or(self.settings.timing.switch_grace))
    }
}
