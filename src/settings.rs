use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Title of the host window.
    pub window_name: String,
    /// Host window size in pixels.
    pub window_size: (i32, i32),
    /// Host window position in screen pixels.
    pub window_pos: (i32, i32),
    /// Remember the window size and position on exit.
    pub restore_position: bool,
    pub topmost: bool,
    pub borderless: bool,
    /// Hide the window from Alt+Tab and the taskbar.
    pub tool_window: bool,
    /// Window opacity, 0 fully transparent to 255 opaque.
    pub transparency: u8,
    /// Keep the arrow cursor over the window regardless of what the page asks for.
    pub cursor_lock: bool,
    pub quit_hotkey: Option<String>,
    pub visibility_hotkey: Option<String>,
    pub click_through_hotkey: Option<String>,
    pub settings_hotkey: Option<String>,
    pub screenshot_hotkey: Option<String>,
    /// Height of the toolbar drawn above the embedded surface, in points.
    pub toolbar_height: f32,
    /// Window class of the embedded browser surface.
    pub surface_class: String,
    /// When enabled the application initialises the logger at debug level.
    pub debug_logging: bool,
    /// Write logs to this file instead of stdout.
    pub log_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_name: "WebFrame".into(),
            window_size: (800, 600),
            window_pos: (100, 100),
            restore_position: false,
            topmost: false,
            borderless: false,
            tool_window: false,
            transparency: 255,
            cursor_lock: false,
            quit_hotkey: None,
            visibility_hotkey: None,
            click_through_hotkey: None,
            settings_hotkey: None,
            screenshot_hotkey: None,
            toolbar_height: 28.0,
            surface_class: "Chrome_WidgetWin_0".into(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Store the window's last geometry if `restore_position` is on.
    ///
    /// Returns whether anything was stored.
    pub fn remember_window_rect(&mut self, pos: (i32, i32), size: (i32, i32)) -> bool {
        if !self.restore_position {
            return false;
        }
        self.window_pos = pos;
        self.window_size = size;
        true
    }
}
