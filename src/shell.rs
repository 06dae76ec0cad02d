use crate::compositor::{OverlayPanel, PanelKind};
use crate::geometry::Rect;
use crate::hotkey::HotkeyEngine;
use crate::settings::Settings;
use crate::window_control::WindowControl;
use std::sync::mpsc::Sender;

/// Everything that can change the shell's state, from hotkeys or the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Quit,
    ToggleVisibility,
    ToggleClickThrough,
    ToggleSettings,
    ToggleScreenshot,
    SetTopmost(bool),
    SetBorderless(bool),
    SetToolWindow(bool),
    SetTransparency(u8),
    SetCursorLock(bool),
}

/// Window properties the settings panel edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowProps {
    pub topmost: bool,
    pub borderless: bool,
    pub tool_window: bool,
    pub transparency: u8,
    pub cursor_lock: bool,
}

impl WindowProps {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            topmost: settings.topmost,
            borderless: settings.borderless,
            tool_window: settings.tool_window,
            transparency: settings.transparency,
            cursor_lock: settings.cursor_lock,
        }
    }

    pub fn store(&self, settings: &mut Settings) {
        settings.topmost = self.topmost;
        settings.borderless = self.borderless;
        settings.tool_window = self.tool_window;
        settings.transparency = self.transparency;
        settings.cursor_lock = self.cursor_lock;
    }
}

/// Shell state driven by [`ShellCommand`]s through [`Shell::update`].
pub struct Shell {
    running: bool,
    click_through: bool,
    props: WindowProps,
    settings_panel: OverlayPanel,
    screenshot_panel: OverlayPanel,
    window: Box<dyn WindowControl>,
}

impl Shell {
    pub fn new(props: WindowProps, window: Box<dyn WindowControl>) -> Self {
        Self {
            running: true,
            click_through: false,
            props,
            settings_panel: OverlayPanel::hidden(PanelKind::Settings),
            screenshot_panel: OverlayPanel::hidden(PanelKind::Screenshot),
            window,
        }
    }

    /// Swap in the real window once its handle is known.
    pub fn attach_window(&mut self, window: Box<dyn WindowControl>) {
        self.window = window;
    }

    /// Push the configured window properties to the OS.
    pub fn apply_initial(&mut self) {
        let props = self.props;
        self.update(ShellCommand::SetTopmost(props.topmost));
        self.update(ShellCommand::SetBorderless(props.borderless));
        self.update(ShellCommand::SetToolWindow(props.tool_window));
        self.update(ShellCommand::SetTransparency(props.transparency));
        self.update(ShellCommand::SetCursorLock(props.cursor_lock));
    }

    pub fn update(&mut self, command: ShellCommand) {
        tracing::debug!(?command, "shell command");
        let result = match command {
            ShellCommand::Quit => {
                self.running = false;
                Ok(())
            }
            ShellCommand::ToggleVisibility => self.window.toggle_visibility(),
            ShellCommand::ToggleClickThrough => {
                self.click_through = !self.click_through;
                self.window.set_click_through(self.click_through)
            }
            ShellCommand::ToggleSettings => {
                self.settings_panel.visible = !self.settings_panel.visible;
                Ok(())
            }
            ShellCommand::ToggleScreenshot => {
                self.screenshot_panel.visible = !self.screenshot_panel.visible;
                Ok(())
            }
            ShellCommand::SetTopmost(topmost) => {
                self.props.topmost = topmost;
                self.window.set_topmost(topmost)
            }
            ShellCommand::SetBorderless(borderless) => {
                self.props.borderless = borderless;
                self.window.set_borderless(borderless)
            }
            ShellCommand::SetToolWindow(tool_window) => {
                self.props.tool_window = tool_window;
                self.window.set_tool_window(tool_window)
            }
            ShellCommand::SetTransparency(alpha) => {
                self.props.transparency = alpha;
                self.window.set_transparency(alpha)
            }
            ShellCommand::SetCursorLock(locked) => {
                self.props.cursor_lock = locked;
                self.window.set_cursor_lock(locked)
            }
        };
        if let Err(err) = result {
            tracing::error!(?command, ?err, "shell command failed");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn click_through(&self) -> bool {
        self.click_through
    }

    pub fn props(&self) -> WindowProps {
        self.props
    }

    pub fn panel(&self, kind: PanelKind) -> &OverlayPanel {
        match kind {
            PanelKind::Settings => &self.settings_panel,
            PanelKind::Screenshot => &self.screenshot_panel,
        }
    }

    pub fn set_panel_visible(&mut self, kind: PanelKind, visible: bool) {
        self.panel_mut(kind).visible = visible;
    }

    /// Record where the panel's layout placed it this frame.
    pub fn set_panel_bounds(&mut self, kind: PanelKind, bounds: Rect) {
        self.panel_mut(kind).bounds = bounds;
    }

    pub fn panels(&self) -> [OverlayPanel; 2] {
        [self.settings_panel, self.screenshot_panel]
    }

    fn panel_mut(&mut self, kind: PanelKind) -> &mut OverlayPanel {
        match kind {
            PanelKind::Settings => &mut self.settings_panel,
            PanelKind::Screenshot => &mut self.screenshot_panel,
        }
    }
}

/// Register every configured hotkey; each one posts its command on `tx`.
///
/// Returns the number of hotkeys bound. Blank or unset chords are skipped.
pub fn bind_hotkeys(
    engine: &mut HotkeyEngine,
    settings: &Settings,
    tx: &Sender<ShellCommand>,
) -> usize {
    let bindings = [
        (&settings.quit_hotkey, ShellCommand::Quit),
        (&settings.visibility_hotkey, ShellCommand::ToggleVisibility),
        (&settings.click_through_hotkey, ShellCommand::ToggleClickThrough),
        (&settings.settings_hotkey, ShellCommand::ToggleSettings),
        (&settings.screenshot_hotkey, ShellCommand::ToggleScreenshot),
    ];

    let mut bound = 0;
    for (chord, command) in bindings {
        let Some(chord) = chord.as_deref() else {
            continue;
        };
        let tx = tx.clone();
        let registered = engine.register_binding(chord, move || {
            tx.send(command)
                .map_err(|_| anyhow::anyhow!("shell command channel closed"))
        });
        if registered {
            tracing::info!(chord, ?command, "hotkey bound");
            bound += 1;
        }
    }
    bound
}
