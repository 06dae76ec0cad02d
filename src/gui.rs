use crate::compositor::PanelKind;
use crate::geometry::Rect;
use crate::keyboard_hook::KeyboardHook;
use crate::screenshot::ScreenshotSession;
use crate::settings::Settings;
use crate::shell::{Shell, ShellCommand, WindowProps};
use crate::window_control::NoopWindowControl;
use eframe::egui;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

#[cfg(windows)]
use crate::compositor::RegionCompositor;
#[cfg(windows)]
use crate::surface::Win32Surface;
#[cfg(windows)]
use windows::Win32::Foundation::HWND;

const SETTINGS_PANEL_WIDTH: f32 = 500.0;
const SCREENSHOT_PANEL_SIZE: [f32; 2] = [600.0, 391.0];
const SCREENSHOT_FOOTER_HEIGHT: f32 = 28.0;
const COMMAND_POLL: Duration = Duration::from_millis(100);

/// Convert an egui rectangle in points to whole client pixels, rounding
/// outwards so the punched hole never leaves a sliver of surface on top of
/// the panel.
pub fn to_pixel_rect(rect: egui::Rect, pixels_per_point: f32) -> Rect {
    Rect::new(
        (rect.min.x * pixels_per_point).floor() as i32,
        (rect.min.y * pixels_per_point).floor() as i32,
        (rect.max.x * pixels_per_point).ceil() as i32,
        (rect.max.y * pixels_per_point).ceil() as i32,
    )
}

/// Largest size with the image's aspect ratio that fits in `available`.
pub fn fit_size(image: [usize; 2], available: egui::Vec2) -> egui::Vec2 {
    let [width, height] = image;
    if width == 0 || height == 0 || available.x <= 0.0 || available.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let image = egui::vec2(width as f32, height as f32);
    let scale = (available.x / image.x).min(available.y / image.y);
    image * scale
}

#[cfg(windows)]
fn read_bounds(surface: &Win32Surface) -> anyhow::Result<(Rect, Rect)> {
    Ok((surface.host_bounds()?, surface.surface_bounds()?))
}

#[cfg(windows)]
fn get_hwnd(frame: &eframe::Frame) -> Option<HWND> {
    use raw_window_handle::{HasWindowHandle, RawWindowHandle};
    match frame.window_handle().ok()?.as_raw() {
        RawWindowHandle::Win32(handle) => Some(HWND(handle.hwnd.get() as *mut core::ffi::c_void)),
        _ => None,
    }
}

/// Per-frame driver: drains shell commands, lays out the overlay panels and
/// reports them to the region compositor.
pub struct ShellApp {
    settings: Settings,
    settings_path: String,
    shell: Shell,
    commands: Receiver<ShellCommand>,
    tx: Sender<ShellCommand>,
    hook: Option<KeyboardHook>,
    window_attached: bool,
    screenshot_placed: bool,
    screenshot: ScreenshotSession,
    screenshot_visible: bool,
    screenshot_texture: Option<(u64, egui::TextureHandle)>,
    last_window_rect: Option<((i32, i32), (i32, i32))>,
    #[cfg(windows)]
    host: Option<HWND>,
    #[cfg(windows)]
    compositor: Option<RegionCompositor<Win32Surface>>,
}

impl ShellApp {
    pub fn new(
        settings: Settings,
        settings_path: impl Into<String>,
        hook: Option<KeyboardHook>,
        tx: Sender<ShellCommand>,
        commands: Receiver<ShellCommand>,
    ) -> Self {
        let shell = Shell::new(
            WindowProps::from_settings(&settings),
            Box::new(NoopWindowControl),
        );
        Self {
            settings,
            settings_path: settings_path.into(),
            shell,
            commands,
            tx,
            hook,
            window_attached: false,
            screenshot_placed: false,
            screenshot: ScreenshotSession::primary_screen(),
            screenshot_visible: false,
            screenshot_texture: None,
            last_window_rect: None,
            #[cfg(windows)]
            host: None,
            #[cfg(windows)]
            compositor: None,
        }
    }

    fn attach_window(&mut self, _frame: &eframe::Frame) {
        if self.window_attached {
            return;
        }
        #[cfg(windows)]
        {
            let Some(hwnd) = get_hwnd(_frame) else {
                return;
            };
            self.host = Some(hwnd);
            self.shell.attach_window(Box::new(
                crate::window_control::Win32WindowControl::new(hwnd),
            ));
        }
        self.shell.apply_initial();
        self.window_attached = true;
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            let reopening_screenshot = command == ShellCommand::ToggleScreenshot
                && !self.shell.panel(PanelKind::Screenshot).visible;
            if reopening_screenshot {
                self.screenshot_placed = false;
            }
            self.shell.update(command);
        }
    }

    fn send(&self, command: ShellCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!(?command, "shell command channel closed");
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar")
            .exact_height(self.settings.toolbar_height)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    if ui.button("Screenshot").clicked() {
                        self.send(ShellCommand::ToggleScreenshot);
                    }
                    if ui.button("Settings").clicked() {
                        self.send(ShellCommand::ToggleSettings);
                    }
                    if self.shell.click_through() {
                        ui.label("click-through");
                    }
                });
            });
    }

    fn settings_panel(&mut self, ctx: &egui::Context) {
        if !self.shell.panel(PanelKind::Settings).visible {
            return;
        }
        let screen = ctx.screen_rect();
        let top = self.settings.toolbar_height + 4.5;
        let mut open = true;
        let mut props = self.shell.props();
        let response = egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .movable(false)
            .fixed_pos([(screen.max.x - SETTINGS_PANEL_WIDTH).max(0.0), top])
            .fixed_size([SETTINGS_PANEL_WIDTH, (screen.max.y - top).max(0.0)])
            .show(ctx, |ui| {
                ui.checkbox(&mut props.topmost, "Always on top");
                ui.checkbox(&mut props.borderless, "Borderless");
                ui.checkbox(&mut props.tool_window, "Tool window");
                ui.checkbox(&mut props.cursor_lock, "Lock cursor shape");
                ui.add(egui::Slider::new(&mut props.transparency, 0..=255).text("Opacity"));
            });

        self.apply_props(props);
        self.record_panel(ctx, PanelKind::Settings, open, response.map(|r| r.response.rect));
    }

    fn screenshot_panel(&mut self, ctx: &egui::Context) {
        if !self.shell.panel(PanelKind::Screenshot).visible {
            return;
        }
        let mut open = true;
        let mut window = egui::Window::new("Screenshot")
            .open(&mut open)
            .collapsible(false);
        if !self.screenshot_placed {
            let center_x = ctx.screen_rect().center().x;
            window = window
                .current_pos([
                    center_x - SCREENSHOT_PANEL_SIZE[0] / 2.0,
                    self.settings.toolbar_height + 10.0,
                ])
                .default_size(SCREENSHOT_PANEL_SIZE);
            self.screenshot_placed = true;
        }
        let texture = self.screenshot_texture(ctx);
        let mut copy_requested = false;
        let response = window.show(ctx, |ui| {
            let available = egui::vec2(
                ui.available_width(),
                SCREENSHOT_PANEL_SIZE[1] - SCREENSHOT_FOOTER_HEIGHT,
            );
            match &texture {
                Some(texture) => {
                    let size = fit_size(texture.size(), available);
                    ui.add(egui::Image::new(texture).fit_to_exact_size(size));
                }
                None => {
                    ui.allocate_ui(available, |ui| {
                        ui.centered_and_justified(|ui| ui.label("Screenshot not available"));
                    });
                }
            }
            ui.horizontal(|ui| {
                if let Some(pos) = ui.ctx().pointer_latest_pos() {
                    ui.label(format!("Coordinates x: {:.0}, y: {:.0}", pos.x, pos.y));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let copy =
                        ui.add_enabled(texture.is_some(), egui::Button::new("Copy to Clipboard"));
                    copy_requested = copy.clicked();
                });
            });
        });
        if copy_requested {
            if let Err(err) = self.screenshot.copy_to_clipboard() {
                tracing::error!(?err, "failed to copy screenshot to clipboard");
            }
        }
        self.record_panel(ctx, PanelKind::Screenshot, open, response.map(|r| r.response.rect));
    }

    /// Texture for the current capture, uploaded again after each new capture.
    fn screenshot_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureHandle> {
        let Some(image) = self.screenshot.image() else {
            self.screenshot_texture = None;
            return None;
        };
        let generation = self.screenshot.generation();
        if !matches!(&self.screenshot_texture, Some((uploaded, _)) if *uploaded == generation) {
            let size = [image.width() as usize, image.height() as usize];
            let texture = ctx.load_texture(
                "screenshot",
                egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw()),
                egui::TextureOptions::LINEAR,
            );
            self.screenshot_texture = Some((generation, texture));
        }
        self.screenshot_texture.as_ref().map(|(_, texture)| texture.clone())
    }

    /// Capture when the screenshot panel opens and release when it closes,
    /// whichever path toggled it.
    fn sync_screenshot(&mut self) {
        let visible = self.shell.panel(PanelKind::Screenshot).visible;
        if visible != self.screenshot_visible {
            self.screenshot_visible = visible;
            self.screenshot.set_visible(visible);
        }
    }

    fn apply_props(&mut self, props: WindowProps) {
        let current = self.shell.props();
        if props.topmost != current.topmost {
            self.shell.update(ShellCommand::SetTopmost(props.topmost));
        }
        if props.borderless != current.borderless {
            self.shell.update(ShellCommand::SetBorderless(props.borderless));
        }
        if props.tool_window != current.tool_window {
            self.shell.update(ShellCommand::SetToolWindow(props.tool_window));
        }
        if props.transparency != current.transparency {
            self.shell.update(ShellCommand::SetTransparency(props.transparency));
        }
        if props.cursor_lock != current.cursor_lock {
            self.shell.update(ShellCommand::SetCursorLock(props.cursor_lock));
        }
    }

    fn record_panel(
        &mut self,
        ctx: &egui::Context,
        kind: PanelKind,
        open: bool,
        rect: Option<egui::Rect>,
    ) {
        if let Some(rect) = rect {
            self.shell
                .set_panel_bounds(kind, to_pixel_rect(rect, ctx.pixels_per_point()));
        }
        if !open {
            self.shell.set_panel_visible(kind, false);
        }
    }

    #[cfg(windows)]
    fn composite(&mut self) {
        let Some(host) = self.host else {
            return;
        };
        if self
            .compositor
            .as_ref()
            .is_some_and(|c| !c.surface().is_alive())
        {
            tracing::info!("embedded surface went away");
            self.compositor = None;
        }
        if self.compositor.is_none() {
            let Some(surface) = Win32Surface::find_child(host, &self.settings.surface_class) else {
                return;
            };
            tracing::info!(class = %self.settings.surface_class, "embedded surface found");
            self.compositor = Some(RegionCompositor::new(surface));
        }
        let Some(compositor) = self.compositor.as_mut() else {
            return;
        };

        match read_bounds(compositor.surface()) {
            Ok((host_bounds, surface_bounds)) => {
                compositor.notify_frame(host_bounds, surface_bounds, &self.shell.panels());
            }
            Err(err) => tracing::warn!(?err, "failed to read surface bounds"),
        }
    }

    #[cfg(not(windows))]
    fn composite(&mut self) {}

    fn track_window_rect(&mut self, ctx: &egui::Context) {
        let ppp = ctx.pixels_per_point();
        if let Some(rect) = ctx.input(|i| i.viewport().outer_rect) {
            let px = to_pixel_rect(rect, ppp);
            self.last_window_rect = Some(((px.left, px.top), (px.width(), px.height())));
        }
    }
}

impl eframe::App for ShellApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.attach_window(frame);
        self.drain_commands();
        if !self.shell.is_running() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.toolbar(ctx);
        self.sync_screenshot();
        self.screenshot_panel(ctx);
        self.settings_panel(ctx);
        self.sync_screenshot();
        self.composite();
        self.track_window_rect(ctx);

        // Hotkey commands arrive off-frame; keep polling for them.
        ctx.request_repaint_after(COMMAND_POLL);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(mut hook) = self.hook.take() {
            if let Err(err) = hook.uninstall() {
                tracing::warn!(?err, "failed to uninstall keyboard hook");
            }
        }
        #[cfg(windows)]
        if let Some(compositor) = self.compositor.as_mut() {
            compositor.shutdown();
        }

        self.shell.props().store(&mut self.settings);
        if let Some((pos, size)) = self.last_window_rect {
            self.settings.remember_window_rect(pos, size);
        }
        if let Err(err) = self.settings.save(&self.settings_path) {
            tracing::error!(?err, path = %self.settings_path, "failed to save settings");
        }
    }
}
