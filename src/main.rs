use anyhow::anyhow;
use eframe::egui;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use webframe::gui::ShellApp;
use webframe::hotkey::HotkeyEngine;
use webframe::keyboard_hook::KeyboardHook;
use webframe::settings::{Settings, SETTINGS_FILE};
use webframe::shell::bind_hotkeys;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    webframe::logging::init(settings.debug_logging, settings.log_file.as_ref().map(PathBuf::from));

    let (tx, rx) = mpsc::channel();
    let engine = Arc::new(Mutex::new(HotkeyEngine::new()));
    {
        let mut engine = engine
            .lock()
            .map_err(|_| anyhow!("hotkey engine lock poisoned"))?;
        let bound = bind_hotkeys(&mut engine, &settings, &tx);
        tracing::info!(bound, "hotkeys configured");
    }

    let mut hook = KeyboardHook::new(Arc::clone(&engine));
    let hook = match hook.install() {
        Ok(()) => Some(hook),
        Err(err) => {
            tracing::error!(?err, "global hotkeys unavailable; continuing without them");
            None
        }
    };

    let (width, height) = settings.window_size;
    let (x, y) = settings.window_pos;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(settings.window_name.clone())
            .with_inner_size([width as f32, height as f32])
            .with_position([x as f32, y as f32]),
        ..Default::default()
    };

    let title = settings.window_name.clone();
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| Box::new(ShellApp::new(settings, SETTINGS_FILE, hook, tx, rx))),
    )
    .map_err(|err| anyhow!("failed to run shell window: {err}"))
}
