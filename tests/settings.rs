use tempfile::tempdir;
use webframe::settings::Settings;

#[test]
fn missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.transparency, 255);
    assert!(settings.quit_hotkey.is_none());
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{ "quit_hotkey": "Ctrl+Q", "topmost": true, "cursor_lock": true }"#,
    )
    .unwrap();

    let settings = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings.quit_hotkey.as_deref(), Some("Ctrl+Q"));
    assert!(settings.topmost);
    assert!(settings.cursor_lock);
    assert_eq!(settings.window_size, (800, 600));
    assert_eq!(settings.surface_class, "Chrome_WidgetWin_0");
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(Settings::load(path.to_str().unwrap()).is_err());
}

#[test]
fn save_then_load_preserves_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let path = path.to_str().unwrap();

    let mut settings = Settings::default();
    settings.visibility_hotkey = Some("Ctrl+Shift+H".into());
    settings.transparency = 200;
    settings.log_file = Some("webframe.log".into());
    settings.save(path).unwrap();

    assert_eq!(Settings::load(path).unwrap(), settings);
}

#[test]
fn window_rect_only_remembered_when_enabled() {
    let mut settings = Settings::default();
    assert!(!settings.remember_window_rect((5, 6), (640, 480)));
    assert_eq!(settings.window_pos, (100, 100));

    settings.restore_position = true;
    assert!(settings.remember_window_rect((5, 6), (640, 480)));
    assert_eq!(settings.window_pos, (5, 6));
    assert_eq!(settings.window_size, (640, 480));
}
