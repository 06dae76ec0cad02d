pub mod chord;
pub mod compositor;
pub mod geometry;
pub mod gui;
pub mod hotkey;
pub mod keyboard_hook;
pub mod logging;
pub mod screenshot;
pub mod settings;
pub mod shell;
#[cfg(windows)]
pub mod surface;
pub mod window_control;
