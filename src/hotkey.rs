use crate::chord::{normalize_chord, PressedKeys};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

/// Work bound to a chord.
///
/// Runs inside the keyboard intercept with the engine locked, so it must
/// return quickly and must not call back into the engine. Enqueue a command
/// rather than doing the work inline.
pub type HotkeyAction = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

/// Press-order chord recognizer.
///
/// Held keys are joined in the order they went down and looked up verbatim,
/// so a binding for `"Ctrl+Shift+A"` does not fire for Shift, Ctrl, A.
#[derive(Default)]
pub struct HotkeyEngine {
    bindings: HashMap<String, HotkeyAction>,
    pressed: PressedKeys,
}

impl std::fmt::Debug for HotkeyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyEngine")
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .field("pressed", &self.pressed)
            .finish()
    }
}

impl HotkeyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `action` to the chord. Returns `false` for a blank spec.
    ///
    /// Registering a chord that is already bound replaces the old action.
    pub fn register_binding<F>(&mut self, chord_spec: &str, action: F) -> bool
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let chord = normalize_chord(chord_spec);
        if chord.is_empty() {
            tracing::warn!(spec = chord_spec, "ignoring blank hotkey");
            return false;
        }
        if self.bindings.insert(chord.clone(), Box::new(action)).is_some() {
            tracing::debug!(%chord, "hotkey rebound");
        } else {
            tracing::debug!(%chord, "hotkey registered");
        }
        true
    }

    pub fn unregister_binding(&mut self, chord_spec: &str) -> bool {
        let chord = normalize_chord(chord_spec);
        if chord.is_empty() {
            return false;
        }
        let removed = self.bindings.remove(&chord).is_some();
        if removed {
            tracing::debug!(%chord, "hotkey unregistered");
        }
        removed
    }

    pub fn is_registered(&self, chord_spec: &str) -> bool {
        self.bindings.contains_key(&normalize_chord(chord_spec))
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn pressed(&self) -> &PressedKeys {
        &self.pressed
    }

    pub fn pressed_chord(&self) -> String {
        self.pressed.chord()
    }

    /// Forget every held key.
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    /// Feed one key transition; returns whether a bound action ran.
    ///
    /// Auto-repeat key-downs and key-ups for keys that were never seen going
    /// down leave the held set unchanged and dispatch nothing.
    pub fn on_key_transition(&mut self, key_name: &str, is_down: bool) -> bool {
        let changed = if is_down {
            self.pressed.press(key_name)
        } else {
            self.pressed.release(key_name)
        };
        if !changed {
            return false;
        }

        let chord = self.pressed.chord();
        if chord.is_empty() {
            return false;
        }
        let Some(action) = self.bindings.get_mut(&chord) else {
            return false;
        };

        tracing::debug!(%chord, "hotkey fired");
        match panic::catch_unwind(AssertUnwindSafe(|| action())) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!(%chord, ?err, "hotkey action failed"),
            Err(payload) => {
                let panic_message = if let Some(message) = payload.downcast_ref::<&str>() {
                    (*message).to_string()
                } else if let Some(message) = payload.downcast_ref::<String>() {
                    message.clone()
                } else {
                    "unknown panic payload".to_string()
                };
                tracing::error!(%chord, panic_message, "hotkey action panicked");
            }
        }
        true
    }
}
