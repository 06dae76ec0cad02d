use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use webframe::hotkey::HotkeyEngine;

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn bind_counter(engine: &mut HotkeyEngine, chord: &str, hits: &Arc<AtomicUsize>) {
    let hits = Arc::clone(hits);
    assert!(engine.register_binding(chord, move || {
        hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
}

#[test]
fn ctrl_q_fires_once() {
    let mut engine = HotkeyEngine::new();
    let hits = counter();
    bind_counter(&mut engine, "Ctrl+Q", &hits);

    assert!(!engine.on_key_transition("Ctrl", true));
    assert!(engine.on_key_transition("Q", true));
    assert!(!engine.on_key_transition("Q", false));
    assert!(!engine.on_key_transition("Ctrl", false));

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(engine.pressed().is_empty());
}

#[test]
fn auto_repeat_does_not_refire() {
    let mut engine = HotkeyEngine::new();
    let hits = counter();
    bind_counter(&mut engine, "Ctrl+Q", &hits);

    engine.on_key_transition("Ctrl", true);
    engine.on_key_transition("Q", true);
    for _ in 0..5 {
        assert!(!engine.on_key_transition("Q", true));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(engine.pressed().len(), 2);
}

#[test]
fn chord_matches_in_press_order_only() {
    let mut engine = HotkeyEngine::new();
    let hits = counter();
    bind_counter(&mut engine, "Ctrl+Shift+A", &hits);

    engine.on_key_transition("Shift", true);
    engine.on_key_transition("Ctrl", true);
    engine.on_key_transition("A", true);
    assert_eq!(engine.pressed_chord(), "Shift+Ctrl+A");
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    engine.release_all();
    engine.on_key_transition("Ctrl", true);
    engine.on_key_transition("Shift", true);
    engine.on_key_transition("A", true);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn releasing_a_key_keeps_remaining_order() {
    let mut engine = HotkeyEngine::new();
    for key in ["Ctrl", "Alt", "Shift"] {
        engine.on_key_transition(key, true);
    }
    engine.on_key_transition("Alt", false);
    assert_eq!(engine.pressed_chord(), "Ctrl+Shift");
    assert!(!engine.pressed().contains("Alt"));
}

#[test]
fn release_can_complete_a_chord() {
    let mut engine = HotkeyEngine::new();
    let hits = counter();
    bind_counter(&mut engine, "Ctrl", &hits);

    engine.on_key_transition("Ctrl", true);
    engine.on_key_transition("Q", true);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    // Ctrl alone is held again once Q goes up.
    engine.on_key_transition("Q", false);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn release_of_unknown_key_is_ignored() {
    let mut engine = HotkeyEngine::new();
    let hits = counter();
    bind_counter(&mut engine, "Ctrl", &hits);

    engine.on_key_transition("Ctrl", true);
    assert!(!engine.on_key_transition("Q", false));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(engine.pressed_chord(), "Ctrl");
}

#[test]
fn spelling_variants_hit_the_same_binding() {
    let mut engine = HotkeyEngine::new();
    let first = counter();
    let second = counter();
    bind_counter(&mut engine, "ctrl +   q", &first);
    bind_counter(&mut engine, "Ctrl+Q", &second);

    assert_eq!(engine.binding_count(), 1);
    assert!(engine.is_registered("CTRL+q"));

    engine.on_key_transition("Ctrl", true);
    engine.on_key_transition("Q", true);
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn blank_spec_is_rejected() {
    let mut engine = HotkeyEngine::new();
    assert!(!engine.register_binding("", || Ok(())));
    assert!(!engine.register_binding(" + + ", || Ok(())));
    assert_eq!(engine.binding_count(), 0);
}

#[test]
fn unregister_unknown_chord_is_noop() {
    let mut engine = HotkeyEngine::new();
    let hits = counter();
    bind_counter(&mut engine, "Alt+F4", &hits);

    assert!(!engine.unregister_binding("Ctrl+Q"));
    assert_eq!(engine.binding_count(), 1);
    assert!(engine.unregister_binding("alt + f4"));
    assert_eq!(engine.binding_count(), 0);

    engine.on_key_transition("Alt", true);
    assert!(!engine.on_key_transition("F4", true));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn failing_action_does_not_poison_engine() {
    let mut engine = HotkeyEngine::new();
    engine.register_binding("Ctrl+E", || Err(anyhow::anyhow!("boom")));
    engine.register_binding("Ctrl+P", || panic!("action panicked"));
    let hits = counter();
    bind_counter(&mut engine, "Ctrl+K", &hits);

    engine.on_key_transition("Ctrl", true);
    assert!(engine.on_key_transition("E", true));
    engine.on_key_transition("E", false);
    assert!(engine.on_key_transition("P", true));
    engine.on_key_transition("P", false);
    assert!(engine.on_key_transition("K", true));

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn release_all_clears_held_keys() {
    let mut engine = HotkeyEngine::new();
    engine.on_key_transition("Ctrl", true);
    engine.on_key_transition("Alt", true);
    engine.release_all();
    assert!(engine.pressed().is_empty());
    assert_eq!(engine.pressed_chord(), "");
}

#[test]
fn pressed_keys_track_press_order_for_random_sequences() {
    const KEYS: [&str; 6] = ["Ctrl", "Alt", "Shift", "Win", "A", "Pageup"];
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..50 {
        let mut engine = HotkeyEngine::new();
        let mut model: Vec<&str> = Vec::new();

        for _ in 0..200 {
            let key = KEYS[rng.gen_range(0..KEYS.len())];
            let is_down = rng.gen_bool(0.55);
            engine.on_key_transition(key, is_down);

            if is_down {
                if !model.contains(&key) {
                    model.push(key);
                }
            } else {
                model.retain(|held| *held != key);
            }

            let held: Vec<&str> = engine.pressed().iter().collect();
            assert_eq!(held, model);
            assert_eq!(engine.pressed_chord(), model.join("+"));
        }
    }
}
