use hashlink::LinkedHashSet;

pub const CHORD_SEPARATOR: char = '+';

/// Title-case every whitespace separated word of a key name.
///
/// `"right   CTRL"` becomes `"Right Ctrl"`. Runs of whitespace collapse to a
/// single space.
pub fn normalize_key_name(name: &str) -> String {
    name.split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical form of a chord spec such as `"ctrl +   shift+a"`.
///
/// Tokens keep the order they were written in; empty tokens are dropped. An
/// empty result means the spec names no key at all.
pub fn normalize_chord(spec: &str) -> String {
    spec.split(CHORD_SEPARATOR)
        .map(normalize_key_name)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join("+")
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keys currently held down, in the order they were pressed.
#[derive(Debug, Default, Clone)]
pub struct PressedKeys {
    keys: LinkedHashSet<String>,
}

impl PressedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down. Returns `false` when the key was already held.
    pub fn press(&mut self, key: &str) -> bool {
        if self.keys.contains(key) {
            return false;
        }
        self.keys.insert(key.to_string())
    }

    /// Record a key-up. Returns `false` when the key was not held.
    pub fn release(&mut self, key: &str) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Held keys joined in press order, e.g. `"Ctrl+Shift+A"`.
    pub fn chord(&self) -> String {
        self.iter().collect::<Vec<_>>().join("+")
    }
}
