//! # Shortcut Dispatcher
//!
//! Maps normalized key chords to command values.
//!
//! ## Design
//!
//! - A chord is a modifier set plus one lowercased key; parsing is
//!   case-insensitive and order-insensitive ("Ctrl+Shift+Z" == "shift+ctrl+z")
//! - `mod` names the platform primary modifier; the binder expands it to
//!   both conventional forms (ctrl and meta), so one logical shortcut works
//!   identically across environments
//! - Binding a chord overwrites any prior binding for it
//! - The map is generic over the command type; it stores values, not
//!   callbacks, so the host decides what execution means

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShortcutError {
    #[error("Invalid key chord: {0}")]
    InvalidChord(String),
}

/// Normalized modifier set + key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: String,
}

impl KeyChord {
    /// Parse a chord spec like "Ctrl+Shift+Z".
    ///
    /// `mod` parses as ctrl here; `ShortcutMap::bind` additionally expands
    /// it to the meta form.
    pub fn parse(spec: &str) -> Result<Self, ShortcutError> {
        let (chord, _) = parse_spec(spec)?;
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.shift {
            write!(f, "shift+")?;
        }
        if self.meta {
            write!(f, "meta+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Parse a spec; the bool reports whether `mod` was used
fn parse_spec(spec: &str) -> Result<(KeyChord, bool), ShortcutError> {
    let mut chord = KeyChord {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
        key: String::new(),
    };
    let mut primary = false;

    for token in spec.split('+') {
        let token = token.trim().to_lowercase();
        match token.as_str() {
            "ctrl" | "control" => chord.ctrl = true,
            "alt" | "option" => chord.alt = true,
            "shift" => chord.shift = true,
            "meta" | "cmd" | "command" | "super" => chord.meta = true,
            "mod" => primary = true,
            "" => return Err(ShortcutError::InvalidChord(spec.to_string())),
            key => {
                if !chord.key.is_empty() {
                    return Err(ShortcutError::InvalidChord(spec.to_string()));
                }
                chord.key = key.to_string();
            }
        }
    }
    if chord.key.is_empty() {
        return Err(ShortcutError::InvalidChord(spec.to_string()));
    }
    if primary {
        chord.ctrl = true;
    }
    Ok((chord, primary))
}

/// Raw key input as reported by the host surface
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn chord(&self) -> KeyChord {
        KeyChord {
            ctrl: self.ctrl,
            alt: self.alt,
            shift: self.shift,
            meta: self.meta,
            key: self.key.to_lowercase(),
        }
    }
}

/// Chord → command table
#[derive(Debug, Clone)]
pub struct ShortcutMap<C> {
    bindings: HashMap<KeyChord, C>,
}

impl<C: Clone> ShortcutMap<C> {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a chord spec to a command, overwriting any prior binding.
    ///
    /// A `mod` spec binds both the ctrl and the meta form.
    pub fn bind(&mut self, spec: &str, command: C) -> Result<(), ShortcutError> {
        let (chord, primary) = parse_spec(spec)?;
        if primary {
            let mut meta_form = chord.clone();
            meta_form.ctrl = false;
            meta_form.meta = true;
            self.bindings.insert(meta_form, command.clone());
        }
        self.bindings.insert(chord, command);
        Ok(())
    }

    /// Remove a binding (both forms for a `mod` spec)
    pub fn unbind(&mut self, spec: &str) -> Result<(), ShortcutError> {
        let (chord, primary) = parse_spec(spec)?;
        if primary {
            let mut meta_form = chord.clone();
            meta_form.ctrl = false;
            meta_form.meta = true;
            self.bindings.remove(&meta_form);
        }
        self.bindings.remove(&chord);
        Ok(())
    }

    /// Look up the command for an input event
    pub fn resolve(&self, event: &KeyEvent) -> Option<&C> {
        self.bindings.get(&event.chord())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<C: Clone> Default for ShortcutMap<C> {
    fn default() -> Self {
        Self::new()
    }
}
