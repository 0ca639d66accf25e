#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    NewScenario,
    OpenDashboard,
    CloseModal,
    SkipToContent,
    FocusSearch,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyChord {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            ctrl: true,
            ..Self::key(key)
        }
    }

    pub fn alt(key: impl Into<String>) -> Self {
        Self {
            alt: true,
            ..Self::key(key)
        }
    }
}

pub fn resolve_shortcut(chord: &KeyChord) -> Option<ShortcutAction> {
    if chord.shift {
        return None;
    }
    let key = chord.key.to_ascii_lowercase();
    match (chord.ctrl, chord.alt, key.as_str()) {
        (true, false, "n") => Some(ShortcutAction::NewScenario),
        (true, false, "d") => Some(ShortcutAction::OpenDashboard),
        (true, false, "k") => Some(ShortcutAction::FocusSearch),
        (false, true, "s") => Some(ShortcutAction::SkipToContent),
        (false, false, "escape") => Some(ShortcutAction::CloseModal),
        _ => None,
    }
}
