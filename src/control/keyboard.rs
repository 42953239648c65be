// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard shortcut handling.
//!
//! Provides the key bindings for pads, transport, levels and the bar cursor.

use std::collections::{BTreeMap, HashMap};

use crossterm::event::{KeyCode, KeyModifiers};

use super::ControlAction;

/// Keys for pads 0 - 15, two rows of eight
pub const PAD_KEYS: [char; 16] = [
    '1', '2', '3', '4', '5', '6', '7', '8', //
    'a', 's', 'd', 'f', 'g', 'h', 'j', 'k',
];

/// Tempo change per key press, in BPM
pub const TEMPO_STEP: f64 = 5.0;
/// Volume change per key press, in percent
pub const VOLUME_STEP: i16 = 5;

/// A keyboard shortcut definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// Key code
    pub code: KeyCode,
    /// Required modifiers
    pub modifiers: KeyModifiers,
}

impl Shortcut {
    /// Create a new shortcut
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Create a shortcut with no modifiers
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Create a shortcut with Ctrl modifier
    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    /// Create a shortcut with Shift modifier
    pub fn shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }

    /// Normalize a key event. Terminals report Shift on characters that
    /// already carry it (`Q`, `+`), so it is dropped for `Char` keys.
    pub fn from_event(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let mut modifiers = modifiers;
        if let KeyCode::Char(_) = code {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        Self::new(code, modifiers)
    }

    /// Check if this shortcut matches a key event
    pub fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        *self == Self::from_event(code, modifiers)
    }
}

/// Help section a binding is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Transport,
    Levels,
    Bars,
    Pattern,
    Pads,
    Ui,
}

impl Category {
    /// Heading shown in the help overlay
    pub fn title(self) -> &'static str {
        match self {
            Category::Transport => "Transport",
            Category::Levels => "Levels",
            Category::Bars => "Bars",
            Category::Pattern => "Pattern",
            Category::Pads => "Pads",
            Category::Ui => "UI",
        }
    }
}

/// A shortcut bound to an action
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub shortcut: Shortcut,
    pub action: ControlAction,
    /// Description for help display
    pub description: String,
    pub category: Category,
}

impl KeyBinding {
    /// Create a new key binding, listed under Pattern until told otherwise
    pub fn new(
        shortcut: Shortcut,
        action: ControlAction,
        description: impl Into<String>,
    ) -> Self {
        Self {
            shortcut,
            action,
            description: description.into(),
            category: Category::Pattern,
        }
    }

    /// Set the category
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
}

/// Built-in bindings other than the pads
fn default_bindings() -> Vec<KeyBinding> {
    use Category::*;
    use ControlAction as A;

    let plain = |c: char| Shortcut::key(KeyCode::Char(c));
    let tempo_up = format!("Tempo +{} BPM", TEMPO_STEP);

    let table: Vec<(Category, Shortcut, ControlAction, String)> = vec![
        (Transport, plain(' '), A::TogglePlay, "Play/Stop".into()),
        (Transport, plain('r'), A::ToggleRecord, "Record".into()),
        (Transport, plain('l'), A::ToggleLoop, "Loop 4/16 bars".into()),
        (Transport, Shortcut::key(KeyCode::Esc), A::CancelCountIn, "Cancel count-in".into()),
        (Levels, plain('+'), A::AdjustTempo(TEMPO_STEP), tempo_up.clone()),
        (Levels, plain('='), A::AdjustTempo(TEMPO_STEP), tempo_up),
        (Levels, plain('-'), A::AdjustTempo(-TEMPO_STEP), format!("Tempo -{} BPM", TEMPO_STEP)),
        (Levels, plain(']'), A::AdjustVolume(VOLUME_STEP), format!("Volume +{}", VOLUME_STEP)),
        (Levels, plain('['), A::AdjustVolume(-VOLUME_STEP), format!("Volume -{}", VOLUME_STEP)),
        (Bars, Shortcut::key(KeyCode::Tab), A::NextBar, "Next bar".into()),
        (Bars, Shortcut::key(KeyCode::Right), A::NextBar, "Next bar".into()),
        (Bars, Shortcut::key(KeyCode::BackTab), A::PreviousBar, "Previous bar".into()),
        (Bars, Shortcut::shift(KeyCode::BackTab), A::PreviousBar, "Previous bar".into()),
        (Bars, Shortcut::key(KeyCode::Left), A::PreviousBar, "Previous bar".into()),
        (Bars, Shortcut::key(KeyCode::Enter), A::ClickBar, "Select bar".into()),
        (Pattern, plain('0'), A::Reset, "Clear all bars".into()),
        (Pattern, plain('p'), A::LoadDemo, "Load demo song".into()),
        (Pattern, plain('t'), A::TogglePadSet, "Switch pads".into()),
        (Ui, plain('?'), A::ToggleHelp, "Help".into()),
        (Ui, plain('Q'), A::Quit, "Quit".into()),
        (Ui, Shortcut::ctrl(KeyCode::Char('c')), A::Quit, "Quit".into()),
    ];

    table
        .into_iter()
        .map(|(category, shortcut, action, description)| {
            KeyBinding::new(shortcut, action, description).category(category)
        })
        .collect()
}

/// Maps key events to control actions
pub struct KeyboardController {
    bindings: HashMap<Shortcut, KeyBinding>,
}

impl KeyboardController {
    /// Create an empty keyboard controller
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create a keyboard controller with the pad rows and default bindings
    pub fn with_defaults() -> Self {
        let mut controller = Self::new();
        for (pad, &c) in PAD_KEYS.iter().enumerate() {
            controller.add(
                KeyBinding::new(
                    Shortcut::key(KeyCode::Char(c)),
                    ControlAction::Pad(pad),
                    format!("Pad {}", pad + 1),
                )
                .category(Category::Pads),
            );
        }
        for binding in default_bindings() {
            controller.add(binding);
        }
        controller
    }

    /// Add a key binding, replacing any on the same shortcut
    pub fn add(&mut self, binding: KeyBinding) {
        self.bindings.insert(binding.shortcut.clone(), binding);
    }

    /// Remove a key binding
    pub fn remove(&mut self, shortcut: &Shortcut) -> Option<KeyBinding> {
        self.bindings.remove(shortcut)
    }

    /// Action bound to a key event
    pub fn get_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<&ControlAction> {
        self.bindings
            .get(&Shortcut::from_event(code, modifiers))
            .map(|b| &b.action)
    }

    /// Bindings grouped by category in help order, each group sorted by
    /// description
    pub fn bindings_by_category(&self) -> BTreeMap<Category, Vec<&KeyBinding>> {
        let mut grouped: BTreeMap<Category, Vec<&KeyBinding>> = BTreeMap::new();
        for binding in self.bindings.values() {
            grouped.entry(binding.category).or_default().push(binding);
        }
        for group in grouped.values_mut() {
            group.sort_by(|a, b| {
                a.description
                    .cmp(&b.description)
                    .then_with(|| format_shortcut(&a.shortcut).cmp(&format_shortcut(&b.shortcut)))
            });
        }
        grouped
    }
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Format a shortcut for display
pub fn format_shortcut(shortcut: &Shortcut) -> String {
    let mut parts: Vec<String> = Vec::new();
    if shortcut.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl".into());
    }
    if shortcut.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt".into());
    }
    if shortcut.modifiers.contains(KeyModifiers::SHIFT) || shortcut.code == KeyCode::BackTab {
        parts.push("Shift".into());
    }

    parts.push(match shortcut.code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Left => "←".into(),
        KeyCode::Right => "→".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab | KeyCode::BackTab => "Tab".into(),
        other => format!("{:?}", other),
    });
    parts.dedup();
    parts.join("+")
}
