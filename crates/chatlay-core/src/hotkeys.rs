use serde::{Deserialize, Serialize};

use crate::overlay::session::OverlayCommand;

/// Commands reachable from a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotkeyAction {
    ToggleClickThrough,
    Close,
    ResetSize,
    StartSurface,
}

impl HotkeyAction {
    pub fn command(self) -> OverlayCommand {
        match self {
            HotkeyAction::ToggleClickThrough => OverlayCommand::ToggleClickThrough,
            HotkeyAction::Close => OverlayCommand::Close,
            HotkeyAction::ResetSize => OverlayCommand::ResetSize,
            HotkeyAction::StartSurface => OverlayCommand::StartSurface,
        }
    }
}

/// A global shortcut in the accelerator syntax understood by the shortcut
/// plugin, e.g. `CommandOrControl+Shift+T`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBinding {
    pub shortcut: String,
    pub action: HotkeyAction,
}

impl HotkeyBinding {
    pub fn new(shortcut: &str, action: HotkeyAction) -> Self {
        Self {
            shortcut: shortcut.to_string(),
            action,
        }
    }
}

pub fn default_bindings() -> Vec<HotkeyBinding> {
    vec![
        HotkeyBinding::new("CommandOrControl+Shift+T", HotkeyAction::ToggleClickThrough),
        HotkeyBinding::new("CommandOrControl+Shift+Q", HotkeyAction::Close),
        HotkeyBinding::new("CommandOrControl+Shift+R", HotkeyAction::ResetSize),
        HotkeyBinding::new("CommandOrControl+Shift+S", HotkeyAction::StartSurface),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_deserialize_from_kebab_case() {
        let binding: HotkeyBinding = serde_json::from_str(
            r#"{ "shortcut": "Alt+F9", "action": "toggle-click-through" }"#,
        )
        .unwrap();

        assert_eq!(binding.action.command(), OverlayCommand::ToggleClickThrough);
    }

    #[test]
    fn every_action_has_a_default_binding() {
        let defaults = default_bindings();
        for action in [
            HotkeyAction::ToggleClickThrough,
            HotkeyAction::Close,
            HotkeyAction::ResetSize,
            HotkeyAction::StartSurface,
        ] {
            assert!(defaults.iter().any(|b| b.action == action), "{action:?}");
        }
    }
}
