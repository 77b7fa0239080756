//! Keyboard shortcuts: digits 1-7 toggle groups in panel order

use bevy::prelude::*;
use heatsite_core::GroupId;
use heatsite_scene::highlight::apply_highlight_requests;
use heatsite_scene::HighlightRequest;

pub struct ShortcutsPlugin;

impl Plugin for ShortcutsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, group_shortcuts.before(apply_highlight_requests));
    }
}

const GROUP_KEYS: [KeyCode; 7] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
];

pub fn group_for_key(key: KeyCode) -> Option<GroupId> {
    let index = GROUP_KEYS.iter().position(|k| *k == key)?;
    GroupId::ALL.get(index).copied()
}

fn group_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<HighlightRequest>,
) {
    for key in keys.get_just_pressed() {
        if let Some(group) = group_for_key(*key) {
            requests.write(HighlightRequest(group));
        }
    }
}
