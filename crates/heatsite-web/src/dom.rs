//! Page labels - DOM clicks become highlight requests, label colors flow back

use bevy::prelude::*;
use heatsite_core::GroupId;
use heatsite_scene::highlight::apply_highlight_requests;
use heatsite_scene::labels::{register_group_labels, LabelBoard};
use heatsite_scene::HighlightRequest;
use std::sync::{Arc, Mutex};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

/// Plugin binding the page's label elements to the highlight controller
pub struct DomLabelsPlugin;

impl Plugin for DomLabelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingClicks>()
            .add_systems(Startup, attach_label_listeners.after(register_group_labels))
            .add_systems(
                Update,
                (
                    drain_label_clicks.before(apply_highlight_requests),
                    sync_label_colors.after(apply_highlight_requests),
                ),
            );
    }
}

/// Clicks recorded by DOM listeners, drained once per frame
#[derive(Resource, Default, Clone)]
pub struct PendingClicks(Arc<Mutex<Vec<GroupId>>>);

impl PendingClicks {
    pub fn push(&self, group: GroupId) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(group);
        }
    }

    pub fn take(&self) -> Vec<GroupId> {
        self.0
            .try_lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

/// Listen for clicks on each group's label; labels absent from the page are
/// unregistered so their toggles are refused
fn attach_label_listeners(mut board: ResMut<LabelBoard>, pending: Res<PendingClicks>) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        tracing::warn!("No document; page labels disabled");
        return;
    };

    for group in GroupId::ALL {
        let id = group.label_id();
        let Some(element) = document.get_element_by_id(id) else {
            tracing::warn!("No #{} element on the page; {} cannot be toggled", id, group.title());
            board.unregister(id);
            continue;
        };

        let queue = pending.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            queue.push(group);
        }) as Box<dyn FnMut(_)>);

        if let Err(e) =
            element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        {
            tracing::error!("Failed to listen on #{}: {:?}", id, e);
        }
        closure.forget();
    }
}

fn drain_label_clicks(pending: Res<PendingClicks>, mut requests: MessageWriter<HighlightRequest>) {
    for group in pending.take() {
        requests.write(HighlightRequest(group));
    }
}

/// Copy label colors to the page's `style.color`
fn sync_label_colors(board: Res<LabelBoard>) {
    if !board.is_changed() {
        return;
    }
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    for (id, color) in board.iter() {
        let Some(element) = document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        if let Err(e) = element.style().set_property("color", color) {
            tracing::warn!("Failed to color #{}: {:?}", id, e);
        }
    }
}
