//! The overlay window body.

use dioxus::desktop::window;
use dioxus::prelude::*;

use super::{AlbumArt, Controls};
use crate::state::OverlayState;

/// Album art on the left, track text and controls on the right.
/// Dragging anywhere outside the buttons moves the window.
#[component]
pub fn Overlay() -> Element {
    let state = use_context::<OverlayState>();
    let text = state.text.read().clone();

    rsx! {
        div {
            class: "overlay",
            onmousedown: move |_| window().drag(),

            AlbumArt {}

            div { class: "overlay__body",
                div { class: "overlay__info",
                    span { class: "overlay__title", "{text.title}" }
                    span { class: "overlay__subtitle", "{text.subtitle}" }
                }
                Controls {}
            }

            button {
                class: "overlay__close",
                title: "Exit",
                onmousedown: move |evt| evt.stop_propagation(),
                onclick: move |_| {
                    tracing::info!("Exiting application");
                    window().close();
                },
                "✕"
            }
        }
    }
}
