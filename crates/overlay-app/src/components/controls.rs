//! Previous / play-pause / next buttons.

use dioxus::prelude::*;
use overlay_core::PlaybackCommand;

use crate::services::spotify::run_command;
use crate::services::SpotifySession;
use crate::state::OverlayState;

/// Playback control row.
#[component]
pub fn Controls() -> Element {
    let state = use_context::<OverlayState>();
    let is_playing = *state.is_playing.read();
    let (toggle_label, toggle_title) = if is_playing {
        ("⏸", "Pause")
    } else {
        ("▶", "Play")
    };

    rsx! {
        div { class: "overlay__controls",
            ControlButton { label: "⏮", title: "Previous", command: PlaybackCommand::Previous }
            // The toggle is resolved from the state at render time
            ControlButton {
                label: toggle_label,
                title: toggle_title,
                command: PlaybackCommand::toggle(is_playing),
            }
            ControlButton { label: "⏭", title: "Next", command: PlaybackCommand::Next }
        }
    }
}

#[component]
fn ControlButton(label: &'static str, title: &'static str, command: PlaybackCommand) -> Element {
    let state = use_context::<OverlayState>();
    let session = use_context::<SpotifySession>();

    rsx! {
        button {
            class: "overlay__btn",
            title: "{title}",
            onmousedown: move |evt| evt.stop_propagation(),
            onclick: move |_| {
                let session = session.clone();
                spawn(async move {
                    run_command(session, state, command).await;
                });
            },
            "{label}"
        }
    }
}
