//! Album artwork thumbnail.

use dioxus::prelude::*;

use crate::state::OverlayState;

/// 50x50 album art, or a music note when there is none.
#[component]
pub fn AlbumArt() -> Element {
    let state = use_context::<OverlayState>();
    let art_url = state.art_url.read().clone();

    rsx! {
        div { class: "overlay__art",
            if let Some(url) = art_url {
                img { src: "{url}", alt: "Album art", draggable: "false" }
            } else {
                div { class: "overlay__art-placeholder",
                    MusicIcon {}
                }
            }
        }
    }
}

/// Music note icon.
#[component]
fn MusicIcon() -> Element {
    rsx! {
        svg {
            width: "28",
            height: "28",
            view_box: "0 0 24 24",
            fill: "#bbb",
            path {
                d: "M12 3v10.55c-.59-.34-1.27-.55-2-.55-2.21 0-4 1.79-4 4s1.79 4 4 4 4-1.79 4-4V7h4V3h-6z"
            }
        }
    }
}
