//! # Spotify Overlay
//!
//! A small always-on-top window showing what Spotify is playing,
//! built with Rust and Dioxus.

// RSX macros generate code that triggers these warnings incorrectly
#![allow(unused_qualifications)]
#![allow(clippy::use_self)]

mod components;
mod services;
mod state;

use anyhow::{Context, Result};
use components::Overlay;
use dioxus::desktop::tao::dpi::LogicalPosition;
use dioxus::desktop::tao::window::Icon;
use dioxus::desktop::{Config, WindowBuilder};
use dioxus::prelude::*;
use overlay_store::Config as OverlayConfig;
use services::spotify::use_now_playing_sync;
use services::SpotifySession;
use state::OverlayState;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Overlay dimensions in logical pixels.
const OVERLAY_WIDTH: f64 = 300.0;
const OVERLAY_HEIGHT: f64 = 80.0;

/// Distance from the right and top screen edges.
const OVERLAY_RIGHT_OFFSET: f64 = 320.0;
const OVERLAY_TOP_OFFSET: f64 = 10.0;

/// Load the app icon from embedded PNG.
fn load_icon() -> Option<Icon> {
    let icon_bytes = include_bytes!("../assets/icons/icon.png");
    let img = image::load_from_memory(icon_bytes).ok()?.into_rgba8();
    let (width, height) = img.dimensions();
    Icon::from_rgba(img.into_raw(), width, height).ok()
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "spotify_overlay=debug,overlay_app=debug,overlay_spotify=info,overlay_store=info"
                    .into()
            }),
        )
        .init();

    info!("Starting Spotify Overlay v{}", env!("CARGO_PKG_VERSION"));

    let config = OverlayConfig::load().context("Failed to load configuration")?;
    if let Err(e) = config.validate() {
        warn!(
            "{e}; edit {} or set SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET",
            OverlayConfig::default_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "config.json".to_string())
        );
    }

    let session = SpotifySession::new(&config).context("Failed to create Spotify session")?;

    // Borderless, transparent and always on top
    let mut window_builder = WindowBuilder::new()
        .with_title("Spotify Overlay")
        .with_inner_size(dioxus::desktop::LogicalSize::new(
            OVERLAY_WIDTH,
            OVERLAY_HEIGHT,
        ))
        .with_resizable(false)
        .with_decorations(false)
        .with_transparent(true)
        .with_always_on_top(true);

    if let Some(icon) = load_icon() {
        window_builder = window_builder.with_window_icon(Some(icon));
    }

    let desktop_config = Config::new()
        .with_window(window_builder)
        .with_disable_context_menu(true)
        .with_menu(None);

    dioxus::LaunchBuilder::desktop()
        .with_cfg(desktop_config)
        .with_context(session)
        .launch(App);

    Ok(())
}

/// Root component.
#[component]
fn App() -> Element {
    let session = use_context::<SpotifySession>();
    let overlay_state = use_context_provider(OverlayState::new);

    // Park the window near the top-right corner of its monitor
    use_hook(|| {
        let desktop = dioxus::desktop::window();
        if let Some(monitor) = desktop.window.current_monitor() {
            let size = monitor.size().to_logical::<f64>(monitor.scale_factor());
            desktop.window.set_outer_position(LogicalPosition::new(
                (size.width - OVERLAY_RIGHT_OFFSET).max(0.0),
                OVERLAY_TOP_OFFSET,
            ));
        }
    });

    // Log in, then keep the overlay in sync with Spotify
    use_now_playing_sync(session, overlay_state);

    rsx! {
        // Inject CSS
        style { {include_str!("../assets/styles.css")} }

        Overlay {}
    }
}
