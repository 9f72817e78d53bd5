//! Opening the authorization page in the user's browser.

use std::process::{Command, Stdio};

use tracing::debug;

/// Launch the platform URL handler without waiting for it.
pub fn open(url: &str) -> std::io::Result<()> {
    let mut command = opener_command(url);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    debug!("Opening browser via {:?}", command.get_program());
    command.spawn().map(|_| ())
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    // The empty argument is the window title `start` expects first;
    // `&` separates commands in cmd and must be escaped
    let escaped = url.replace('&', "^&");
    command.args(["/C", "start", "", escaped.as_str()]);
    command
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
