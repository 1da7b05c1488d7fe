//! `sealmint` subcommands

mod forget;
mod gallery;
mod mint;
mod reveal;
mod transfer;

pub use forget::ForgetCommand;
pub use gallery::GalleryCommand;
pub use mint::MintCommand;
pub use reveal::RevealCommand;
pub use transfer::TransferCommand;

use std::fmt::Display;
use std::time::Duration;

use colored::*;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;

use sealmint_lib::validation::parse_token_id;
use sealmint_lib::{Reveal, TokenId, WorkflowError};

pub(crate) fn spinner(color: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Mirror a workflow status channel onto the spinner until a terminal state.
pub(crate) async fn follow_status<T>(
    mut rx: watch::Receiver<T>,
    pb: &ProgressBar,
    is_terminal: fn(&T) -> bool,
) where
    T: Display,
{
    loop {
        {
            let status = rx.borrow_and_update();
            pb.set_message(status.to_string());
            if is_terminal(&status) {
                break;
            }
        }
        if rx.changed().await.is_err() {
            break;
        }
    }
}

/// Token id from a flag, or prompted for
pub(crate) fn token_id_or_prompt(value: Option<&str>) -> anyhow::Result<TokenId> {
    let raw = match value {
        Some(raw) => raw.to_string(),
        None => Input::<String>::new()
            .with_prompt(format!("{} Token id", "🎟️".bright_yellow()))
            .interact_text()?,
    };
    Ok(parse_token_id(&raw)?)
}

pub(crate) fn print_header(title: &str) {
    println!("{}", title.bright_magenta().bold());
    println!("{}", "═".repeat(50).bright_black());
    println!();
}

pub(crate) fn render_reveal(token_id: TokenId, reveal: &Reveal) -> String {
    match reveal {
        Reveal::Cached(text) => format!(
            "#{} {} {}",
            token_id,
            "(this device)".bright_black(),
            text.bright_green()
        ),
        Reveal::Decrypted(text) => format!(
            "#{} {} {}",
            token_id,
            "(decrypted)".bright_black(),
            text.bright_green()
        ),
        Reveal::Placeholder => format!(
            "#{} {} {}",
            token_id,
            "🔒".bright_yellow(),
            reveal.display_text().bright_yellow()
        ),
    }
}

/// One gallery line; a failed reveal is shown in place instead of aborting.
pub(crate) fn render_reveal_outcome(
    token_id: TokenId,
    outcome: &Result<Reveal, WorkflowError>,
) -> String {
    match outcome {
        Ok(reveal) => render_reveal(token_id, reveal),
        Err(e) => format!(
            "#{} {} {}",
            token_id,
            "⚠️".bright_yellow(),
            e.to_string().bright_red()
        ),
    }
}
