//! Step lines and progress bars for the `batch` command

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

/// Shown while walking the source directory
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Shown while extracting cards from images
pub static PICTURE: Emoji<'_, '_> = Emoji("🖼️  ", "");
/// Shown while writing card JSON
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Shown on the summary line
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// `[1/3] 🔍 Finding PNG files...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// `✨ Done in 2s`, printed after the batch summary
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

fn file_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
        .expect("valid template")
}

/// Bar over `total` files, advanced once per file
#[must_use]
pub fn file_bar(total: usize, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(file_bar_style());
    pb.set_message(msg.to_string());
    pb
}
