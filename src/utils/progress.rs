//! Local CLI progress rendering, separate from the persisted
//! `CalculationState.progress` the admin API exposes. Only used when the
//! `rankings-engine` binary is run interactively with `--progress-bar`.

use indicatif::{ProgressBar, ProgressStyle};

pub fn rebuild_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3}% {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    bar
}
