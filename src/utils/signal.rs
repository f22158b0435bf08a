// utils/signal.rs

//! Ctrl-C handling with two-phase shutdown.
//!
//! The first Ctrl-C trips the batch's `CancelToken`; rows already rendering
//! finish and the partial report is printed. A second Ctrl-C exits with 130.

use log::warn;

use crate::pipeline::CancelToken;

/// Exit status after a forced interrupt.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Installs the Ctrl-C handler for `token`. Only the first call in a process
/// takes effect.
pub fn setup_signal_handler(token: CancelToken) {
    if let Err(e) = ctrlc::set_handler(move || {
        if token.cancel() {
            std::process::exit(EXIT_INTERRUPTED);
        }
        eprintln!("\nInterrupted. Finishing slips in progress (Ctrl-C again to abort)...");
    }) {
        warn!("[APP] failed to set Ctrl-C handler: {}", e);
    }
}
