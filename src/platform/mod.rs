//! Host-side plumbing that the simulation never sees.

use std::time::Duration;

pub mod log_buffer;

/// Sleeps for the remainder of a frame. Spins while the terminal has focus for tighter pacing.
pub fn sleep(duration: Duration, focused: bool) {
    if focused {
        spin_sleep::sleep(duration);
    } else {
        std::thread::sleep(duration);
    }
}
