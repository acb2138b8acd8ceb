//! Holding log output while the terminal is taken over by the game.
//!
//! Anything written to stderr while the alternate screen is active would tear the frame, so lines
//! are kept in memory and released once the terminal is restored.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::error::GameError;
use crate::formatter::TickFormatter;

#[derive(Default)]
struct Shared {
    held: Vec<u8>,
    holding: bool,
}

/// Switches between writing straight to stderr and holding everything in memory.
#[derive(Clone, Default)]
pub struct LogBuffer {
    shared: Arc<Mutex<Shared>>,
}

impl LogBuffer {
    /// Starts holding output. Used right before entering the alternate screen.
    pub fn hold(&self) {
        self.shared.lock().holding = true;
    }

    /// Stops holding and writes everything held so far to `target`.
    pub fn release_to(&self, mut target: impl Write) -> io::Result<usize> {
        let mut shared = self.shared.lock();
        shared.holding = false;
        let size = shared.held.len();
        if size > 0 {
            target.write_all(&shared.held)?;
            target.flush()?;
            shared.held.clear();
        }
        Ok(size)
    }

    pub fn held_bytes(&self) -> usize {
        self.shared.lock().held.len()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut shared = self.shared.lock();
        if shared.holding {
            shared.held.extend_from_slice(buf);
            Ok(buf.len())
        } else {
            io::stderr().write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.shared.lock().holding {
            Ok(())
        } else {
            io::stderr().flush()
        }
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Installs the global subscriber and returns the buffer controlling where its output goes.
///
/// The filter comes from `RUST_LOG`, falling back to `default_filter`.
pub fn install(default_filter: &str) -> Result<LogBuffer, GameError> {
    let buffer = LogBuffer::default();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(true)
        .with_env_filter(filter)
        .event_format(TickFormatter)
        .with_writer(buffer.clone())
        .finish()
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| GameError::Logging(e.to_string()))?;
    Ok(buffer)
}
