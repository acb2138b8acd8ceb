//! Log line formatting for the host.
//!
//! Each line carries the wall-clock time and the simulation tick it was emitted on, so a log can
//! be lined up against a replay of the same seed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

static TICK: AtomicU64 = AtomicU64::new(0);

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:4]");

/// Advances the tick shown on subsequent log lines. Called once per simulation step.
pub fn advance_tick() {
    TICK.fetch_add(1, Ordering::Relaxed);
}

pub fn current_tick() -> u64 {
    TICK.load(Ordering::Relaxed)
}

#[derive(Clone, Copy)]
enum Style {
    Dim,
    Bold,
    Color(&'static str),
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Dim => "\x1b[2m",
            Style::Bold => "\x1b[1m",
            Style::Color(code) => code,
        }
    }
}

fn styled(writer: &mut Writer<'_>, style: Style, value: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{}{}\x1b[0m", style.code(), value)
    } else {
        write!(writer, "{value}")
    }
}

fn level_style(level: &Level) -> (Style, &'static str) {
    match *level {
        Level::TRACE => (Style::Color("\x1b[35m"), "TRACE"),
        Level::DEBUG => (Style::Color("\x1b[34m"), "DEBUG"),
        Level::INFO => (Style::Color("\x1b[32m"), " INFO"),
        Level::WARN => (Style::Color("\x1b[33m"), " WARN"),
        Level::ERROR => (Style::Color("\x1b[31m"), "ERROR"),
    }
}

/// `HH:MM:SS.ssss tick LEVEL span{fields}: target: message`
pub struct TickFormatter;

impl<S, N> FormatEvent<S, N> for TickFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let timestamp = OffsetDateTime::now_utc()
            .format(&TIMESTAMP_FORMAT)
            .map_err(|_| fmt::Error)?;
        styled(&mut writer, Style::Dim, timestamp)?;
        writer.write_char(' ')?;
        styled(&mut writer, Style::Dim, format_args!("{:>6}", current_tick()))?;
        writer.write_char(' ')?;

        let (style, label) = level_style(meta.level());
        styled(&mut writer, style, label)?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            let mut any = false;
            for span in scope.from_root() {
                any = true;
                styled(&mut writer, Style::Bold, span.metadata().name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>().filter(|f| !f.is_empty()) {
                    styled(&mut writer, Style::Bold, "{")?;
                    write!(writer, "{fields}")?;
                    styled(&mut writer, Style::Bold, "}")?;
                }
                styled(&mut writer, Style::Dim, ":")?;
            }
            if any {
                writer.write_char(' ')?;
            }
        }

        styled(&mut writer, Style::Dim, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
