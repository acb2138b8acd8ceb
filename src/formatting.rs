//! Text formatting for the HUD and timing logs.

use std::time::Duration;

use num_width::NumberWidth;
use smallvec::SmallVec;
use strum::EnumCount;
use thousands::Separable;

use crate::profiling::FrameStage;

/// `M:SS.mmm`, with minutes growing as needed.
pub fn format_run_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{minutes}:{seconds:02}.{millis:03}")
}

/// Counts on the HUD get thousands separators.
pub fn format_count(value: u64) -> String {
    value.separate_with_commas()
}

/// Splits a duration into integer part, three-digit fraction and unit.
fn split_duration(duration: Duration) -> (u64, u32, &'static str) {
    if duration >= Duration::from_secs(1) {
        (duration.as_secs(), duration.subsec_millis(), "s")
    } else if duration >= Duration::from_millis(1) {
        (duration.as_millis() as u64, (duration.as_micros() % 1000) as u32, "ms")
    } else if duration >= Duration::from_micros(1) {
        (duration.as_micros() as u64, (duration.as_nanos() % 1000) as u32, "µs")
    } else {
        (duration.as_nanos() as u64, 0, "ns")
    }
}

/// `name : mean ± std` rows, aligned on the decimal point.
pub fn format_timing_lines(
    rows: impl IntoIterator<Item = (String, Duration, Duration)>,
) -> SmallVec<[String; FrameStage::COUNT]> {
    struct Row {
        name: String,
        mean: (u64, u32, &'static str),
        std: (u64, u32, &'static str),
    }

    let rows: SmallVec<[Row; 8]> = rows
        .into_iter()
        .map(|(name, mean, std)| Row {
            name,
            mean: split_duration(mean),
            std: split_duration(std),
        })
        .collect();

    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
    let mean_width = rows.iter().map(|r| r.mean.0.width() as usize).max().unwrap_or(1);
    let std_width = rows.iter().map(|r| r.std.0.width() as usize).max().unwrap_or(1);

    rows.iter()
        .map(|r| {
            format!(
                "{name:name_width$} : {mi:>mean_width$}.{mf:03}{mu:<2} ± {si:>std_width$}.{sf:03}{su}",
                name = r.name,
                mi = r.mean.0,
                mf = r.mean.1,
                mu = r.mean.2,
                si = r.std.0,
                sf = r.std.1,
                su = r.std.2,
            )
        })
        .collect()
}
