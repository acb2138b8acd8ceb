//! Frame-time bookkeeping for the host loop.

use std::time::{Duration, Instant};

use circular_buffer::CircularBuffer;
use smallvec::SmallVec;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use thousands::Separable;

use crate::formatting::format_timing_lines;

/// Samples kept per stage.
const WINDOW: usize = 60;

/// The parts of a host frame that are measured separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FrameStage {
    Total,
    Input,
    Update,
    Render,
    Present,
}

/// A rolling window of durations with mean and standard deviation.
#[derive(Debug, Default)]
pub struct TimingWindow {
    samples: CircularBuffer<WINDOW, Duration>,
}

impl TimingWindow {
    pub fn record(&mut self, duration: Duration) {
        self.samples.push_back(duration);
    }

    pub fn latest(&self) -> Duration {
        self.samples.back().copied().unwrap_or(Duration::ZERO)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean and sample standard deviation, via Welford's online algorithm.
    pub fn stats(&self) -> (Duration, Duration) {
        let mut count = 0u32;
        let mut mean = 0.0f64;
        let mut m2 = 0.0f64;

        for sample in self.samples.iter() {
            let value = sample.as_secs_f64();
            count += 1;
            let delta = value - mean;
            mean += delta / count as f64;
            m2 += delta * (value - mean);
        }

        if count == 0 {
            return (Duration::ZERO, Duration::ZERO);
        }
        let variance = if count > 1 { m2 / (count - 1) as f64 } else { 0.0 };
        (Duration::from_secs_f64(mean), Duration::from_secs_f64(variance.sqrt()))
    }
}

#[derive(Debug)]
pub struct FrameTimings {
    windows: micromap::Map<FrameStage, TimingWindow, { FrameStage::COUNT }>,
}

impl Default for FrameTimings {
    fn default() -> Self {
        let mut windows = micromap::Map::new();
        for stage in FrameStage::iter() {
            windows.insert(stage, TimingWindow::default());
        }
        Self { windows }
    }
}

impl FrameTimings {
    pub fn record(&mut self, stage: FrameStage, duration: Duration) {
        if let Some(window) = self.windows.get_mut(&stage) {
            window.record(duration);
        }
    }

    /// Runs `f`, recording how long it took under `stage`.
    pub fn measure<T>(&mut self, stage: FrameStage, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = f();
        self.record(stage, start.elapsed());
        value
    }

    pub fn stats(&self, stage: FrameStage) -> (Duration, Duration) {
        self.windows.get(&stage).map(TimingWindow::stats).unwrap_or_default()
    }

    /// One aligned line per stage, headed by the effective frame rate.
    pub fn summary(&self) -> SmallVec<[String; FrameStage::COUNT]> {
        let (total, total_std) = self.stats(FrameStage::Total);
        let fps = if total.is_zero() {
            "  --- FPS".to_string()
        } else {
            match 1.0 / total.as_secs_f64() {
                f if f > 100.0 => format!("{:>5} FPS", (f as u32).separate_with_commas()),
                f if f < 10.0 => format!("{f:.1} FPS"),
                f => format!("{f:5.0} FPS"),
            }
        };

        let rows = std::iter::once((fps, total, total_std)).chain(
            FrameStage::iter()
                .filter(|&stage| stage != FrameStage::Total)
                .map(|stage| {
                    let (mean, std) = self.stats(stage);
                    (stage.to_string(), mean, std)
                }),
        );
        format_timing_lines(rows)
    }

    /// Stages whose latest sample exceeded `threshold`, slowest first.
    pub fn slow_stages(&self, threshold: Duration) -> SmallVec<[(FrameStage, Duration); 4]> {
        let mut slow: SmallVec<[(FrameStage, Duration); 4]> = FrameStage::iter()
            .filter(|&stage| stage != FrameStage::Total)
            .filter_map(|stage| {
                let latest = self.windows.get(&stage)?.latest();
                (latest >= threshold).then_some((stage, latest))
            })
            .collect();
        slow.sort_by(|a, b| b.1.cmp(&a.1));
        slow
    }
}
