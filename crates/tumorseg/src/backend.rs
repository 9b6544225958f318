//! Execution contexts for the threshold stage.
//!
//! Both backends run [`ThresholdStage::run`]; they differ only in where the
//! work happens and what it costs. Elapsed time is read from a
//! [`CycleClock`], so callers can substitute a hardware counter or a
//! deterministic clock.

use std::time::Instant;

use tumorseg_core::{
    GrayImage, GrayImageView, ImageStatistics, ProcessingMode, ThresholdStage,
    ThresholdStageOutput,
};

use crate::error::BackendError;

/// Free-running cycle counter.
pub trait CycleClock {
    fn cycles(&self) -> u64;

    fn elapsed_since(&self, start: u64) -> u64 {
        self.cycles().wrapping_sub(start)
    }
}

/// Monotonic host clock scaled to a nominal counter frequency.
#[derive(Clone, Copy, Debug)]
pub struct HostClock {
    origin: Instant,
    clock_hz: f64,
}

impl HostClock {
    pub fn new(clock_hz: f64) -> Self {
        Self {
            origin: Instant::now(),
            clock_hz: clock_hz.max(0.0),
        }
    }

    pub fn clock_hz(&self) -> f64 {
        self.clock_hz
    }
}

impl CycleClock for HostClock {
    fn cycles(&self) -> u64 {
        (self.origin.elapsed().as_secs_f64() * self.clock_hz) as u64
    }
}

/// Stage output plus the cycles it took.
#[derive(Clone, Debug)]
pub struct StageRun {
    pub output: ThresholdStageOutput,
    pub cycles: u64,
}

/// A place where the threshold stage can run.
pub trait ExecutionBackend {
    fn name(&self) -> &'static str;

    fn run_threshold_stage(
        &mut self,
        img: &GrayImageView<'_>,
        stats: &ImageStatistics,
        mode: ProcessingMode,
    ) -> Result<StageRun, BackendError>;
}

/// Runs the stage on the calling thread, reusing its scratch buffers.
#[derive(Clone, Debug)]
pub struct HostBackend<C = HostClock> {
    clock: C,
    stage: ThresholdStage,
}

impl<C: CycleClock> HostBackend<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            stage: ThresholdStage::default(),
        }
    }
}

impl<C: CycleClock> ExecutionBackend for HostBackend<C> {
    fn name(&self) -> &'static str {
        "host"
    }

    fn run_threshold_stage(
        &mut self,
        img: &GrayImageView<'_>,
        stats: &ImageStatistics,
        mode: ProcessingMode,
    ) -> Result<StageRun, BackendError> {
        let start = self.clock.cycles();
        let output = self.stage.run(img, stats, mode);
        let cycles = self.clock.elapsed_since(start);
        Ok(StageRun { output, cycles })
    }
}

/// Runs the stage on a dedicated worker thread.
///
/// The worker receives an owned copy of the input and allocates its own
/// output; the caller blocks until it reports back. Timing covers the whole
/// start / wait / read sequence.
#[derive(Clone, Debug)]
pub struct OffloadBackend<C = HostClock> {
    clock: C,
}

impl<C: CycleClock> OffloadBackend<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: CycleClock> ExecutionBackend for OffloadBackend<C> {
    fn name(&self) -> &'static str {
        "offload"
    }

    fn run_threshold_stage(
        &mut self,
        img: &GrayImageView<'_>,
        stats: &ImageStatistics,
        mode: ProcessingMode,
    ) -> Result<StageRun, BackendError> {
        let input: GrayImage = img.to_owned_image();
        let stats = *stats;

        let start = self.clock.cycles();
        let handle = std::thread::Builder::new()
            .name("tumorseg-offload".into())
            .spawn(move || {
                let mut stage = ThresholdStage::new(input.width, input.height);
                stage.run(&input.view(), &stats, mode)
            })
            .map_err(|source| BackendError::Spawn {
                backend: "offload",
                source,
            })?;
        let output = handle
            .join()
            .map_err(|_| BackendError::WorkerPanicked { backend: "offload" })?;
        let cycles = self.clock.elapsed_since(start);

        Ok(StageRun { output, cycles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tumorseg_core::{compute_statistics, synthetic};

    /// Advances a fixed step per read.
    struct StepClock {
        now: Cell<u64>,
        step: u64,
    }

    impl CycleClock for StepClock {
        fn cycles(&self) -> u64 {
            let t = self.now.get();
            self.now.set(t + self.step);
            t
        }
    }

    #[test]
    fn host_backend_reports_clock_cycles() {
        let (img, _) = synthetic::bright_circle();
        let stats = compute_statistics(&img.view());
        let clock = StepClock {
            now: Cell::new(10),
            step: 500,
        };
        let mut backend = HostBackend::new(clock);
        let run = backend
            .run_threshold_stage(&img.view(), &stats, ProcessingMode::Normal)
            .expect("host run");
        assert_eq!(run.cycles, 500);
        assert_eq!(backend.name(), "host");
    }

    #[test]
    fn backends_produce_identical_outputs() {
        let (img, _) = synthetic::two_blobs();
        let stats = compute_statistics(&img.view());
        let mut host = HostBackend::new(HostClock::new(1e8));
        let mut offload = OffloadBackend::new(HostClock::new(1e8));
        for mode in ProcessingMode::ALL {
            let a = host
                .run_threshold_stage(&img.view(), &stats, mode)
                .expect("host run");
            let b = offload
                .run_threshold_stage(&img.view(), &stats, mode)
                .expect("offload run");
            assert!(a.output.agrees_with(&b.output), "mode {mode}");
        }
    }

    #[test]
    fn elapsed_wraps_around_counter_overflow() {
        let clock = StepClock {
            now: Cell::new(5),
            step: 0,
        };
        assert_eq!(clock.elapsed_since(u64::MAX - 4), 10);
    }
}
