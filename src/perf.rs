#[cfg(feature = "perf")]
use std::time::Instant;

/// Pipeline stage timing.
///
/// Enable with `--features perf`; spans emit `tracing::info!` events with
/// target="perf" when dropped.
#[cfg(feature = "perf")]
pub struct StageSpan {
    stage: &'static str,
    start: Instant,
}

#[cfg(feature = "perf")]
impl StageSpan {
    #[inline]
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            start: Instant::now(),
        }
    }
}

#[cfg(feature = "perf")]
impl Drop for StageSpan {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(target: "perf", stage = self.stage, ms = ms);
    }
}

#[cfg(not(feature = "perf"))]
pub struct StageSpan;

#[cfg(not(feature = "perf"))]
impl StageSpan {
    #[inline]
    pub fn new(_stage: &'static str) -> Self {
        StageSpan
    }
}

#[macro_export]
macro_rules! stage_span {
    ($stage:expr) => {
        $crate::perf::StageSpan::new($stage)
    };
}
