//! End-to-end segmentation driver.

use serde::{Deserialize, Serialize};
use tumorseg_core::{
    compute_statistics, select_mode, GrayImage, GrayImageView, ImageStatistics, LabelMap,
    Labeling, PerformanceReport, ProcessingMode, RegionInfo, RegionLabeler,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::backend::{ExecutionBackend, HostBackend, HostClock, OffloadBackend};
use crate::error::SegmentError;
use crate::params::{BackendKind, PipelineParams};

/// Borrow a raw row-major gray buffer after checking its size.
pub fn gray_view_from_raw(
    width: usize,
    height: usize,
    pixels: &[u8],
) -> Result<GrayImageView<'_>, SegmentError> {
    if width == 0 || height == 0 {
        return Err(SegmentError::InvalidGrayDimensions { width, height });
    }
    let Some(expected) = width.checked_mul(height) else {
        return Err(SegmentError::InvalidGrayDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(SegmentError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    Ok(GrayImageView {
        width,
        height,
        data: pixels,
    })
}

/// Everything one segmentation run produces.
#[derive(Clone, Debug)]
pub struct SegmentationResult {
    pub stats: ImageStatistics,
    pub mode: ProcessingMode,
    /// `false` when the mode was forced by the caller or configuration.
    pub mode_auto_selected: bool,
    pub threshold: u8,
    pub otsu_threshold: u8,
    pub fallback_applied: bool,
    pub foreground_pixels: u64,
    pub mask: GrayImage,
    pub regions: Vec<RegionInfo>,
    pub label_map: LabelMap,
    /// Region cap was reached while unlabeled foreground remained.
    pub regions_saturated: bool,
    pub backend: &'static str,
    pub accelerated_cycles: u64,
    /// Present when the baseline comparison ran.
    pub performance: Option<PerformanceReport>,
    /// Baseline produced the same threshold and mask. `None` without a baseline run.
    pub backends_agree: Option<bool>,
}

/// Serializable view of [`SegmentationResult`] without pixel buffers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentationSummary {
    pub width: usize,
    pub height: usize,
    pub stats: ImageStatistics,
    pub mode: ProcessingMode,
    pub mode_auto_selected: bool,
    pub threshold: u8,
    pub otsu_threshold: u8,
    pub fallback_applied: bool,
    pub foreground_pixels: u64,
    pub region_count: usize,
    pub total_region_area: u64,
    pub regions_saturated: bool,
    pub regions: Vec<RegionInfo>,
    pub backend: String,
    pub accelerated_cycles: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub performance: Option<PerformanceReport>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub backends_agree: Option<bool>,
}

impl SegmentationResult {
    /// Sum of the labeled region areas.
    pub fn total_foreground(&self) -> u64 {
        self.regions.iter().map(|r| r.area as u64).sum()
    }

    pub fn summary(&self) -> SegmentationSummary {
        SegmentationSummary {
            width: self.mask.width,
            height: self.mask.height,
            stats: self.stats,
            mode: self.mode,
            mode_auto_selected: self.mode_auto_selected,
            threshold: self.threshold,
            otsu_threshold: self.otsu_threshold,
            fallback_applied: self.fallback_applied,
            foreground_pixels: self.foreground_pixels,
            region_count: self.regions.len(),
            total_region_area: self.total_foreground(),
            regions_saturated: self.regions_saturated,
            regions: self.regions.clone(),
            backend: self.backend.to_string(),
            accelerated_cycles: self.accelerated_cycles,
            performance: self.performance,
            backends_agree: self.backends_agree,
        }
    }
}

/// Statistics, mode selection, threshold stage, labeling and the optional
/// baseline comparison.
pub struct SegmentationPipeline {
    params: PipelineParams,
    accelerated: Box<dyn ExecutionBackend + Send>,
    baseline: HostBackend,
    labeler: RegionLabeler,
}

impl Default for SegmentationPipeline {
    fn default() -> Self {
        Self::new(PipelineParams::default())
    }
}

impl SegmentationPipeline {
    pub fn new(params: PipelineParams) -> Self {
        let clock = HostClock::new(params.power.clock_hz);
        let accelerated: Box<dyn ExecutionBackend + Send> = match params.backend {
            BackendKind::Host => Box::new(HostBackend::new(clock)),
            BackendKind::Offload => Box::new(OffloadBackend::new(clock)),
        };
        Self::with_backend(params, accelerated)
    }

    /// Use a caller-provided accelerated backend; `params.backend` is ignored.
    pub fn with_backend(
        params: PipelineParams,
        accelerated: Box<dyn ExecutionBackend + Send>,
    ) -> Self {
        let baseline = HostBackend::new(HostClock::new(params.power.clock_hz));
        let labeler = RegionLabeler::new(params.max_regions as usize);
        Self {
            params,
            accelerated,
            baseline,
            labeler,
        }
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Segment with the configured mode, or the statistics-selected one.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img), fields(width = img.width, height = img.height))
    )]
    pub fn segment(&mut self, img: &GrayImageView<'_>) -> Result<SegmentationResult, SegmentError> {
        gray_view_from_raw(img.width, img.height, img.data)?;
        let stats = compute_statistics(img);
        let (mode, auto) = match self.params.mode {
            Some(mode) => (mode, false),
            None => (select_mode(&stats), true),
        };
        log::info!(
            "stats: mean={} std={} contrast={} min={} max={} -> mode {mode}{}",
            stats.mean,
            stats.std_dev,
            stats.contrast,
            stats.min,
            stats.max,
            if auto { "" } else { " (forced)" }
        );
        self.run(img, stats, mode, auto)
    }

    /// Segment in an explicit mode. Statistics are still computed because
    /// the `Careful` fallback needs them.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img), fields(width = img.width, height = img.height, mode = %mode))
    )]
    pub fn segment_with_mode(
        &mut self,
        img: &GrayImageView<'_>,
        mode: ProcessingMode,
    ) -> Result<SegmentationResult, SegmentError> {
        gray_view_from_raw(img.width, img.height, img.data)?;
        let stats = compute_statistics(img);
        self.run(img, stats, mode, false)
    }

    fn run(
        &mut self,
        img: &GrayImageView<'_>,
        stats: ImageStatistics,
        mode: ProcessingMode,
        mode_auto_selected: bool,
    ) -> Result<SegmentationResult, SegmentError> {
        let accelerated = self.accelerated.run_threshold_stage(img, &stats, mode)?;
        let backend = self.accelerated.name();
        log::debug!(
            "{backend} stage: threshold={} cycles={}",
            accelerated.output.threshold,
            accelerated.cycles
        );

        let (performance, backends_agree) = if self.params.compare_baseline {
            let baseline_input = img.to_owned_image();
            let baseline = self
                .baseline
                .run_threshold_stage(&baseline_input.view(), &stats, mode)?;
            let agree = accelerated.output.agrees_with(&baseline.output);
            if !agree {
                log::warn!(
                    "{backend} and baseline disagree: threshold {} vs {}",
                    accelerated.output.threshold,
                    baseline.output.threshold
                );
            }
            let report =
                PerformanceReport::compute(accelerated.cycles, baseline.cycles, &self.params.power);
            log::info!(
                "speedup {:.2}x, energy savings {:.2}%",
                report.speedup,
                report.energy_savings_pct
            );
            (Some(report), Some(agree))
        } else {
            (None, None)
        };

        let stage = accelerated.output;
        let Labeling {
            regions,
            label_map,
            saturated,
        } = self.labeler.label(&stage.mask);
        log::info!(
            "threshold {} (otsu {}{}), {} region(s)",
            stage.threshold,
            stage.otsu_threshold,
            if stage.fallback_applied { ", fallback" } else { "" },
            regions.len()
        );

        Ok(SegmentationResult {
            stats,
            mode,
            mode_auto_selected,
            threshold: stage.threshold,
            otsu_threshold: stage.otsu_threshold,
            fallback_applied: stage.fallback_applied,
            foreground_pixels: stage.foreground_pixels,
            mask: stage.mask,
            regions,
            label_map,
            regions_saturated: saturated,
            backend,
            accelerated_cycles: accelerated.cycles,
            performance,
            backends_agree,
        })
    }
}
