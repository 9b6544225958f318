use approx::assert_relative_eq;
use tumorseg::core::{
    binarize, compute_statistics, strict_threshold, synthetic, GrayImage, Histogram,
    ProcessingMode, IMG_HEIGHT, IMG_WIDTH,
};
use tumorseg::{
    dice, BackendKind, ExecutionBackend, HostBackend, HostClock, OffloadBackend, PipelineParams,
    SegmentationPipeline, SegmentationResult,
};

fn segment(img: &GrayImage, params: PipelineParams) -> SegmentationResult {
    SegmentationPipeline::new(params)
        .segment(&img.view())
        .expect("segment")
}

fn host_params() -> PipelineParams {
    PipelineParams {
        backend: BackendKind::Host,
        ..PipelineParams::default()
    }
}

fn disk_area(radius: f64) -> f64 {
    std::f64::consts::PI * radius * radius
}

#[test]
fn bright_disk_on_flat_background_is_one_centered_region() {
    // Background 10, disk R = 25 at 200..230. The disk covers 3% of the
    // frame, so the spread is only std = 34 and the rules pick NORMAL.
    let (img, truth) = synthetic::disk_on_uniform(10, 0, 25, 200, 30, 1);
    let res = segment(&img, PipelineParams::default());

    assert_eq!(res.stats.min, 10);
    assert!(res.stats.contrast >= 150);
    assert_eq!(res.mode, ProcessingMode::Normal);
    assert!(res.mode_auto_selected);
    assert!(!res.fallback_applied);

    assert_eq!(res.regions.len(), 1);
    let region = &res.regions[0];
    let expected = disk_area(25.0);
    assert!((region.area as f64 - expected).abs() / expected <= 0.02);
    assert!(region.centroid.0.abs_diff(128) <= 1);
    assert!(region.centroid.1.abs_diff(128) <= 1);
    assert!(dice(&res.mask, &truth) > 0.99);
}

#[test]
fn large_high_contrast_disk_selects_fast() {
    let (img, truth) = synthetic::disk_on_uniform(10, 0, 80, 200, 30, 3);
    let res = segment(&img, PipelineParams::default());

    assert!(res.stats.contrast >= 150);
    assert!(res.stats.std_dev >= 50);
    assert_eq!(res.mode, ProcessingMode::Fast);
    assert_eq!(res.regions.len(), 1);
    // No morphology in FAST: the mask is the plain binarization.
    assert_eq!(res.mask, truth);
    assert_eq!(res.regions[0].centroid, (128, 128));
}

#[test]
fn low_contrast_disk_falls_back_to_strict_threshold() {
    // Flat 120 background with a slightly darker disk: Otsu splits inside
    // the disk band and keeps the whole background as foreground.
    let (img, _) = synthetic::disk_on_uniform(120, 0, 22, 100, 20, 5);
    let stats = compute_statistics(&img.view());
    let otsu = Histogram::from_image(&img.view()).otsu_threshold();

    let res = segment(&img, PipelineParams::default());
    assert_eq!(res.mode, ProcessingMode::Careful);
    assert_eq!(res.otsu_threshold, otsu);
    assert!((100..120).contains(&otsu));
    assert!(res.fallback_applied);
    assert_eq!(res.threshold, strict_threshold(&stats));
    assert!(res.threshold > 120);
    assert_eq!(res.foreground_pixels, 0);
    assert!(res.regions.is_empty());
}

#[test]
fn all_zero_frame_is_degenerate_but_defined() {
    let img = GrayImage::zeros(IMG_WIDTH, IMG_HEIGHT);
    let res = segment(&img, PipelineParams::default());

    assert_eq!(res.stats.contrast, 0);
    assert_eq!(res.stats.mean, 0);
    assert_eq!(res.stats.std_dev, 0);
    assert_eq!(res.mode, ProcessingMode::Careful);
    assert_eq!(res.otsu_threshold, 0);
    assert!(!res.fallback_applied);
    assert!(res.regions.is_empty());
    assert_eq!(res.label_map.labeled_count(), 0);
}

#[test]
fn synthetic_testbench_frames_segment_well() {
    let (img, truth) = synthetic::bright_circle();
    let res = segment(&img, PipelineParams::default());
    assert_eq!(res.regions.len(), 1);
    assert!(dice(&res.mask, &truth) > 0.95);

    let (img, truth) = synthetic::two_blobs();
    let res = segment(&img, PipelineParams::default());
    assert_eq!(res.regions.len(), 2);
    assert!(res.regions[0].centroid.0 < res.regions[1].centroid.0);
    assert!(dice(&res.mask, &truth) > 0.95);

    let (img, truth) = synthetic::low_contrast();
    let res = segment(&img, PipelineParams::default());
    assert_eq!(res.mode, ProcessingMode::Careful);
    assert!(res.fallback_applied);
    assert_eq!(res.regions.len(), 1);
    assert!(dice(&res.mask, &truth) > 0.9);
}

#[test]
fn backends_agree_in_every_mode() {
    let frames = [
        synthetic::bright_circle().0,
        synthetic::two_blobs().0,
        synthetic::low_contrast().0,
        GrayImage::zeros(64, 64),
    ];
    let mut host = HostBackend::new(HostClock::new(1e8));
    let mut offload = OffloadBackend::new(HostClock::new(1e8));

    for img in &frames {
        let stats = compute_statistics(&img.view());
        for mode in ProcessingMode::ALL {
            let a = host
                .run_threshold_stage(&img.view(), &stats, mode)
                .expect("host");
            let b = offload
                .run_threshold_stage(&img.view(), &stats, mode)
                .expect("offload");
            assert_eq!(a.output, b.output, "{} vs {} in {mode}", host.name(), offload.name());
        }
    }
}

#[test]
fn pipeline_reports_conformance_and_performance() {
    let (img, _) = synthetic::two_blobs();
    for backend in [BackendKind::Host, BackendKind::Offload] {
        let params = PipelineParams {
            backend,
            ..PipelineParams::default()
        };
        let res = segment(&img, params);
        assert_eq!(res.backend, backend.as_str());
        assert_eq!(res.backends_agree, Some(true));
        let perf = res.performance.expect("baseline ran");
        assert_eq!(perf.accelerated_cycles, res.accelerated_cycles);
        assert_relative_eq!(perf.accelerated_power_mw, 50.0);
        assert!(perf.speedup >= 0.0);
    }
}

#[test]
fn explicit_mode_bypasses_selection() {
    let (img, _) = synthetic::bright_circle();
    let mut pipeline = SegmentationPipeline::new(host_params());

    let fast = pipeline
        .segment_with_mode(&img.view(), ProcessingMode::Fast)
        .expect("fast");
    let careful = pipeline
        .segment_with_mode(&img.view(), ProcessingMode::Careful)
        .expect("careful");
    assert_eq!(fast.mode, ProcessingMode::Fast);
    assert_eq!(careful.mode, ProcessingMode::Careful);
    assert!(!fast.mode_auto_selected);
    // FAST keeps the raw binarization.
    assert_eq!(fast.mask, binarize(&img.view(), fast.threshold));

    let forced = segment(
        &img,
        PipelineParams {
            mode: Some(ProcessingMode::Fast),
            ..host_params()
        },
    );
    assert_eq!(forced.mode, ProcessingMode::Fast);
    assert!(!forced.mode_auto_selected);
    assert_eq!(forced.mask, fast.mask);
}

#[test]
fn region_cap_leaves_extra_specks_unlabeled() {
    // 20 isolated single-pixel specks; FAST skips the open that would erase them.
    let mut img = GrayImage::zeros(IMG_WIDTH, IMG_HEIGHT);
    for i in 0..20 {
        img.set(10 + 12 * i, 40, 255);
    }
    let params = PipelineParams {
        mode: Some(ProcessingMode::Fast),
        ..host_params()
    };
    let res = segment(&img, params);

    assert_eq!(res.foreground_pixels, 20);
    assert_eq!(res.regions.len(), 16);
    assert!(res.regions_saturated);
    assert_eq!(res.total_foreground(), 16);
    assert_eq!(res.label_map.labeled_count(), 16);
    for i in 16..20 {
        assert_eq!(res.label_map.get(10 + 12 * i, 40), 0);
    }
}

#[test]
fn configured_region_cap_is_honored() {
    let (img, _) = synthetic::two_blobs();
    let res = segment(
        &img,
        PipelineParams {
            max_regions: 1,
            ..host_params()
        },
    );
    assert_eq!(res.regions.len(), 1);
    assert!(res.regions_saturated);
}

#[test]
fn binarized_count_matches_pixels_above_threshold() {
    let (img, _) = synthetic::low_contrast();
    for t in [0u8, 75, 90, 110, 255] {
        let mask = binarize(&img.view(), t);
        let above = img.data.iter().filter(|&&v| v > t).count();
        assert_eq!(mask.count_nonzero(), above);
    }
}

#[test]
fn repeated_runs_are_deterministic() {
    let (img, _) = synthetic::low_contrast();
    let mut pipeline = SegmentationPipeline::default();
    let a = pipeline.segment(&img.view()).expect("first");
    let b = pipeline.segment(&img.view()).expect("second");
    assert_eq!(a.threshold, b.threshold);
    assert_eq!(a.mask, b.mask);
    assert_eq!(a.regions, b.regions);
    assert_eq!(a.label_map, b.label_map);
}

#[test]
fn summary_serializes_without_buffers() {
    let (img, _) = synthetic::bright_circle();
    let res = segment(&img, host_params());
    let summary = res.summary();
    assert_eq!(summary.region_count, 1);
    assert_eq!(summary.total_region_area, res.total_foreground());

    let json = serde_json::to_value(&summary).expect("serialize");
    assert_eq!(json["mode"], "normal");
    assert!(json.get("mask").is_none());
    assert!(json["performance"]["speedup"].is_number());
}
