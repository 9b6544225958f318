use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tumorseg::core::{compute_statistics, synthetic, ProcessingMode, RegionLabeler, ThresholdStage};
use tumorseg::{BackendKind, PipelineParams, SegmentationPipeline};

fn bench_threshold_stage(c: &mut Criterion) {
    let (img, _) = synthetic::two_blobs();
    let stats = compute_statistics(&img.view());
    let mut stage = ThresholdStage::new(img.width, img.height);

    let mut group = c.benchmark_group("threshold_stage");
    for mode in ProcessingMode::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(mode), &mode, |b, &mode| {
            b.iter(|| stage.run(black_box(&img.view()), &stats, mode))
        });
    }
    group.finish();
}

fn bench_labeling(c: &mut Criterion) {
    let (img, _) = synthetic::two_blobs();
    let stats = compute_statistics(&img.view());
    let mask = ThresholdStage::default()
        .run(&img.view(), &stats, ProcessingMode::Normal)
        .mask;
    let mut labeler = RegionLabeler::default();

    c.bench_function("label_two_blobs", |b| {
        b.iter(|| labeler.label(black_box(&mask)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let (img, _) = synthetic::low_contrast();

    let mut group = c.benchmark_group("segment");
    for backend in [BackendKind::Host, BackendKind::Offload] {
        let mut pipeline = SegmentationPipeline::new(PipelineParams {
            backend,
            compare_baseline: false,
            ..PipelineParams::default()
        });
        group.bench_function(BenchmarkId::from_parameter(backend), |b| {
            b.iter(|| pipeline.segment(black_box(&img.view())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_threshold_stage, bench_labeling, bench_pipeline);
criterion_main!(benches);
