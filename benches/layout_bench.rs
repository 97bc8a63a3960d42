use criterion::{Criterion, criterion_group, criterion_main};
use multiplot_rs::core::Distribution;
use multiplot_rs::render::RecordingSurface;
use multiplot_rs::{PanelSplit, Plot, StyleSheet};
use std::hint::black_box;

fn bench_plot_construction_16_panels(c: &mut Criterion) {
    let splits: Vec<PanelSplit> = (1..16)
        .rev()
        .map(|i| PanelSplit::at(f64::from(i) / 16.0))
        .collect();

    c.bench_function("plot_construction_16_panels", |b| {
        b.iter(|| {
            let plot = Plot::new(
                RecordingSurface::new(),
                black_box(&splits),
                StyleSheet::default(),
            )
            .expect("valid plot");
            black_box(plot.n_panels())
        })
    });
}

fn bench_group_resolution_200_series(c: &mut Criterion) {
    let mut plot = Plot::new(RecordingSurface::new(), &[], StyleSheet::default())
        .expect("valid plot");
    let dist = Distribution::with_uniform_bins(50, 0.0, 50.0, vec![1.0; 50])
        .expect("valid distribution");
    for index in 0..200 {
        plot.add_dist(&dist, &format!("proc{index}"), "bkg")
            .expect("register series");
    }
    let panel = plot.panel(0).expect("panel");

    c.bench_function("group_resolution_200_series", |b| {
        b.iter(|| {
            let summed = panel.get(black_box("bkg")).expect("group sum");
            black_box(summed.integral())
        })
    });
}

fn bench_unrolled_draw_8_bins(c: &mut Criterion) {
    let contents: Vec<f64> = (0..64).map(|i| 1.0 + f64::from(i)).collect();
    let dist = Distribution::with_uniform_bins(64, 0.0, 640.0, contents)
        .expect("valid distribution");

    c.bench_function("unrolled_draw_8_bins", |b| {
        b.iter(|| {
            let mut plot = Plot::new(RecordingSurface::new(), &[], StyleSheet::default())
                .expect("valid plot");
            plot.add_dist(&dist, "data", "obs").expect("register");
            let names: Vec<String> = (0..8).map(|i| format!("bin {i}")).collect();
            plot.panel_mut(0)
                .expect("panel")
                .unroll(names, 0.93, 0.0, 1.0, None)
                .expect("unroll");
            plot.draw_panel(0, &["data"]).expect("draw");
            black_box(plot.into_surface().draw_count())
        })
    });
}

criterion_group!(
    benches,
    bench_plot_construction_16_panels,
    bench_group_resolution_200_series,
    bench_unrolled_draw_8_bins
);
criterion_main!(benches);
