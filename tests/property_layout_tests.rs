use multiplot_rs::render::RecordingSurface;
use multiplot_rs::{PanelSplit, Plot, StyleSheet};
use proptest::collection::vec;
use proptest::prelude::*;

/// Strictly decreasing split fractions in (0, 1), top to bottom.
fn decreasing_splits() -> impl Strategy<Value = Vec<f64>> {
    vec(0.01f64..0.99, 1..6).prop_map(|mut fractions| {
        fractions.sort_by(|a, b| b.partial_cmp(a).expect("finite fractions"));
        fractions.dedup();
        fractions
    })
}

proptest! {
    #[test]
    fn split_lists_partition_the_surface(fractions in decreasing_splits()) {
        let splits: Vec<PanelSplit> = fractions.iter().copied().map(PanelSplit::at).collect();
        let plot = Plot::new(RecordingSurface::new(), &splits, StyleSheet::default())
            .expect("valid plot");

        prop_assert_eq!(plot.n_panels(), fractions.len() + 1);

        // Extents cover [0, 1] with no overlap and no uncovered gap.
        let mut upper = 1.0;
        for index in 0..plot.n_panels() {
            let region = plot.panel(index).expect("panel").region();
            prop_assert!((region.upper - upper).abs() <= 1e-12);
            prop_assert!(region.lower < region.upper);
            upper = region.lower;
        }
        prop_assert!(upper.abs() <= 1e-12);
    }

    #[test]
    fn panel_margins_respect_the_shared_budget(fractions in decreasing_splits()) {
        let sheet = StyleSheet::default();
        let splits: Vec<PanelSplit> = fractions.iter().copied().map(PanelSplit::at).collect();
        let plot = Plot::new(RecordingSurface::new(), &splits, sheet.clone())
            .expect("valid plot");

        for index in 0..plot.n_panels() {
            let panel = plot.panel(index).expect("panel");
            let margins = panel.margins();
            prop_assert!(margins.top >= sheet.canvas_margins.top - 1e-12);
            prop_assert!(margins.bottom >= sheet.canvas_margins.bottom - 1e-12);
            // Effective height equals the region's share of the usable band.
            let expected = panel.region().height() * sheet.canvas_margins.usable_height();
            prop_assert!((panel.height() - expected).abs() <= 1e-9);
        }
    }

    #[test]
    fn unrolled_slots_always_tile_the_usable_width(
        n_bins in 1usize..8,
        contents in vec(0.1f64..50.0, 8),
    ) {
        let mut plot = Plot::new(RecordingSurface::new(), &[], StyleSheet::default())
            .expect("valid plot");
        let dist = multiplot_rs::core::Distribution::with_uniform_bins(
            contents.len(), 0.0, 100.0, contents,
        ).expect("valid distribution");
        plot.add_dist(&dist, "data", "obs").expect("add data");

        let names: Vec<String> = (0..n_bins).map(|i| format!("b{i}")).collect();
        plot.panel_mut(0)
            .expect("panel")
            .unroll(names, 0.9, 0.0, 1.0, None)
            .expect("unroll");
        plot.draw_panel(0, &["data"]).expect("draw");

        let sheet = StyleSheet::default();
        let surface = plot.into_surface();
        let margins = surface.margin_calls();
        prop_assert_eq!(margins.len(), n_bins);

        let mut cursor = sheet.canvas_margins.left;
        for margin in &margins {
            prop_assert!((margin.left - cursor).abs() <= 1e-9);
            cursor = 1.0 - margin.right;
        }
        prop_assert!((cursor - (1.0 - sheet.canvas_margins.right)).abs() <= 1e-9);
    }
}
