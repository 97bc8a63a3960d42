use multiplot_rs::core::PanelRegion;
use multiplot_rs::render::RecordingSurface;
use multiplot_rs::{PanelSplit, Plot, PlotError, StyleSheet};

fn plot(splits: &[PanelSplit]) -> Plot<RecordingSurface> {
    Plot::new(RecordingSurface::new(), splits, StyleSheet::default()).expect("valid plot")
}

#[test]
fn single_split_yields_two_panels_with_expected_extents() {
    let plot = plot(&[PanelSplit::at(0.7)]);
    assert_eq!(plot.n_panels(), 2);

    let top = plot.panel(0).expect("panel 0").region();
    let bottom = plot.panel(1).expect("panel 1").region();
    assert_eq!((top.lower, top.upper), (0.7, 1.0));
    assert_eq!((bottom.lower, bottom.upper), (0.0, 0.7));
}

#[test]
fn clean_splits_partition_the_surface_without_gaps() {
    let plot = plot(&[PanelSplit::at(0.65), PanelSplit::at(0.35), PanelSplit::at(0.2)]);
    assert_eq!(plot.n_panels(), 4);

    let mut covered = 0.0;
    for index in (0..plot.n_panels()).rev() {
        let region = plot.panel(index).expect("panel").region();
        assert!((region.lower - covered).abs() <= 1e-12);
        covered = region.upper;
    }
    assert!((covered - 1.0).abs() <= 1e-12);
}

#[test]
fn pair_entries_open_gaps_between_panels() {
    let plot = plot(&[
        PanelSplit::at(0.65),
        PanelSplit::gap(0.47, 0.45),
        PanelSplit::gap(0.22, 0.20),
    ]);
    assert_eq!(plot.n_panels(), 4);

    let second = plot.panel(1).expect("panel 1").region();
    let third = plot.panel(2).expect("panel 2").region();
    assert_eq!((second.lower, second.upper), (0.47, 0.65));
    // The gap spans [0.45, 0.47].
    assert_eq!((third.lower, third.upper), (0.22, 0.45));
}

#[test]
fn increasing_split_fractions_are_a_configuration_error() {
    let result = Plot::new(
        RecordingSurface::new(),
        &[PanelSplit::at(0.3), PanelSplit::at(0.6)],
        StyleSheet::default(),
    );
    assert!(matches!(result, Err(PlotError::Configuration(_))));
}

#[test]
fn panel_edges_align_exactly_across_the_stack() {
    let sheet = StyleSheet::default();
    let plot = Plot::new(RecordingSurface::new(), &[PanelSplit::at(0.3)], sheet.clone())
        .expect("valid plot");

    let top = plot.panel(0).expect("panel 0").margins();
    let bottom = plot.panel(1).expect("panel 1").margins();

    // The top panel's lower edge and the bottom panel's upper edge meet at
    // the same surface coordinate.
    assert!((1.0 - top.bottom - bottom.top).abs() <= 1e-12);

    let usable = sheet.canvas_margins.usable_height();
    assert!((top.top - sheet.canvas_margins.top).abs() <= 1e-12);
    assert!((top.bottom - (sheet.canvas_margins.bottom + 0.3 * usable)).abs() <= 1e-12);
    assert!((bottom.top - (sheet.canvas_margins.top + 0.7 * usable)).abs() <= 1e-12);
    assert!((bottom.bottom - sheet.canvas_margins.bottom).abs() <= 1e-12);
}

#[test]
fn panel_index_out_of_range_is_a_configuration_error() {
    let plot = plot(&[PanelSplit::at(0.5)]);
    assert!(matches!(plot.panel(2), Err(PlotError::Configuration(_))));
}

#[test]
fn split_list_round_trips_through_serde() {
    let splits = vec![PanelSplit::at(0.65), PanelSplit::gap(0.47, 0.45)];
    let json = serde_json::to_string(&splits).expect("serialize");
    let back: Vec<PanelSplit> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, splits);
}

#[test]
fn panel_regions_serialize_stably() {
    let plot = plot(&[PanelSplit::at(0.7)]);
    let regions: Vec<PanelRegion> = (0..plot.n_panels())
        .map(|index| plot.panel(index).expect("panel").region())
        .collect();
    let json = serde_json::to_string(&regions).expect("serialize");
    assert_eq!(
        json,
        r#"[{"lower":0.7,"upper":1.0},{"lower":0.0,"upper":0.7}]"#
    );
}
