use multiplot_rs::core::{Axis, Distribution, DrawStyle};
use multiplot_rs::render::{RecordingSurface, SurfaceCommand};
use multiplot_rs::{PanelSplit, Plot, StyleSheet};

fn plot() -> Plot<RecordingSurface> {
    Plot::new(
        RecordingSurface::new(),
        &[PanelSplit::at(0.35)],
        StyleSheet::default(),
    )
    .expect("valid plot")
}

fn dist(contents: Vec<f64>) -> Distribution {
    let n = contents.len();
    Distribution::with_uniform_bins(n, 0.0, n as f64, contents).expect("valid distribution")
}

fn styled(mode: &str) -> DrawStyle {
    DrawStyle {
        draw_mode: mode.to_owned(),
        ..DrawStyle::default()
    }
}

#[test]
fn margins_are_set_before_any_draw() {
    let mut plot = plot();
    plot.add_dist(&dist(vec![1.0, 2.0]), "bkg", "mc").expect("add");
    plot.draw_panel(0, &["bkg"]).expect("draw");

    let surface = plot.into_surface();
    assert!(matches!(
        surface.commands.first(),
        Some(SurfaceCommand::SetMargins(_))
    ));
}

#[test]
fn only_the_base_layer_carries_the_axis_frame() {
    let mut plot = plot();
    plot.add_dist(&dist(vec![1.0, 2.0]), "bkg", "mc").expect("add bkg");
    plot.add_dist(&dist(vec![0.5, 0.5]), "sig", "mc").expect("add sig");
    plot.add_dist(&dist(vec![1.5, 1.5]), "data", "obs").expect("add data");

    plot.draw_panel(0, &["bkg", "sig", "data"]).expect("draw");

    let surface = plot.into_surface();
    assert_eq!(surface.draw_count(), 3);
    assert!(!surface.draws[0].overlay);
    assert!(surface.draws[0].axis.is_some());
    for overlay in &surface.draws[1..] {
        assert!(overlay.overlay);
        assert!(overlay.axis.is_none());
    }
}

#[test]
fn unmatched_selector_is_skipped_and_the_next_becomes_base() {
    let mut plot = plot();
    plot.add_dist(&dist(vec![1.0]), "data", "obs").expect("add data");

    plot.draw_panel(0, &["missing", "data"]).expect("draw");

    let surface = plot.into_surface();
    assert_eq!(surface.draw_count(), 1);
    assert_eq!(surface.draws[0].series, "data");
    assert!(!surface.draws[0].overlay);
}

#[test]
fn group_selector_expands_in_registration_order() {
    let mut plot = plot();
    plot.add_dist(&dist(vec![1.0]), "w", "bkg").expect("add w");
    plot.add_dist(&dist(vec![2.0]), "tt", "bkg").expect("add tt");

    plot.draw_panel(0, &["bkg"]).expect("draw");

    let surface = plot.into_surface();
    let names: Vec<&str> = surface.draws.iter().map(|draw| draw.series.as_str()).collect();
    assert_eq!(names, ["w", "tt"]);
}

#[test]
fn log_scale_and_ranges_are_issued_before_the_base_draw() {
    let mut plot = plot();
    plot.add_dist(&dist(vec![1.0, 2.0]), "bkg", "mc").expect("add");
    {
        let panel = plot.panel_mut(0).expect("panel");
        panel.set_log_y();
        panel.set_y_lims(0.0, 100.0).expect("y lims");
        panel.set_x_lims(0.0, 2.0).expect("x lims");
    }
    plot.draw_panel(0, &["bkg"]).expect("draw");

    let surface = plot.into_surface();
    let draw_position = surface
        .commands
        .iter()
        .position(|command| matches!(command, SurfaceCommand::Draw { .. }))
        .expect("draw command");
    let log_position = surface
        .commands
        .iter()
        .position(|command| {
            matches!(
                command,
                SurfaceCommand::SetLogScale {
                    axis: Axis::Y,
                    enabled: true
                }
            )
        })
        .expect("log command");
    assert!(log_position < draw_position);

    // The log clamp replaces the non-positive lower bound.
    let clamped = surface.commands.iter().any(|command| {
        matches!(
            command,
            SurfaceCommand::SetRange { axis: Axis::Y, lo, .. } if *lo > 0.0
        )
    });
    assert!(clamped);
}

#[test]
fn stacked_base_layer_compresses_the_explicit_upper_bound() {
    let mut plot = plot();
    plot.add_dist(&dist(vec![1.0, 2.0]), "w", "bkg").expect("add w");
    plot.create_stack(&["w"], "stack", "stacks").expect("stack");
    plot.panel_mut(0)
        .expect("panel")
        .set_y_lims(0.0, 105.0)
        .expect("y lims");

    plot.draw_panel(0, &["stack"]).expect("draw");

    let surface = plot.into_surface();
    let frame = surface.draws[0].axis.as_ref().expect("axis frame");
    let (_, hi) = frame.y_range.expect("y range");
    assert!((hi - 100.0).abs() <= 1e-9);
}

#[test]
fn styling_a_group_skips_stacks_but_styles_the_rest() {
    let mut plot = plot();
    plot.add_dist(&dist(vec![1.0]), "w", "bkg").expect("add w");
    plot.create_stack(&["w"], "stack", "bkg").expect("stack in group");
    plot.add_dist(&dist(vec![2.0]), "tt", "bkg").expect("add tt");

    plot.set_series_style("bkg", styled("e2")).expect("style group");

    let panel = plot.panel(0).expect("panel");
    assert_eq!(panel.series("w").expect("w").style.draw_mode, "e2");
    assert_eq!(panel.series("tt").expect("tt").style.draw_mode, "e2");
    // The stack keeps its own mode: members are styled individually.
    assert_eq!(panel.series("stack").expect("stack").style.draw_mode, "hist");
}

#[test]
fn draw_all_skips_the_invisible_group() {
    let mut plot = plot();
    plot.add_dist(&dist(vec![1.0]), "visible", "mc").expect("add visible");
    plot.add_dist(&dist(vec![2.0]), "hidden", "invisible").expect("add hidden");

    plot.draw_panel_all(0).expect("draw all");

    let surface = plot.into_surface();
    let names: Vec<&str> = surface.draws.iter().map(|draw| draw.series.as_str()).collect();
    assert_eq!(names, ["visible"]);
}

#[test]
fn draw_mode_token_reaches_the_surface() {
    let mut plot = plot();
    plot.add_dist(&dist(vec![1.0]), "unc", "bands").expect("add");
    plot.set_series_style("unc", styled("e2")).expect("style");

    plot.draw_panel(0, &["unc"]).expect("draw");

    let surface = plot.into_surface();
    assert_eq!(surface.draws[0].mode, "e2");
}
