use diffusion_viz::prelude::*;
use glam::DVec2;

fn kl() -> Box<dyn MountedVisualization> {
    let config = VisualizationConfig::from_json(r#"{"kind": "kl"}"#).unwrap();
    mount_config(&config, Container::new(600.0, 450.0)).unwrap()
}

#[test]
fn slider_input_redraws_synchronously() {
    let viz = kl();
    assert_eq!(viz.generation(), 1);
    assert_eq!(viz.readouts()[0].latex, "0.18");

    let value = viz.set_parameter_input("mean_p", "1.26").unwrap();
    assert_eq!(value, 1.3);
    assert_eq!(viz.generation(), 2);
    assert_ne!(viz.readouts()[0].latex, "0.18");

    assert_eq!(viz.set_parameter_input("mean_p", " 1.24 ").unwrap(), 1.2);
    assert_eq!(viz.set_parameter_input("mean_p", "-0.04").unwrap(), 0.0);
}

#[test]
fn input_snaps_onto_a_long_fractional_grid() {
    let json = r#"{
        "kind": "gaussian",
        "mean": {"label": "m", "min": -80.56068541279251, "max": -16.45816635126031, "step": 0.01, "value": -80.56068541279251}
    }"#;
    let config = VisualizationConfig::from_json(json).unwrap();
    let viz = mount_config(&config, Container::new(600.0, 450.0)).unwrap();
    let min = -80.56068541279251;
    let value = viz.set_parameter_input("mean", "0").unwrap();
    let k = (value - min) / 0.01;
    assert!((k - k.round()).abs() < 1e-6, "{value} off grid (k = {k})");
    assert!((value - (min + 6410.0 * 0.01)).abs() < 1e-9);
}

#[test]
fn out_of_range_input_is_clamped_not_rejected() {
    let viz = kl();
    assert_eq!(viz.set_parameter("std_q", 50.0).unwrap(), 10.0);
    assert_eq!(viz.set_parameter("std_q", -1.0).unwrap(), 0.1);
}

#[test]
fn garbage_input_is_an_error_and_keeps_state() {
    let viz = kl();
    let before = viz.generation();
    let err = viz.set_parameter_input("mean_q", "not a number").unwrap_err();
    assert!(matches!(err.current_context(), VizError::InvalidInput(_)));
    assert_eq!(viz.generation(), before);
}

#[test]
fn unmount_leaves_no_listener_behind() {
    let explorer = GaussianExplorer::from_config(&GaussianConfig::default()).unwrap();
    let mean = explorer.mean().clone();
    let composition = Composition::mount(explorer, Container::new(600.0, 450.0));
    mean.set_value(1.0);
    assert_eq!(composition.generation(), 2);

    let container = composition.unmount();
    assert!(container.scene().is_empty());
    assert_eq!(mean.subscriber_count(), 0);
    // nothing left to redraw; must not panic
    mean.set_value(2.0);
}

#[test]
fn zero_width_container_is_a_noop_render() {
    let config = VisualizationConfig::default_for("gaussian").unwrap();
    let viz = mount_config(&config, Container::new(0.0, 450.0)).unwrap();
    assert!(viz.scene().is_empty());
    viz.set_parameter("mean", 1.0).unwrap();
    assert!(viz.scene().is_empty());

    viz.resize(DVec2::new(600.0, 450.0));
    assert!(!viz.scene().is_empty());
}

#[test]
fn svg_output_for_every_kind() {
    for kind in ["die", "loaded_die", "gaussian", "kl", "covariance", "stepper"] {
        let config = VisualizationConfig::default_for(kind).unwrap();
        let viz = mount_config(&config, Container::new(540.0, 540.0)).unwrap();
        let svg = viz.scene().to_svg();
        assert!(svg.starts_with("<svg"), "{kind}");
        assert!(svg.ends_with("</svg>"), "{kind}");
        assert!(!svg.contains("NaN"), "{kind}");
    }
}
