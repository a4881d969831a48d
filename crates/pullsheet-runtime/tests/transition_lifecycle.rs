#![forbid(unsafe_code)]

//! Modal present/dismiss transitions.

use std::time::Duration;

use pullsheet_core::config::{SheetConfig, TransitionTuning};
use pullsheet_core::coupling::PresentationMode;
use pullsheet_core::offsets::OffsetConfiguration;
use pullsheet_harness::{RecordingHost, RecordingTransitionContext};
use pullsheet_runtime::host::SceneHost;
use pullsheet_runtime::transition::{TransitionController, TransitionStart, TransitionTick};

const FRAME: Duration = Duration::from_millis(16);

fn offsets() -> OffsetConfiguration {
    OffsetConfiguration::new(48.0, 440.0, 800.0).unwrap()
}

fn controller(mode: PresentationMode) -> TransitionController {
    TransitionController::new(offsets(), &SheetConfig::default(), mode).unwrap()
}

fn run(transition: &mut TransitionController, host: &mut RecordingHost) -> TransitionTick {
    let mut last = TransitionTick::Idle;
    for _ in 0..100 {
        last = transition.tick(host, FRAME);
        if !matches!(last, TransitionTick::Frame { .. }) {
            break;
        }
    }
    last
}

#[test]
fn duration_comes_from_config() {
    let config = SheetConfig {
        transition: TransitionTuning {
            duration_ms: 250,
            ..TransitionTuning::default()
        },
        ..SheetConfig::default()
    };
    let transition =
        TransitionController::new(offsets(), &config, PresentationMode::None).unwrap();
    assert_eq!(transition.transition_duration(), Duration::from_millis(250));
    assert_eq!(
        controller(PresentationMode::None).transition_duration(),
        Duration::from_millis(400)
    );
}

#[test]
fn zero_duration_is_rejected() {
    let config = SheetConfig {
        transition: TransitionTuning {
            duration_ms: 0,
            ..TransitionTuning::default()
        },
        ..SheetConfig::default()
    };
    assert!(TransitionController::new(offsets(), &config, PresentationMode::None).is_err());
}

#[test]
fn present_slides_panel_to_initial() {
    let mut host = RecordingHost::new();
    let container = host.add_surface(0.0, 800.0);
    let presenter = host.add_surface(0.0, 800.0);
    let panel = host.add_surface(800.0, 800.0);
    let mut ctx = RecordingTransitionContext::new(presenter, panel, container);
    let mut transition = controller(PresentationMode::None);

    assert_eq!(
        transition.animate(&mut host, &mut ctx, true),
        TransitionStart::Started
    );
    assert_eq!(host.origin_y(panel), Some(800.0));
    assert_eq!(
        run(&mut transition, &mut host),
        TransitionTick::Completed {
            is_presenting: true
        }
    );
    assert_eq!(host.origin_y(panel), Some(440.0));
    assert!(host.transform(presenter).unwrap().is_identity());
    assert_eq!(ctx.completions(), vec![true]);

    let history = host.origin_history(panel);
    assert!(history.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn dismiss_slides_panel_off_screen() {
    let mut host = RecordingHost::new();
    let container = host.add_surface(0.0, 800.0);
    let presenter = host.add_surface(0.0, 800.0);
    let panel = host.add_surface(48.0, 800.0);
    let mut ctx = RecordingTransitionContext::new(panel, presenter, container);
    let mut transition = controller(PresentationMode::None);

    transition.animate(&mut host, &mut ctx, false);
    assert!(!host.transform(presenter).unwrap().is_identity());
    assert_eq!(
        run(&mut transition, &mut host),
        TransitionTick::Completed {
            is_presenting: false
        }
    );
    assert_eq!(host.origin_y(panel), Some(800.0));
    assert!(host.transform(presenter).unwrap().is_identity());
}

#[test]
fn missing_container_completes_unfinished() {
    let mut host = RecordingHost::new();
    let presenter = host.add_surface(0.0, 800.0);
    let panel = host.add_surface(800.0, 800.0);
    let mut ctx = RecordingTransitionContext::new(presenter, panel, presenter).without_container();
    let mut transition = controller(PresentationMode::None);
    assert_eq!(
        transition.animate(&mut host, &mut ctx, true),
        TransitionStart::Aborted
    );
    assert_eq!(ctx.completions(), vec![false]);
    assert!(!transition.is_running());
}

#[test]
fn panel_released_mid_transition_aborts() {
    let mut host = RecordingHost::new();
    let container = host.add_surface(0.0, 800.0);
    let presenter = host.add_surface(0.0, 800.0);
    let panel = host.add_surface(800.0, 800.0);
    let mut ctx = RecordingTransitionContext::new(presenter, panel, container);
    let mut transition = controller(PresentationMode::None);

    transition.animate(&mut host, &mut ctx, true);
    transition.tick(&mut host, FRAME);
    host.remove_surface(panel);
    assert_eq!(
        transition.tick(&mut host, FRAME),
        TransitionTick::Aborted
    );
    assert_eq!(ctx.completions(), vec![false]);
    assert_eq!(transition.tick(&mut host, FRAME), TransitionTick::Idle);
}

#[test]
fn restarting_completes_previous_context_as_unfinished() {
    let mut host = RecordingHost::new();
    let container = host.add_surface(0.0, 800.0);
    let presenter = host.add_surface(0.0, 800.0);
    let panel = host.add_surface(800.0, 800.0);
    let mut present_ctx = RecordingTransitionContext::new(presenter, panel, container);
    let mut dismiss_ctx = RecordingTransitionContext::new(panel, presenter, container);
    let mut transition = controller(PresentationMode::None);

    transition.animate(&mut host, &mut present_ctx, true);
    transition.tick(&mut host, FRAME);
    assert_eq!(
        transition.animate(&mut host, &mut dismiss_ctx, false),
        TransitionStart::Started
    );
    assert_eq!(present_ctx.completions(), vec![false]);
    assert!(dismiss_ctx.completions().is_empty());

    assert_eq!(
        run(&mut transition, &mut host),
        TransitionTick::Completed {
            is_presenting: false
        }
    );
    assert_eq!(present_ctx.completions(), vec![false]);
    assert_eq!(dismiss_ctx.completions(), vec![true]);
    assert_eq!(host.origin_y(panel), Some(800.0));
}

#[test]
fn restart_with_missing_surfaces_still_completes_both() {
    let mut host = RecordingHost::new();
    let container = host.add_surface(0.0, 800.0);
    let presenter = host.add_surface(0.0, 800.0);
    let panel = host.add_surface(800.0, 800.0);
    let mut first = RecordingTransitionContext::new(presenter, panel, container);
    let mut second =
        RecordingTransitionContext::new(panel, presenter, container).without_container();
    let mut transition = controller(PresentationMode::None);

    transition.animate(&mut host, &mut first, true);
    assert_eq!(
        transition.animate(&mut host, &mut second, false),
        TransitionStart::Aborted
    );
    assert_eq!(first.completions(), vec![false]);
    assert_eq!(second.completions(), vec![false]);
    assert!(!transition.is_running());
}

#[test]
fn cancel_reports_once() {
    let mut host = RecordingHost::new();
    let container = host.add_surface(0.0, 800.0);
    let presenter = host.add_surface(0.0, 800.0);
    let panel = host.add_surface(800.0, 800.0);
    let mut ctx = RecordingTransitionContext::new(presenter, panel, container);
    let mut transition = controller(PresentationMode::None);

    transition.animate(&mut host, &mut ctx, true);
    assert!(transition.cancel());
    assert!(!transition.cancel());
    assert_eq!(ctx.completions(), vec![false]);
}

#[test]
fn default_mode_anchors_displaced_presenter() {
    let mut host = RecordingHost::new();
    let container = host.add_surface(0.0, 800.0);
    let presenter = host.add_surface(20.0, 780.0);
    let panel = host.add_surface(48.0, 800.0);
    let mut ctx = RecordingTransitionContext::new(panel, presenter, container);
    let mut transition = controller(PresentationMode::Default);

    transition.animate(&mut host, &mut ctx, false);
    let t = host.transform(presenter).unwrap();
    assert!((t.visual_top(20.0, 780.0) - 38.0).abs() < 1e-9);
    assert!(host.is_alive(presenter));
}
