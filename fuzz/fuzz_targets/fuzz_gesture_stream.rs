#![no_main]

use std::rc::Rc;
use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pullsheet_core::config::SheetConfig;
use pullsheet_core::coupling::PresentationMode;
use pullsheet_core::drag::GesturePhase;
use pullsheet_core::offsets::OffsetConfiguration;
use pullsheet_harness::RecordingHost;
use pullsheet_runtime::controller::{ControllerTick, DragOutcome, GestureSample, PanelController};
use pullsheet_runtime::handler::PositionHandler;

#[derive(Debug, Arbitrary)]
enum Step {
    Sample { phase: u8, translation: f32, velocity: f32 },
    Tick { millis: u8 },
    RemovePresenter,
}

#[derive(Debug, Arbitrary)]
struct Input {
    final_top: u16,
    span: u16,
    tail: u16,
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    let final_top = f64::from(input.final_top % 400);
    let initial = final_top + f64::from(input.span % 400);
    let screen = initial + f64::from(input.tail % 800);
    let Ok(offsets) = OffsetConfiguration::new(final_top, initial, screen) else {
        return;
    };

    let mut host = RecordingHost::new();
    let presenter = host.add_surface(0.0, screen);
    let panel = host.add_surface(initial, screen);
    let handler = Rc::new(PositionHandler::default());
    let Ok(mut controller) = PanelController::new(
        panel,
        presenter,
        offsets,
        &SheetConfig::default(),
        &handler,
        PresentationMode::Default,
    ) else {
        return;
    };

    for step in input.steps.into_iter().take(256) {
        match step {
            Step::Sample {
                phase,
                translation,
                velocity,
            } => {
                let phase = match phase % 6 {
                    0 => GesturePhase::Possible,
                    1 => GesturePhase::Began,
                    2 => GesturePhase::Changed,
                    3 => GesturePhase::Ended,
                    4 => GesturePhase::Cancelled,
                    _ => GesturePhase::Failed,
                };
                let sample = GestureSample::new(phase, f64::from(translation), f64::from(velocity));
                if let DragOutcome::Moved { y } = controller.handle_gesture(&mut host, sample) {
                    assert!(y >= final_top && y <= screen, "drag escaped bounds: {y}");
                }
            }
            Step::Tick { millis } => {
                let tick = controller.tick(&mut host, Duration::from_millis(u64::from(millis)));
                if let ControllerTick::Settled { target, offset, .. } = tick {
                    assert_eq!(offset, offsets.offset(target));
                }
            }
            Step::RemovePresenter => host.remove_surface(presenter),
        }
    }
});
