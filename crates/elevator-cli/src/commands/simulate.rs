use std::cell::Cell;
use std::rc::Rc;

use anyhow::{bail, Result};
use serde::Serialize;

use elevator_core::elevator::sim::{FocusFlag, RecordingBackend, SoundEvent, StepClock};
use elevator_core::elevator::{ElevatorBuilder, Viewport};
use elevator_core::AppConfig;
use elevator_tui::page::Page;

pub struct SimulateArgs {
    pub from: f64,
    pub step: f64,
    pub interrupt_after: Option<usize>,
    pub width: u16,
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Arrived,
    Interrupted,
}

#[derive(Debug, Serialize)]
pub struct SimFrame {
    pub frame: usize,
    pub elapsed_ms: f64,
    pub offset: f64,
}

#[derive(Debug)]
pub struct SimReport {
    pub frames: Vec<SimFrame>,
    pub outcome: Outcome,
    pub final_offset: f64,
    /// Sources that started playing, in order
    pub sounds: Vec<String>,
}

/// One JSON line of output
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Frame(&'a SimFrame),
    Sound { played: &'a str },
    End { outcome: Outcome, offset: f64, frames: usize },
}

pub fn run(config: &AppConfig, args: &SimulateArgs) -> Result<()> {
    let report = simulate(config, args)?;

    if args.json {
        for frame in &report.frames {
            println!("{}", serde_json::to_string(&Record::Frame(frame))?);
        }
        for sound in &report.sounds {
            println!("{}", serde_json::to_string(&Record::Sound { played: sound })?);
        }
        let end = Record::End {
            outcome: report.outcome,
            offset: report.final_offset,
            frames: report.frames.len(),
        };
        println!("{}", serde_json::to_string(&end)?);
        return Ok(());
    }

    println!("{:>6}  {:>10}  {:>10}", "frame", "time (ms)", "offset");
    for frame in &report.frames {
        println!(
            "{:>6}  {:>10.1}  {:>10.2}",
            frame.frame, frame.elapsed_ms, frame.offset
        );
    }
    println!();
    match report.outcome {
        Outcome::Arrived => println!(
            "Arrived at {:.2} after {} frames",
            report.final_offset,
            report.frames.len()
        ),
        Outcome::Interrupted => println!(
            "Interrupted after {} frames, jumped to {:.2}",
            report.frames.len(),
            report.final_offset
        ),
    }
    if report.sounds.is_empty() {
        println!("Sounds: none");
    } else {
        println!("Sounds: {}", report.sounds.join(", "));
    }

    Ok(())
}

/// Ride the demo page on a virtual clock
pub fn simulate(config: &AppConfig, args: &SimulateArgs) -> Result<SimReport> {
    config.validate()?;
    if !(args.step.is_finite() && args.step > 0.0) {
        bail!("--step must be a positive number of milliseconds");
    }
    if !args.from.is_finite() {
        bail!("--from must be a finite offset");
    }

    // Height 0: every row is scrollable, so any --from is reachable
    let mut viewport = Page::new(args.width, 0).flatten();
    viewport.set_scroll_offset(args.from);
    viewport.clear_writes();
    let mut clock = StepClock::new(args.step);

    let backend = RecordingBackend::new();
    let sound_log = backend.log();
    let arrived = Rc::new(Cell::new(false));
    let on_end = arrived.clone();

    let mut elevator = ElevatorBuilder::new(config.elevator_options())
        .on_end(move || on_end.set(true))
        .build(&mut viewport, &mut clock, FocusFlag::default(), backend);

    elevator.trigger();
    tracing::debug!("Simulating ride to {:?}", elevator.destination());

    let mut frames = Vec::new();
    let mut first_timestamp = None;
    let mut outcome = Outcome::Arrived;
    while let Some((handle, timestamp)) = elevator.frame_clock_mut().advance() {
        if args.interrupt_after == Some(frames.len()) {
            elevator.focus_lost();
            outcome = Outcome::Interrupted;
            break;
        }

        elevator.on_frame(handle, timestamp);
        if let Some(&offset) = elevator.viewport().writes().last() {
            let start = *first_timestamp.get_or_insert(timestamp);
            frames.push(SimFrame {
                frame: frames.len(),
                elapsed_ms: timestamp - start,
                offset,
            });
        }
    }

    let final_offset = elevator.viewport().scroll_offset();
    drop(elevator);

    if outcome == Outcome::Arrived && !arrived.get() {
        bail!("ride stopped without arriving");
    }

    let sounds = sound_log
        .events()
        .into_iter()
        .filter_map(|event| match event {
            SoundEvent::Played(source) => Some(source.to_string()),
            _ => None,
        })
        .collect();

    Ok(SimReport {
        frames,
        outcome,
        final_offset,
        sounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use elevator_core::resolve_target_offset;

    fn args() -> SimulateArgs {
        SimulateArgs {
            from: 5000.0,
            step: 16.0,
            interrupt_after: None,
            width: 80,
            json: false,
        }
    }

    #[test]
    fn test_rides_to_top() {
        let report = simulate(&AppConfig::default(), &args()).unwrap();

        assert_eq!(report.outcome, Outcome::Arrived);
        assert_eq!(report.final_offset, 0.0);
        assert_eq!(report.frames.len(), 126);
        assert_eq!(report.frames[0].elapsed_ms, 0.0);
        assert_eq!(report.frames[125].elapsed_ms, 2000.0);
        assert_eq!(
            report.sounds,
            vec!["bundled:elevator.wav", "bundled:ding.wav"]
        );
    }

    #[test]
    fn test_interrupted_ride() {
        let sim = SimulateArgs {
            interrupt_after: Some(3),
            ..args()
        };
        let report = simulate(&AppConfig::default(), &sim).unwrap();

        assert_eq!(report.outcome, Outcome::Interrupted);
        assert_eq!(report.frames.len(), 3);
        assert_eq!(report.final_offset, 0.0);
        assert_eq!(report.sounds, vec!["bundled:elevator.wav"]);
    }

    #[test]
    fn test_rides_to_section() {
        let mut config = AppConfig::default();
        config.elevator.target_element = Some("section-4".to_string());
        config.elevator.vertical_padding = 2.0;
        config.audio.enabled = false;

        let report = simulate(&config, &args()).unwrap();

        let expected = resolve_target_offset(&Page::new(80, 0), "section-4", 2.0);
        assert_eq!(report.final_offset, expected);
        assert!(report.sounds.is_empty());
    }

    #[test]
    fn test_rejects_zero_step() {
        let sim = SimulateArgs {
            step: 0.0,
            ..args()
        };
        assert!(simulate(&AppConfig::default(), &sim).is_err());
    }

    #[test]
    fn test_rejects_infinite_duration() {
        let mut config = AppConfig::default();
        config.elevator.duration_ms = Some(f64::INFINITY);
        assert!(simulate(&config, &args()).is_err());
    }

    #[test]
    fn test_json_records() {
        let frame = SimFrame {
            frame: 1,
            elapsed_ms: 16.0,
            offset: 4990.5,
        };
        let line = serde_json::to_string(&Record::Frame(&frame)).unwrap();
        assert_eq!(
            line,
            r#"{"event":"frame","frame":1,"elapsed_ms":16.0,"offset":4990.5}"#
        );

        let end = Record::End {
            outcome: Outcome::Arrived,
            offset: 0.0,
            frames: 126,
        };
        assert_eq!(
            serde_json::to_string(&end).unwrap(),
            r#"{"event":"end","outcome":"arrived","offset":0.0,"frames":126}"#
        );
    }
}
