use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use elevator_core::elevator::{Elevator, ElevatorBuilder, FocusSignal, Viewport};
use elevator_core::AppConfig;

use crate::clock::TickClock;
use crate::focus::TerminalFocus;
use crate::input::Action;
use crate::page::Page;
use crate::sound::HostSoundBackend;
use crate::theme::Theme;

pub type TerminalElevator<F, W> = Elevator<Page, TickClock, F, HostSoundBackend<W>>;

/// Demo application state
pub struct App<F: FocusSignal = TerminalFocus, W: Write = io::Stderr> {
    pub theme: Theme,
    pub should_quit: bool,
    elevator: TerminalElevator<F, W>,
    /// Written by the ride callbacks as well as by the app
    status: Rc<RefCell<Option<String>>>,
    /// `None` is the top of the page
    targets: Vec<Option<String>>,
    target_index: usize,
}

impl App {
    /// App on the real terminal: focus reporting on stdout, sound on the
    /// default output device (or the bell on stderr)
    pub fn new(config: &AppConfig, width: u16, height: u16) -> Self {
        let sound = HostSoundBackend::detect(io::stderr());
        Self::with_host(config, width, height, TerminalFocus::stdout(), sound)
    }
}

impl<F: FocusSignal, W: Write> App<F, W> {
    pub fn with_host(
        config: &AppConfig,
        width: u16,
        height: u16,
        focus: F,
        sound: HostSoundBackend<W>,
    ) -> Self {
        let page = Page::new(width, height);
        let options = config.elevator_options();

        let mut targets = vec![None];
        targets.extend(page.section_ids().into_iter().map(Some));
        let target_index = match targets.iter().position(|t| *t == options.target_element) {
            Some(index) => index,
            None => {
                targets.push(options.target_element.clone());
                targets.len() - 1
            }
        };

        let status = Rc::new(RefCell::new(None));
        let on_start = status.clone();
        let on_end = status.clone();
        let elevator = ElevatorBuilder::new(options)
            .on_start(move || *on_start.borrow_mut() = Some("Going up...".to_string()))
            .on_end(move || *on_end.borrow_mut() = Some("Ding! You have arrived.".to_string()))
            .build(page, TickClock::new(), focus, sound);

        if elevator.options().audio_enabled && !elevator.audio().is_enabled() {
            *status.borrow_mut() = Some("Audio unavailable, see the log".to_string());
        }

        Self {
            theme: Theme::default(),
            should_quit: false,
            elevator,
            status,
            targets,
            target_index,
        }
    }

    /// Re-measure the page for the content area
    pub fn resize(&mut self, width: u16, height: u16) {
        self.elevator.viewport_mut().layout(width, height);
    }

    /// Deliver the pending frame, if one is due
    pub fn tick(&mut self) {
        if let Some((handle, timestamp)) = self.elevator.frame_clock_mut().take_due() {
            self.elevator.on_frame(handle, timestamp);
        }
    }

    /// Whether the event loop should poll at animation speed
    pub fn is_animating(&self) -> bool {
        self.elevator.frame_clock().has_pending()
    }

    pub fn handle_action(&mut self, action: Action) {
        if action != Action::None {
            self.status.borrow_mut().take();
        }

        let half_page = f64::from(self.page().viewport_height() / 2).max(1.0);
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.elevator.viewport_mut().scroll_by(1.0),
            Action::ScrollUp => self.elevator.viewport_mut().scroll_by(-1.0),
            Action::ScrollHalfPageDown => self.elevator.viewport_mut().scroll_by(half_page),
            Action::ScrollHalfPageUp => self.elevator.viewport_mut().scroll_by(-half_page),
            Action::JumpToBottom => self.elevator.viewport_mut().scroll_to_bottom(),
            Action::Elevate => {
                if self.elevator.is_active() {
                    self.set_status("Already moving");
                } else {
                    self.elevator.trigger();
                }
            }
            Action::CycleTarget => self.cycle_target(),
            Action::ToggleAudio => self.toggle_audio(),
            Action::None => {}
        }
    }

    /// The terminal lost focus
    pub fn focus_lost(&mut self) {
        if self.elevator.is_active() {
            self.elevator.focus_lost();
            self.set_status("Focus lost, skipped to the destination");
        }
    }

    fn cycle_target(&mut self) {
        self.target_index = (self.target_index + 1) % self.targets.len();
        let mut options = self.elevator.options().clone();
        options.target_element = self.targets[self.target_index].clone();
        self.elevator.reconfigure(options);
        self.set_status(format!("Target: {}", self.target_label()));
    }

    fn toggle_audio(&mut self) {
        let mut options = self.elevator.options().clone();
        options.audio_enabled = !options.audio_enabled;
        let wanted = options.audio_enabled;
        self.elevator.reconfigure(options);

        let message = match (wanted, self.elevator.audio().is_enabled()) {
            (false, _) => "Audio off",
            (true, true) => "Audio on",
            (true, false) => "Audio unavailable, see the log",
        };
        self.set_status(message);
    }

    fn set_status(&self, message: impl Into<String>) {
        *self.status.borrow_mut() = Some(message.into());
    }

    pub fn page(&self) -> &Page {
        self.elevator.viewport()
    }

    pub fn phase_label(&self) -> &'static str {
        if self.elevator.is_active() {
            "ELEVATING"
        } else {
            "IDLE"
        }
    }

    pub fn scroll_offset(&self) -> f64 {
        self.page().scroll_offset()
    }

    pub fn target_label(&self) -> String {
        self.targets[self.target_index]
            .clone()
            .unwrap_or_else(|| "top".to_string())
    }

    /// Label of the elevator music while it plays
    pub fn now_playing(&self) -> Option<String> {
        let audio = self.elevator.audio();
        if !audio.is_ambient_playing() {
            return None;
        }
        audio.ambient_source().map(|source| source.label())
    }

    /// Where sound goes
    pub fn sound_output(&self) -> String {
        self.elevator.audio().backend().describe()
    }

    pub fn audio_enabled(&self) -> bool {
        self.elevator.audio().is_enabled()
    }

    pub fn status_message(&self) -> Option<String> {
        self.status.borrow().clone()
    }
}
