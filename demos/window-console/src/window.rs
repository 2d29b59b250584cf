//! winit window and event pump feeding the console.

use std::{collections::VecDeque, rc::Rc, time::Duration};

use compact_str::CompactString;
use rogueterm_core::{ConsoleConfig, ConsoleEvent, Error, EventSource};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowAttributes, WindowId},
};

use crate::keys::scancode_name;

/// Pumps allowed for the platform to deliver the first `resumed`.
const STARTUP_PUMPS: usize = 200;
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(5);

/// Receives winit callbacks between pumps.
struct WindowState {
    attributes: WindowAttributes,
    window: Option<Rc<Window>>,
    pending: VecDeque<ConsoleEvent>,
    pressed: Vec<CompactString>,
    error: Option<String>,
}

impl WindowState {
    fn key(&mut self, code: KeyCode, state: ElementState) {
        let name = scancode_name(code);
        match state {
            ElementState::Pressed if !self.pressed.contains(&name) => self.pressed.push(name),
            ElementState::Pressed => {},
            ElementState::Released => self.pressed.retain(|key| *key != name),
        }
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => self.window = Some(Rc::new(window)),
            Err(err) => {
                self.error = Some(err.to_string());
                event_loop.exit();
            },
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        let event = match event {
            WindowEvent::CloseRequested => ConsoleEvent::Quit,
            WindowEvent::Resized(size) => {
                ConsoleEvent::Resized { width: size.width, height: size.height }
            },
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, .. },
                ..
            } => {
                self.key(code, state);
                ConsoleEvent::Other
            },
            WindowEvent::Focused(false) => {
                // keys released while unfocused never report
                self.pressed.clear();
                ConsoleEvent::Other
            },
            _ => return,
        };

        self.pending.push_back(event);
    }
}

fn window_attributes(config: &ConsoleConfig) -> WindowAttributes {
    let (width, height) = config.window_size;
    Window::default_attributes()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(width, height))
        .with_resizable(true)
}

/// [`EventSource`] over a winit event loop.
///
/// The first poll of each frame pumps the platform queue without waiting;
/// later polls drain what that pump collected.
pub struct WinitEvents {
    event_loop: Option<EventLoop<()>>,
    state: WindowState,
    pumped: bool,
}

impl WinitEvents {
    /// Creates the event loop and a window titled and sized from `config`,
    /// with `config.window_size` as the inner size in physical pixels.
    ///
    /// # Errors
    /// Fails if the platform refuses the event loop or the window.
    pub fn open(config: &ConsoleConfig) -> Result<Self, Error> {
        let mut event_loop =
            EventLoop::new().map_err(|e| Error::window_creation_failed(&e.to_string()))?;

        let attributes = window_attributes(config);
        let mut state = WindowState {
            attributes,
            window: None,
            pending: VecDeque::new(),
            pressed: Vec::new(),
            error: None,
        };

        for _ in 0..STARTUP_PUMPS {
            if state.window.is_some() || state.error.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut state)
            {
                tracing::debug!(code, "event loop exited during startup");
                break;
            }
        }

        if let Some(err) = state.error.take() {
            return Err(Error::window_creation_failed(&err));
        }
        if state.window.is_none() {
            return Err(Error::window_creation_failed("platform never resumed the application"));
        }

        let (width, height) = config.window_size;
        tracing::debug!(title = %config.title, width, height, "opened window");
        Ok(Self { event_loop: Some(event_loop), state, pumped: false })
    }

    /// The window, until the event source is released.
    pub fn window(&self) -> Option<Rc<Window>> {
        self.state.window.clone()
    }

    fn pump(&mut self) {
        let Some(event_loop) = self.event_loop.as_mut() else { return };

        let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state);
        if let PumpStatus::Exit(code) = status {
            tracing::debug!(code, "event loop exited");
            self.state.pending.push_back(ConsoleEvent::Quit);
        }
    }
}

impl EventSource for WinitEvents {
    fn poll_event(&mut self) -> Option<ConsoleEvent> {
        if self.state.pending.is_empty() && !self.pumped {
            self.pump();
            self.pumped = true;
        }

        let event = self.state.pending.pop_front();
        if event.is_none() {
            self.pumped = false;
        }
        event
    }

    fn pressed_key_names(&self) -> Vec<CompactString> {
        self.state.pressed.clone()
    }

    fn release(&mut self) {
        self.state.pending.clear();
        self.state.pressed.clear();
        if self.state.window.take().is_some() {
            tracing::debug!("closed window");
        }
        self.event_loop = None;
    }
}
