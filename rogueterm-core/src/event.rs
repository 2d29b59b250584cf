use std::collections::VecDeque;

use compact_str::CompactString;

/// Input events the console loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleEvent {
    /// The user asked to close the console.
    Quit,
    /// The drawable area changed to the given pixel size.
    Resized { width: u32, height: u32 },
    /// Anything else; drained and ignored.
    Other,
}

/// Non-blocking source of window and input events.
pub trait EventSource {
    /// Returns the next pending event, or `None` once the queue is drained.
    /// Must never block.
    fn poll_event(&mut self) -> Option<ConsoleEvent>;

    /// Names of the keys currently held down, as reported by the platform.
    fn pressed_key_names(&self) -> Vec<CompactString> {
        Vec::new()
    }

    /// Releases the window and event loop. Called once during console
    /// teardown; must tolerate repeated calls.
    fn release(&mut self) {}
}

/// In-memory event source fed by the caller.
///
/// Useful for headless consoles: events pushed before a frame are drained at
/// the start of that frame.
#[derive(Debug, Default)]
pub struct QueuedEvents {
    pending: VecDeque<ConsoleEvent>,
    pressed: Vec<CompactString>,
    released: bool,
}

impl QueuedEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ConsoleEvent) {
        self.pending.push_back(event);
    }

    /// Marks `name` as held down until [`QueuedEvents::key_up`].
    pub fn key_down(&mut self, name: &str) {
        if !self.pressed.iter().any(|key| key == name) {
            self.pressed.push(CompactString::new(name));
        }
    }

    pub fn key_up(&mut self, name: &str) {
        self.pressed.retain(|key| key != name);
    }

    /// Number of events not yet polled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl EventSource for QueuedEvents {
    fn poll_event(&mut self) -> Option<ConsoleEvent> {
        self.pending.pop_front()
    }

    fn pressed_key_names(&self) -> Vec<CompactString> {
        self.pressed.clone()
    }

    fn release(&mut self) {
        self.pending.clear();
        self.pressed.clear();
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_drain_in_order() {
        let mut events = QueuedEvents::new();
        events.push(ConsoleEvent::Resized { width: 10, height: 20 });
        events.push(ConsoleEvent::Quit);

        assert_eq!(events.pending(), 2);
        assert_eq!(events.poll_event(), Some(ConsoleEvent::Resized { width: 10, height: 20 }));
        assert_eq!(events.poll_event(), Some(ConsoleEvent::Quit));
        assert_eq!(events.poll_event(), None);
    }

    #[test]
    fn key_state_tracks_down_and_up() {
        let mut events = QueuedEvents::new();
        events.key_down("Space");
        events.key_down("Space");
        events.key_down("A");
        events.key_up("Space");

        assert_eq!(events.pressed_key_names(), vec![CompactString::new("A")]);
    }

    #[test]
    fn release_drops_pending_state() {
        let mut events = QueuedEvents::new();
        events.push(ConsoleEvent::Other);
        events.key_down("A");
        events.release();
        events.release();

        assert!(events.is_released());
        assert_eq!(events.poll_event(), None);
        assert!(events.pressed_key_names().is_empty());
    }
}
