//! Lock-free input buffering between connection tasks and the tick loop.
//!
//! Input events are applied as atomic single-field writes on the relevant
//! blob, and only between ticks: connection handlers submit through a bounded
//! crossbeam channel and the tick loop drains it before each step.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::game::blob::{AccountId, Viewport};
use crate::net::session::ClientId;

/// One of the four directional flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A buffered event targeting one client's blob
#[derive(Debug, Clone)]
pub enum InputEvent {
    Press(Direction),
    Release(Direction),
    Resize(Viewport),
    /// Late identity handoff from the out-of-scope login flow
    Identify {
        name: Option<String>,
        account: Option<AccountId>,
        best_radius: Option<f32>,
    },
}

/// Input message from a connection task
#[derive(Debug, Clone)]
pub struct InputCommand {
    pub client: ClientId,
    pub event: InputEvent,
}

/// Bounded lock-free input buffer
///
/// Connection handlers submit without blocking; the tick loop drains all
/// pending commands at the start of each tick.
pub struct InputBuffer {
    sender: Sender<InputCommand>,
    receiver: Receiver<InputCommand>,
    capacity: usize,
}

impl InputBuffer {
    /// Create a new input buffer with given capacity
    ///
    /// Capacity should cover the burst of key events arriving between two
    /// ticks from every connected client.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Create a new sender handle for a connection
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Try to submit a command (non-blocking)
    ///
    /// Returns true if successful, false if the buffer is full
    #[inline]
    pub fn try_submit(&self, client: ClientId, event: InputEvent) -> bool {
        self.sender.try_send(InputCommand { client, event }).is_ok()
    }

    /// Drain all pending commands for this tick
    pub fn drain(&self) -> Vec<InputCommand> {
        self.receiver.try_iter().collect()
    }

    /// Get number of pending commands
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Check if buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Get buffer capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        // Plenty for a few hundred clients mashing keys between two ticks
        Self::new(1024)
    }
}

/// Clonable sender handle for connection handlers
#[derive(Clone)]
pub struct InputSender {
    sender: Sender<InputCommand>,
}

impl InputSender {
    /// Submit a command (non-blocking)
    #[inline]
    pub fn try_send(&self, client: ClientId, event: InputEvent) -> Result<(), InputBufferError> {
        self.sender
            .try_send(InputCommand { client, event })
            .map_err(|e| match e {
                TrySendError::Full(_) => InputBufferError::Full,
                TrySendError::Disconnected(_) => InputBufferError::Disconnected,
            })
    }
}

/// Input buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputBufferError {
    /// Buffer is full (backpressure)
    #[error("input buffer full")]
    Full,
    /// Channel disconnected (tick loop stopped)
    #[error("input channel disconnected")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_submit_and_drain() {
        let buffer = InputBuffer::new(10);
        let client = Uuid::new_v4();

        assert!(buffer.try_submit(client, InputEvent::Press(Direction::Up)));
        assert!(buffer.try_submit(client, InputEvent::Release(Direction::Up)));
        assert!(buffer.try_submit(
            client,
            InputEvent::Resize(Viewport {
                width: 800.0,
                height: 600.0,
            })
        ));

        assert_eq!(buffer.pending_count(), 3);

        let commands = buffer.drain();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0].event, InputEvent::Press(Direction::Up)));
        assert!(matches!(
            commands[1].event,
            InputEvent::Release(Direction::Up)
        ));
        assert!(matches!(commands[2].event, InputEvent::Resize(_)));

        assert!(buffer.is_empty());
    }

    #[test]
    fn test_backpressure() {
        let buffer = InputBuffer::new(2);
        let client = Uuid::new_v4();

        assert!(buffer.try_submit(client, InputEvent::Press(Direction::Left)));
        assert!(buffer.try_submit(client, InputEvent::Press(Direction::Right)));
        assert!(!buffer.try_submit(client, InputEvent::Press(Direction::Down)));

        buffer.drain();
        assert!(buffer.try_submit(client, InputEvent::Press(Direction::Down)));
    }

    #[test]
    fn test_sender_clone() {
        let buffer = InputBuffer::new(10);
        let client = Uuid::new_v4();

        let sender1 = buffer.sender();
        let sender2 = buffer.sender();

        assert!(sender1
            .try_send(client, InputEvent::Press(Direction::Up))
            .is_ok());
        assert!(sender2
            .try_send(client, InputEvent::Press(Direction::Down))
            .is_ok());

        assert_eq!(buffer.drain().len(), 2);
    }

    #[test]
    fn test_commands_keep_their_client() {
        let buffer = InputBuffer::new(10);
        let client1 = Uuid::new_v4();
        let client2 = Uuid::new_v4();

        buffer.try_submit(client1, InputEvent::Press(Direction::Up));
        buffer.try_submit(client2, InputEvent::Press(Direction::Down));

        let commands = buffer.drain();
        assert_eq!(commands[0].client, client1);
        assert_eq!(commands[1].client, client2);
    }

    #[test]
    fn test_default_capacity() {
        let buffer = InputBuffer::default();
        assert_eq!(buffer.capacity(), 1024);
    }

    #[test]
    fn test_direction_wire_names() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
        let d: Direction = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(d, Direction::Left);
    }
}
