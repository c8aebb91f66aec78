//! Change notification.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::core::RangeReading;

/// Emitted once per grid change.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeEvent {
    /// A reading was applied (fresh or replayed from redo)
    Applied(RangeReading),
    /// A reading was reverted
    Undone(RangeReading),
    /// The grid was cleared; the source position is unchanged
    Cleared,
    /// The source was rewound and the grid cleared
    Reset,
}

impl ChangeEvent {
    /// The reading carried by the event, if any.
    pub fn reading(&self) -> Option<&RangeReading> {
        match self {
            ChangeEvent::Applied(r) | ChangeEvent::Undone(r) => Some(r),
            ChangeEvent::Cleared | ChangeEvent::Reset => None,
        }
    }
}

/// Receives grid change notifications from the update engine.
pub trait ChangeObserver: Send {
    /// Called after the change is fully applied.
    fn change_performed(&mut self, event: &ChangeEvent);
}

impl<F> ChangeObserver for F
where
    F: FnMut(&ChangeEvent) + Send,
{
    fn change_performed(&mut self, event: &ChangeEvent) {
        self(event)
    }
}

/// Forwards change events over a channel.
pub struct ChannelObserver {
    tx: Sender<ChangeEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel.
    pub fn new() -> (Self, Receiver<ChangeEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl ChangeObserver for ChannelObserver {
    fn change_performed(&mut self, event: &ChangeEvent) {
        if self.tx.send(event.clone()).is_err() {
            log::debug!("Change receiver dropped");
        }
    }
}
