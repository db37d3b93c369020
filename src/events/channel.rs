//! Crossbeam-backed event channel.
//!
//! The importer holds an [`EventSender`]; the CLI drains the matching
//! [`EventReceiver`] on its progress thread.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Importer side of the channel
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Queue an event; dropped silently once nobody is listening
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Front-end side of the channel
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Blocking iterator that ends when every sender is gone
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Everything queued so far, without waiting
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// An unbounded sender/receiver pair
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender for runs nobody watches
pub fn null_sender() -> EventSender {
    EventChannel::new().0
}
