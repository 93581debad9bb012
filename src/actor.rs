//! Message passing between the host integration and the reactor.
//!
//! Every message carries the span it was sent from, so handling it is logged
//! in the sender's context.

use tokio::sync::mpsc;
use tracing::Span;

pub mod reactor;

pub struct Sender<Event>(mpsc::UnboundedSender<(Span, Event)>);
pub type Receiver<Event> = mpsc::UnboundedReceiver<(Span, Event)>;

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Sender(self.0.clone()) }
}

impl<Event> std::fmt::Debug for Sender<Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Sender").finish()
    }
}

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), rx)
}

impl<Event> Sender<Event> {
    /// Sends, dropping the event if the receiver is gone.
    pub fn send(&self, event: Event) { _ = self.try_send(event) }

    pub fn try_send(&self, event: Event) -> Result<(), mpsc::error::SendError<(Span, Event)>> {
        self.0.send((Span::current(), event))
    }
}
