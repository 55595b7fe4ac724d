//! Fire-once broadcast signals for worker cancellation and completion.
//!
//! A [`Signal`] is level-triggered: once fired it stays observably fired for
//! every clone, forever. It is built on a zero-capacity crossbeam channel
//! whose sender side is dropped to fire, which makes the signal usable both
//! as a non-blocking probe and as an arm of `select!`.

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};

/// Create a connected signal pair.
pub fn signal() -> (SignalSender, Signal) {
    let (sender, receiver) = bounded::<()>(0);
    (SignalSender(sender), Signal(receiver))
}

/// The firing side of a signal. Dropping it is equivalent to firing.
pub struct SignalSender(Sender<()>);

impl SignalSender {
    /// Fire the signal for every [`Signal`] clone, permanently.
    pub fn fire(self) {
        drop(self.0);
    }
}

/// The observing side of a signal. Cheap to clone; every clone observes the
/// same firing.
#[derive(Clone)]
pub struct Signal(Receiver<()>);

impl Signal {
    /// Non-blocking probe.
    pub fn is_fired(&self) -> bool {
        matches!(self.0.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// The underlying receiver, for use in `select!` arms. Receiving yields
    /// an error exactly when the signal has fired.
    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.0
    }
}
