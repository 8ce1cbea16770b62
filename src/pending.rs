use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// A collaborator that becomes available at some point after startup.
///
/// The loader hands the value over through a channel; frame code calls
/// [`Pending::get_mut`] every tick, which never blocks and yields `None`
/// until the value has arrived.
pub struct Pending<T> {
    value: Option<T>,
    incoming: Option<Receiver<T>>,
}

impl<T> Pending<T> {
    pub fn ready(value: T) -> Self {
        Self {
            value: Some(value),
            incoming: None,
        }
    }

    /// A pending slot plus the sender the loader completes it with.
    pub fn channel() -> (Sender<T>, Self) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        (
            tx,
            Self {
                value: None,
                incoming: Some(rx),
            },
        )
    }

    /// Never becomes ready.
    pub fn unavailable() -> Self {
        Self {
            value: None,
            incoming: None,
        }
    }

    fn poll(&mut self) {
        let Some(rx) = &self.incoming else {
            return;
        };
        match rx.try_recv() {
            Ok(value) => {
                self.value = Some(value);
                self.incoming = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::warn!("Collaborator loader exited without delivering a value");
                self.incoming = None;
            }
        }
    }

    /// Block until the value arrives or `timeout` elapses. Startup only;
    /// frame code goes through the non-blocking accessors.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        if let Some(rx) = self.incoming.take() {
            match rx.recv_timeout(timeout) {
                Ok(value) => self.value = Some(value),
                Err(RecvTimeoutError::Timeout) => self.incoming = Some(rx),
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("Collaborator loader exited without delivering a value");
                }
            }
        }
        self.value.is_some()
    }

    pub fn is_ready(&mut self) -> bool {
        self.poll();
        self.value.is_some()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.poll();
        self.value.as_mut()
    }

    pub fn get(&mut self) -> Option<&T> {
        self.poll();
        self.value.as_ref()
    }
}
