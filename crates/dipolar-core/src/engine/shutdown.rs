use std::sync::Arc;
use tokio::sync::watch;

/// Creates a linked abort handle and shutdown signal, initially not triggered.
pub fn channel() -> (AbortHandle, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (
        AbortHandle {
            sender: Arc::new(sender),
        },
        ShutdownSignal { receiver },
    )
}

/// The receiving side, cloned into every pipeline task.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once shutdown has been requested, or once every [`AbortHandle`] is gone.
    pub async fn triggered(&mut self) {
        let _ = self.receiver.wait_for(|stop| *stop).await;
    }
}

/// Requests shutdown of every task holding the paired [`ShutdownSignal`].
#[derive(Debug, Clone)]
pub struct AbortHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.sender.borrow()
    }
}
