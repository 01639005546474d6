use super::{
    errors::SpawnError,
    result::SpawnResult,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::oneshot;


/// One-shot handle on the outcome of a submitted item (or a whole stage chain).
///
/// Resolved exactly once by whoever ran the last stage. Can be joined from a
/// plain thread with [`CompletionHandle::join`] or awaited from async code.
#[must_use = "a completion handle does nothing unless joined or awaited"]
pub struct CompletionHandle<T> {
    receiver: oneshot::Receiver<SpawnResult<T>>,
}

/// Producer side of a [`CompletionHandle`].
///
/// Dropped without [`Completer::complete`] (the item was refused and never
/// ran), it resolves the handle with [`SpawnError::Rejected`].
pub struct Completer<T> {
    sender: Option<oneshot::Sender<SpawnResult<T>>>,
}

pub fn completion_pair<T>() -> (Completer<T>, CompletionHandle<T>) {
    let (sender, receiver) = oneshot::channel();
    (Completer { sender: Some(sender) }, CompletionHandle { receiver })
}

impl<T> Completer<T> {
    #[inline]
    pub fn complete(mut self, result: SpawnResult<T>) {
        if let Some(sender) = self.sender.take() {
            // The handle may already be gone.
            let _ = sender.send(result);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Err(SpawnError::Rejected));
        }
    }
}

impl<T> CompletionHandle<T> {
    /// Blocks the calling thread until the item resolves.
    ///
    /// Uses a minimal executor, so it is safe to call outside of any runtime.
    /// Do not call it from inside an async task; `.await` the handle instead.
    pub fn join(self) -> SpawnResult<T> {
        futures::executor::block_on(self)
    }

    /// Non-blocking check; returns the handle back if still pending.
    pub fn try_join(mut self) -> Result<SpawnResult<T>, Self> {
        match self.receiver.try_recv() {
            Ok(result) => Ok(result),
            Err(oneshot::error::TryRecvError::Empty) => Err(self),
            Err(oneshot::error::TryRecvError::Closed) => Ok(Err(SpawnError::ChannelClosed)),
        }
    }
}

impl<T> Future for CompletionHandle<T> {
    type Output = SpawnResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(res) => Poll::Ready(res.unwrap_or(Err(SpawnError::ChannelClosed))),
            Poll::Pending => Poll::Pending,
        }
    }
}
