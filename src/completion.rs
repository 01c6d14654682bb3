// SPDX-License-Identifier: GPL-3.0-only

//! Single-assignment completion channel
//!
//! A [`CompletionSlot`] is the producing half of one pending request. Signaling
//! consumes it, so it can fire at most once; dropping it unsignaled rejects the
//! request with [`CaptureError::Abandoned`], so it can never be lost silently.
//! The caller awaits the matching [`Completion`].

use crate::errors::CaptureError;
use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::warn;

type Outcome<T> = Result<T, CaptureError>;

/// Producing half: resolve or reject exactly once
#[derive(Debug)]
pub struct CompletionSlot<T> {
    sender: Option<oneshot::Sender<Outcome<T>>>,
}

/// Awaiting half of a [`CompletionSlot`]
#[derive(Debug)]
pub struct Completion<T> {
    receiver: oneshot::Receiver<Outcome<T>>,
}

impl<T> CompletionSlot<T> {
    /// Create a connected slot/completion pair
    pub fn new() -> (Self, Completion<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Some(sender),
            },
            Completion { receiver },
        )
    }

    pub fn resolve(mut self, value: T) {
        self.signal(Ok(value));
    }

    pub fn reject(mut self, error: CaptureError) {
        self.signal(Err(error));
    }

    /// Resolve or reject depending on `outcome`
    pub fn complete(mut self, outcome: Outcome<T>) {
        self.signal(outcome);
    }

    fn signal(&mut self, outcome: Outcome<T>) {
        if let Some(sender) = self.sender.take() {
            // The caller may have stopped waiting; nothing left to notify then.
            let _ = sender.send(outcome);
        }
    }
}

impl<T> Drop for CompletionSlot<T> {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            warn!("Completion slot dropped without a result, rejecting request");
            let _ = sender.send(Err(CaptureError::Abandoned));
        }
    }
}

impl<T> Completion<T> {
    /// Take the result if it has already been signaled
    ///
    /// Returns `None` while the request is still pending.
    pub fn try_take(&mut self) -> Option<Outcome<T>> {
        match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Some(Err(CaptureError::Abandoned)),
        }
    }
}

impl<T> Future for Completion<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(CaptureError::Abandoned)))
    }
}
