//! Cancellable lazy sequence of to-do items.
//!
//! [`ToDoStream`] is the bulk-read handoff between a repository and its
//! consumer: a background producer task pushes items through a single-slot
//! channel while the consumer drains them one at a time. The stream owns a
//! [`CancellationToken`]; closing or dropping the stream cancels it, which
//! tells the producer to stop and release whatever it holds (cursor,
//! connection).

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::todo::ToDoItem;

/// One element of a [`ToDoStream`].
pub type StreamItem = Result<ToDoItem, CoreError>;

/// Producer half handed to the closure passed to [`ToDoStream::spawn`].
pub struct StreamSender {
    sender: mpsc::Sender<StreamItem>,
    cancel: CancellationToken,
}

impl StreamSender {
    /// Hand one item to the consumer.
    ///
    /// Waits until the consumer takes the previous item or the stream is
    /// cancelled. Returns `false` when the item could not be delivered; the
    /// producer must stop and return.
    pub async fn send(&self, item: StreamItem) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.sender.send(item) => sent.is_ok(),
        }
    }

    /// Token that fires when the consumer abandons the stream.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Consumer half: a finite, non-restartable sequence of [`StreamItem`]s.
pub struct ToDoStream {
    receiver: mpsc::Receiver<StreamItem>,
    cancel: CancellationToken,
    producer: Option<JoinHandle<()>>,
}

impl ToDoStream {
    /// Start `producer` on the runtime and return the consuming end.
    ///
    /// `cancel` should be a token dedicated to this stream (typically a
    /// child of the request token).
    pub fn spawn<F, Fut>(cancel: CancellationToken, producer: F) -> Self
    where
        F: FnOnce(StreamSender) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(1);
        let task = tokio::spawn(producer(StreamSender {
            sender,
            cancel: cancel.clone(),
        }));

        Self {
            receiver,
            cancel,
            producer: Some(task),
        }
    }

    /// Stream over an already materialized snapshot.
    pub fn from_items(cancel: CancellationToken, items: Vec<ToDoItem>) -> Self {
        Self::spawn(cancel, |sender| async move {
            for item in items {
                if !sender.send(Ok(item)).await {
                    tracing::debug!("ToDo stream abandoned by consumer");
                    return;
                }
            }
        })
    }

    /// Next item, or `None` once the producer finished or the stream was
    /// cancelled.
    pub async fn next(&mut self) -> Option<StreamItem> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            item = self.receiver.recv() => item,
        }
    }

    /// Stop the producer and wait for it to exit.
    ///
    /// Returns an error only if the producer task panicked, in which case
    /// the items already received may be incomplete.
    pub async fn close(mut self) -> Result<(), CoreError> {
        self.cancel.cancel();
        self.receiver.close();

        let Some(task) = self.producer.take() else {
            return Ok(());
        };

        match task.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_panic() => {
                tracing::error!(error = %e, "ToDo stream producer panicked");
                Err(CoreError::Internal("todo stream producer panicked".into()))
            }
            Err(_) => Ok(()),
        }
    }
}

impl Drop for ToDoStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
