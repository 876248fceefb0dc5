//! Producer and consumer halves of a download

use super::types::{Control, Event, Progress, ProgressReport};
use crate::error::{Error, Result};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};

/// Create a connected reporter/download pair
pub fn channel<T>() -> (Reporter<T>, Download<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Reporter { tx },
        Download {
            rx,
            finished: false,
        },
    )
}

/// Producer half: emits progress and exactly one terminal outcome
#[derive(Debug)]
pub struct Reporter<T> {
    tx: mpsc::UnboundedSender<Event<T>>,
}

impl<T> Reporter<T> {
    /// Emit a report and wait for the consumer's answer.
    ///
    /// A consumer that is gone, or drops the report unanswered, counts as
    /// `Continue`.
    pub async fn report(&self, report: ProgressReport) -> Control {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .tx
            .send(Event::Progress(Progress::new(report, Some(reply_tx))))
            .is_err()
        {
            return Control::Continue;
        }
        reply_rx.await.unwrap_or_default()
    }

    /// Emit a report without asking for an answer
    pub fn notify(&self, report: ProgressReport) {
        let _ = self.tx.send(Event::Progress(Progress::new(report, None)));
    }

    /// Check if the consumer has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Emit the terminal outcome
    pub fn finish(self, result: Result<T>) {
        let _ = self.tx.send(Event::Finished(result));
    }

    /// Resolve with `value`
    pub fn resolve(self, value: T) {
        self.finish(Ok(value));
    }

    /// Fail with `error`
    pub fn fail(self, error: Error) {
        self.finish(Err(error));
    }
}

/// Consumer half: a stream of progress events ending in one outcome
#[derive(Debug)]
pub struct Download<T> {
    rx: mpsc::UnboundedReceiver<Event<T>>,
    finished: bool,
}

impl<T> Download<T> {
    /// Drive the download, answering each report with `handler`, and return
    /// the outcome
    pub async fn on_progress<F>(mut self, mut handler: F) -> Result<T>
    where
        F: FnMut(&ProgressReport) -> Control,
    {
        while let Some(event) = self.next().await {
            match event {
                Event::Progress(progress) => {
                    let control = handler(progress.report());
                    progress.respond(control);
                }
                Event::Finished(result) => return result,
            }
        }
        Err(Error::Abandoned)
    }

    /// Drive the download to completion, continuing on every report
    pub async fn wait(self) -> Result<T> {
        self.on_progress(|_| Control::Continue).await
    }

    /// Check if the terminal outcome has been delivered
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<T> Stream for Download<T> {
    type Item = Event<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if matches!(event, Event::Finished(_)) {
                    self.finished = true;
                    self.rx.close();
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(Some(Event::Finished(Err(Error::Abandoned))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
