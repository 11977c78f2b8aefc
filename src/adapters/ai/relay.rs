//! Bounded relay between a generation task and the fragment consumer.
//!
//! Every generation adapter funnels its backend stream through [`relay`]:
//!
//! - nothing is spawned until the returned stream is first polled
//! - a single producer task forwards fragments into a bounded channel, so a
//!   slow consumer applies backpressure instead of growing a buffer
//! - a failed item is forwarded and then production stops
//! - dropping the consumer closes the channel; the producer notices, stops,
//!   and drops the backend stream (which aborts the HTTP request)

use futures::stream::{self, Stream, StreamExt};
use std::future::Future;
use std::task::Poll;
use tokio::sync::mpsc;
use tracing::debug;

use crate::ports::{FragmentStream, GenerationError};

/// Channel capacity used when none is configured.
pub const DEFAULT_STREAM_BUFFER: usize = 32;

type Fragment = Result<String, GenerationError>;

/// Wrap a (not yet started) backend stream into a lazy, bounded,
/// cancellable [`FragmentStream`].
///
/// `start` is only awaited once the consumer polls for the first fragment.
pub fn relay<F, S>(capacity: usize, start: F) -> FragmentStream
where
    F: Future<Output = Result<S, GenerationError>> + Send + 'static,
    S: Stream<Item = Fragment> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let mut producer = Some(produce(start, tx));

    let spawn_on_first_poll = stream::poll_fn(move |_| {
        if let Some(producer) = producer.take() {
            tokio::spawn(producer);
        }
        Poll::Ready(None::<Fragment>)
    });

    let fragments = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|fragment| (fragment, rx))
    });

    Box::pin(spawn_on_first_poll.chain(fragments))
}

async fn produce<F, S>(start: F, tx: mpsc::Sender<Fragment>)
where
    F: Future<Output = Result<S, GenerationError>> + Send,
    S: Stream<Item = Fragment> + Send,
{
    tokio::select! {
        _ = tx.closed() => {
            debug!("fragment consumer went away, cancelling generation");
        }
        _ = forward(start, &tx) => {}
    }
}

async fn forward<F, S>(start: F, tx: &mpsc::Sender<Fragment>)
where
    F: Future<Output = Result<S, GenerationError>>,
    S: Stream<Item = Fragment>,
{
    let upstream = match start.await {
        Ok(upstream) => upstream,
        Err(err) => {
            debug!(error = %err, "generation failed before the first fragment");
            let _ = tx.send(Err(err)).await;
            return;
        }
    };
    futures::pin_mut!(upstream);

    while let Some(fragment) = upstream.next().await {
        let terminal = fragment.is_err();
        if tx.send(fragment).await.is_err() || terminal {
            return;
        }
    }
}
