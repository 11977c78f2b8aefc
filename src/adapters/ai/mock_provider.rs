//! Mock generation provider for testing.
//!
//! Provides a scriptable implementation of the GenerationClient port,
//! allowing tests to run without calling a real backend.
//!
//! # Features
//!
//! - Scripted fragment sequences (consumed one per `generate` call)
//! - Error injection before the first fragment or mid-stream
//! - Simulated per-fragment latency
//! - Call tracking, plus counters for started/completed/live backend streams
//!   so laziness and cancellation can be asserted
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new().with_fragments(["Tell", "me about yourself"]);
//!
//! let fragments: Vec<_> = provider.generate(request).collect().await;
//! assert_eq!(provider.call_count(), 1);
//! ```

use futures::stream;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use super::relay::{relay, DEFAULT_STREAM_BUFFER};
use crate::ports::{FragmentStream, GenerationClient, GenerationError, GenerationRequest};

/// A configured mock generation.
#[derive(Debug, Clone)]
pub enum MockScript {
    /// Yield these fragments, then finish.
    Fragments(Vec<String>),
    /// Yield these fragments, then fail.
    FailMidStream {
        fragments: Vec<String>,
        error: GenerationError,
    },
    /// Fail before producing anything.
    FailToStart(GenerationError),
}

/// Mock generation provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    scripts: Arc<Mutex<VecDeque<MockScript>>>,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
    counters: Arc<Counters>,
    delay: Duration,
    buffer: usize,
}

#[derive(Debug, Default)]
struct Counters {
    started: AtomicUsize,
    completed: AtomicUsize,
    emitted: AtomicUsize,
    live: AtomicUsize,
}

/// Decrements the live-stream counter when a backend stream goes away,
/// whether it finished or was cancelled.
struct LiveGuard(Arc<Counters>);

impl LiveGuard {
    fn new(counters: Arc<Counters>) -> Self {
        counters.live.fetch_add(1, Ordering::SeqCst);
        Self(counters)
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.live.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Upstream {
    items: VecDeque<Result<String, GenerationError>>,
    delay: Duration,
    guard: LiveGuard,
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with no scripts.
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            counters: Arc::new(Counters::default()),
            delay: Duration::ZERO,
            buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    /// Queues a successful generation.
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_script(MockScript::Fragments(
            fragments.into_iter().map(Into::into).collect(),
        ))
    }

    /// Queues a generation that fails after yielding `fragments`.
    pub fn with_mid_stream_error<I, S>(self, fragments: I, error: GenerationError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_script(MockScript::FailMidStream {
            fragments: fragments.into_iter().map(Into::into).collect(),
            error,
        })
    }

    /// Queues a generation that fails before the first fragment.
    pub fn with_start_error(self, error: GenerationError) -> Self {
        self.with_script(MockScript::FailToStart(error))
    }

    /// Queues an arbitrary script.
    pub fn with_script(self, script: MockScript) -> Self {
        lock(&self.scripts).push_back(script);
        self
    }

    /// Sets simulated latency before every fragment.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the relay channel capacity.
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    /// Number of `generate` invocations.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// All recorded requests, in invocation order.
    pub fn get_calls(&self) -> Vec<GenerationRequest> {
        lock(&self.calls).clone()
    }

    /// Number of generations whose backend work actually began.
    pub fn started_count(&self) -> usize {
        self.counters.started.load(Ordering::SeqCst)
    }

    /// Number of generations that ran to the end of their script.
    pub fn completed_count(&self) -> usize {
        self.counters.completed.load(Ordering::SeqCst)
    }

    /// Total fragments produced by the backend side across all generations.
    pub fn emitted_count(&self) -> usize {
        self.counters.emitted.load(Ordering::SeqCst)
    }

    /// Backend streams currently alive (neither finished nor dropped).
    pub fn live_streams(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    fn next_script(&self) -> MockScript {
        lock(&self.scripts)
            .pop_front()
            .unwrap_or_else(|| MockScript::Fragments(vec!["Mock question".to_string()]))
    }
}

impl GenerationClient for MockAIProvider {
    fn generate(&self, request: GenerationRequest) -> FragmentStream {
        lock(&self.calls).push(request);

        let script = self.next_script();
        let counters = Arc::clone(&self.counters);
        let delay = self.delay;

        relay(self.buffer, async move {
            counters.started.fetch_add(1, Ordering::SeqCst);

            let items: VecDeque<_> = match script {
                MockScript::FailToStart(error) => return Err(error),
                MockScript::Fragments(fragments) => fragments.into_iter().map(Ok).collect(),
                MockScript::FailMidStream { fragments, error } => fragments
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(error)))
                    .collect(),
            };

            let upstream = Upstream {
                items,
                delay,
                guard: LiveGuard::new(Arc::clone(&counters)),
            };

            Ok(stream::unfold(upstream, |mut upstream| async move {
                let Some(item) = upstream.items.pop_front() else {
                    upstream.guard.0.completed.fetch_add(1, Ordering::SeqCst);
                    return None;
                };
                if !upstream.delay.is_zero() {
                    sleep(upstream.delay).await;
                }
                upstream.guard.0.emitted.fetch_add(1, Ordering::SeqCst);
                Some((item, upstream))
            }))
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
