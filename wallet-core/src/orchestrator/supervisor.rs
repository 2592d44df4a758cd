use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rst_common::with_logging::log::debug;
use rst_common::with_tokio::tokio::sync::Mutex;

/// Decrements the in-flight counter even when a parse future is dropped midway
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// `ParseSupervisor` is a single-slot "parse then commit identity" guard
///
/// Each [`ParseSupervisor::run`] takes a new generation. Only the latest generation may
/// commit its result into the slot, an older parse finishing late gets `None` back and
/// its result is dropped. [`ParseSupervisor::clear`] is refused while any parse is still
/// in flight, so an empty input can never erase a state a running parse is about to
/// commit
pub struct ParseSupervisor<T> {
    generation: AtomicU64,
    in_flight: AtomicUsize,
    slot: Mutex<Option<T>>,
}

impl<T> Default for ParseSupervisor<T> {
    fn default() -> Self {
        Self {
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            slot: Mutex::new(None),
        }
    }
}

impl<T> ParseSupervisor<T>
where
    T: Clone + Send,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<F, Fut>(&self, parse: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = InFlight::start(&self.in_flight);

        let result = parse().await;

        let mut slot = self.slot.lock().await;
        let committed = match self.generation.load(Ordering::SeqCst) == ticket {
            true => {
                *slot = Some(result.clone());
                Some(result)
            }
            false => {
                debug!("[supervisor:run] parse {} superseded, result dropped", ticket);
                None
            }
        };

        drop(in_flight);
        committed
    }

    pub fn is_parsing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn current(&self) -> Option<T> {
        self.slot.lock().await.clone()
    }

    /// Clears the committed state, returns `false` when refused because of a running parse
    pub async fn clear(&self) -> bool {
        let mut slot = self.slot.lock().await;
        if self.is_parsing() {
            debug!("[supervisor:clear] refused, parse in flight");
            return false;
        }

        *slot = None;
        true
    }

    /// Drops the transient state and invalidates any running parse
    pub async fn abandon(&self) {
        let mut slot = self.slot.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *slot = None;
    }
}
