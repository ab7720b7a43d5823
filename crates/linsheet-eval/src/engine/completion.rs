use parking_lot::{Condvar, Mutex};

use super::job::Completion;

/// Many-producer, single-consumer handoff of finished jobs.
///
/// Workers `push`; the coordinator takes everything buffered in one
/// `drain_blocking` call, so a burst of completions costs one wake-up.
#[derive(Debug, Default)]
pub struct CompletionChannel {
    buffer: Mutex<Vec<Completion>>,
    ready: Condvar,
}

impl CompletionChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completion and wake the waiting coordinator. Never fails.
    pub fn push(&self, completion: Completion) {
        self.buffer.lock().push(completion);
        self.ready.notify_one();
    }

    /// Block until at least one completion is buffered, then swap out and
    /// return the whole buffer.
    pub fn drain_blocking(&self) -> Vec<Completion> {
        let mut buffer = self.buffer.lock();
        while buffer.is_empty() {
            self.ready.wait(&mut buffer);
        }
        std::mem::take(&mut *buffer)
    }

    /// Take whatever is buffered without waiting.
    pub fn try_drain(&self) -> Vec<Completion> {
        std::mem::take(&mut *self.buffer.lock())
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
