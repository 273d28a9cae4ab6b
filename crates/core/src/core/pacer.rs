use std::{thread, time::Duration};

use tracing::trace;

use super::constant::DEFAULT_REST_MODULO;

/// Cooperative pause every `modulo` steps of a long scan.
///
/// Pausing only gives the host room to breathe, it never changes what the
/// scan produces. Without an explicit rest time a rest point only yields the
/// thread. A zero modulo turns it off.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    modulo: usize,
    rest: Option<Duration>,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::yielding(DEFAULT_REST_MODULO)
    }
}

impl Pacer {
    /// Sleep `rest_ms` at every rest point.
    pub fn new(modulo: usize, rest_ms: u64) -> Self {
        Self {
            modulo,
            rest: Some(Duration::from_millis(rest_ms)),
        }
    }

    /// Yield the thread at every rest point without sleeping.
    pub fn yielding(modulo: usize) -> Self {
        Self { modulo, rest: None }
    }

    pub fn disabled() -> Self {
        Self::yielding(0)
    }

    /// Whether the `count`-th completed step is a rest point.
    pub fn should_rest(&self, count: usize) -> bool {
        self.modulo > 0 && count > 0 && count % self.modulo == 0
    }

    pub fn step(&self, count: usize) {
        if !self.should_rest(count) {
            return;
        }

        match self.rest {
            Some(rest) if !rest.is_zero() => {
                trace!("resting {:?} after {} lines", rest, count);
                thread::sleep(rest);
            }
            _ => thread::yield_now(),
        }
    }
}
