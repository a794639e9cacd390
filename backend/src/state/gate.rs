use tracing::debug;

use crate::state::guarded::Guarded;

#[derive(Debug)]
struct Tokens {
    remaining: usize,
    capacity: usize,
}

/// Coarse token gate for privileged reads.
///
/// Grants at most `capacity` admissions between two refills. `refill`
/// restores the full capacity at once; there is no continuous leak, so
/// traffic is admitted in bursts and then blocked until the next refill.
///
/// Invariant: `0 <= remaining <= capacity`.
pub struct AdmissionGate {
    tokens: Guarded<Tokens>,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            tokens: Guarded::new(Tokens {
                remaining: capacity,
                capacity,
            }),
        }
    }

    /// Takes one token if any is left. Never blocks.
    pub fn try_acquire(&self) -> bool {
        self.tokens.update(|t| {
            if t.remaining > 0 {
                t.remaining -= 1;
                true
            } else {
                false
            }
        })
    }

    /// Resets the window to full capacity, discarding what is left of it.
    pub fn refill(&self) {
        let before = self.tokens.update(|t| {
            let before = t.remaining;
            t.remaining = t.capacity;
            before
        });
        debug!(target: "gate", before, "admission gate refilled");
    }

    pub fn remaining(&self) -> usize {
        self.tokens.read(|t| t.remaining)
    }

    pub fn capacity(&self) -> usize {
        self.tokens.read(|t| t.capacity)
    }
}
