#![forbid(unsafe_code)]

//! Modal identifiers and the generator that issues them.
//!
//! # Invariants
//!
//! - A single [`IdGenerator`] never issues the same [`ModalId`] twice under
//!   the `Sequential` and `Fallback` strategies.
//! - Under `Entropy` ids are 128 random bits; uniqueness is probabilistic and
//!   callers that hold live ids re-roll on the (astronomically unlikely)
//!   collision.
//!
//! # Failure Modes
//!
//! - OS entropy unavailable: the generator silently switches to the
//!   time + random composite for that call. `next()` never fails.

use std::cell::RefCell;
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

use web_time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u128);

impl ModalId {
    /// Wrap a raw identifier value.
    #[inline]
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Get the raw identifier value.
    #[inline]
    pub const fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for ModalId {
    /// Formats as 8-4-4-4-12 lowercase hex.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xffff_ffff_ffff
        )
    }
}

/// How a generator produces identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// OS CSPRNG, falling back to the time + random composite.
    #[default]
    Entropy,
    /// Always use the time + random composite.
    Fallback,
    /// Monotonic counter starting at 1. Deterministic; meant for tests.
    Sequential,
}

impl IdStrategy {
    /// Parse a strategy name (`entropy`, `fallback`, `sequential`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "entropy" | "random" => Some(Self::Entropy),
            "fallback" | "composite" => Some(Self::Fallback),
            "sequential" | "counter" => Some(Self::Sequential),
            _ => None,
        }
    }
}

/// Which source actually produced an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Entropy,
    Fallback,
    Sequential,
}

/// Issues [`ModalId`]s for one session.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    strategy: IdStrategy,
    sequence: u64,
    mask: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Create a generator using OS entropy.
    pub fn new() -> Self {
        Self::with_strategy(IdStrategy::Entropy)
    }

    /// Create a generator with an explicit strategy.
    pub fn with_strategy(strategy: IdStrategy) -> Self {
        let mut hasher = ahash::RandomState::new().build_hasher();
        hasher.write_u64(0x6d6f_6461_6c6b_6974);
        Self {
            strategy,
            sequence: 0,
            mask: hasher.finish(),
        }
    }

    /// The configured strategy.
    #[inline]
    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Number of ids issued so far.
    #[inline]
    pub fn issued(&self) -> u64 {
        self.sequence
    }

    /// Issue the next identifier.
    pub fn next(&mut self) -> ModalId {
        self.next_with_source().0
    }

    /// Issue the next identifier and report which source produced it.
    pub fn next_with_source(&mut self) -> (ModalId, IdSource) {
        self.sequence = self.sequence.wrapping_add(1);
        match self.strategy {
            IdStrategy::Sequential => (ModalId(u128::from(self.sequence)), IdSource::Sequential),
            IdStrategy::Fallback => (self.composite(), IdSource::Fallback),
            IdStrategy::Entropy => match from_entropy() {
                Some(raw) => (ModalId(raw), IdSource::Entropy),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("os entropy unavailable, using composite modal id");
                    (self.composite(), IdSource::Fallback)
                }
            },
        }
    }

    /// Wall-clock nanoseconds in the high half, masked sequence in the low half.
    fn composite(&self) -> ModalId {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        ModalId((u128::from(nanos) << 64) | u128::from(self.sequence ^ self.mask))
    }
}

fn from_entropy() -> Option<u128> {
    let mut buf = [0u8; 16];
    getrandom::fill(&mut buf).ok()?;
    Some(u128::from_le_bytes(buf))
}

/// A generator shared between a session and the handles that front it.
#[derive(Debug, Clone, Default)]
pub struct SharedIds(Rc<RefCell<IdGenerator>>);

impl SharedIds {
    /// Share the given generator.
    pub fn new(generator: IdGenerator) -> Self {
        Self(Rc::new(RefCell::new(generator)))
    }

    /// Issue the next identifier.
    pub fn next(&self) -> ModalId {
        self.0.borrow_mut().next()
    }

    /// The configured strategy.
    pub fn strategy(&self) -> IdStrategy {
        self.0.borrow().strategy()
    }
}
