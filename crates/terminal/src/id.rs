// Chunk: docs/chunks/terminal_ids - Terminal session identifiers
//!
//! Terminal ids double as the multiplexing key on the terminal transport, so
//! they must be fixed-length and collision resistant even when the OS entropy
//! source is unavailable.
//!
//! Generation prefers OS entropy. If that fails, 16 bytes come from a
//! non-cryptographic PRNG seeded from the clock, the process id and a
//! process-wide counter. Either way the version (`0100`) and variant (`10`)
//! bits are forced and the result is formatted as a hyphenated UUID v4.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Distinguishes ids generated within one process when the fallback PRNG is
/// seeded within the same clock tick.
static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a terminal session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalId(String);

impl TerminalId {
    /// Generates a fresh id from OS entropy, degrading to the fallback PRNG
    /// if OS entropy is unavailable.
    pub fn generate() -> Self {
        Self::generate_with(|bytes| getrandom::getrandom(bytes).is_ok())
    }

    /// Generates an id using `secure` as the preferred entropy source.
    ///
    /// `secure` fills the buffer and returns `true`, or returns `false` when
    /// it cannot provide entropy, in which case the fallback PRNG is used.
    pub fn generate_with(secure: impl FnOnce(&mut [u8; 16]) -> bool) -> Self {
        let mut bytes = [0u8; 16];
        if !secure(&mut bytes) {
            tracing::debug!("secure entropy unavailable, using fallback PRNG for terminal id");
            fallback_bytes(&mut bytes);
        }
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Self(uuid.hyphenated().to_string())
    }

    /// Wraps an existing id string (e.g. one handed back by a host).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TerminalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn fallback_bytes(bytes: &mut [u8; 16]) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let counter = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let seed = nanos
        ^ (u64::from(std::process::id()) << 32)
        ^ counter.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut rng = SmallRng::seed_from_u64(seed);
    rng.fill_bytes(bytes);
}

// =============================================================================
// Tests
// =============================================================================
