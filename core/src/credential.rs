//! Opaque credential wrapper for `password` columns
//!
//! Password bytes cross the wrapper boundary exactly once, at construction.
//! There is no plain accessor for the original input; only the opaqued form
//! used at the storage boundary is reachable.

/// Opaque holder for a password column value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    stored: Vec<u8>,
}

impl Credential {
    /// Wrap raw input bytes, opaquing them for storage.
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self {
            stored: opaque(&raw.into()),
        }
    }

    /// Rewrap bytes read back from storage; they are already opaqued.
    pub fn from_stored(stored: impl Into<Vec<u8>>) -> Self {
        Self {
            stored: stored.into(),
        }
    }

    /// The opaqued form written to storage. Never the raw input.
    pub fn digest(&self) -> &[u8] {
        &self.stored
    }

    /// Check a candidate password against the stored form.
    pub fn matches(&self, candidate: &[u8]) -> bool {
        opaque(candidate) == self.stored
    }
}

/// Placeholder opaquing transform. A real deployment substitutes a password
/// hash here; the runtime contract only requires that the transform is
/// deterministic and applied before storage.
fn opaque(input: &[u8]) -> Vec<u8> {
    let mut state: u64 = 0xcbf2_9ce4_8422_2325;
    for b in input {
        state ^= u64::from(*b);
        state = state.wrapping_mul(0x100_0000_01b3);
    }
    let mut out = state.to_be_bytes().to_vec();
    out.extend_from_slice(&(input.len() as u32).to_be_bytes());
    out
}
