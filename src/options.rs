//! Decode options: integrity policy and chain limits.

/// What to do when a chunk's stored CRC32 does not match its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrityPolicy {
    /// Reject the chunk with `IntegrityError`.
    #[default]
    FailClosed,
    /// Log a warning and keep decoding.
    BestEffort,
}

/// Knobs for chunk decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub integrity: IntegrityPolicy,
    /// Upper bound on chunks followed through `next_offset` links.
    pub max_chain_len: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            integrity: IntegrityPolicy::FailClosed,
            max_chain_len: u16::MAX as usize,
        }
    }
}

impl DecodeOptions {
    pub fn with_integrity(mut self, integrity: IntegrityPolicy) -> Self {
        self.integrity = integrity;
        self
    }

    pub fn best_effort(self) -> Self {
        self.with_integrity(IntegrityPolicy::BestEffort)
    }

    pub fn with_max_chain_len(mut self, max_chain_len: usize) -> Self {
        self.max_chain_len = max_chain_len;
        self
    }
}
