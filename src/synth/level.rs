use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Lock-free f32 cell shared between the two timing domains.
///
/// The control domain is the sole writer (envelope steps), the render domain
/// the sole reader (per-sample gain). Stores and loads move the whole bit
/// pattern through one `AtomicU32`, so a reader can never observe a
/// half-written float. `Relaxed` ordering is enough: only visibility is
/// required, no other memory depends on the value.
#[derive(Debug, Clone)]
pub struct SharedLevel {
    bits: Arc<AtomicU32>,
}

impl SharedLevel {
    pub fn new(initial: f32) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(initial.to_bits())),
        }
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}
