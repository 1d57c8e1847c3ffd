use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Marks that items may be stranded in the inventory and a sweep is needed. Shared between
/// everything that can fail to move items and the recovery loop that clears it.
///
/// Starts set, so the first recovery tick after startup sweeps whatever is already there.
#[derive(Debug, Clone)]
pub struct RecoveryFlag(Arc<AtomicBool>);

impl Default for RecoveryFlag {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl RecoveryFlag {
    /// Requests a sweep.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
    
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
