use std::sync::Mutex;

#[derive(Default)]
struct ProgressCounts {
    pending: u32,
    total_submitted: u32,
}

/// Counters behind the loader's progress query.
///
/// `pending` counts submitted-but-not-finalized loads, `total_submitted`
/// counts everything submitted since the loader was last idle. They are a
/// coupled pair (`total_submitted` resets when `pending` returns to zero),
/// so they sit behind one mutex rather than two atomics.
#[derive(Default)]
pub struct ProgressTracker {
    counts: Mutex<ProgressCounts>,
}

impl ProgressTracker {
    pub(crate) fn mark_submitted(&self) {
        let mut counts = self.counts.lock().unwrap();
        counts.pending += 1;
        counts.total_submitted += 1;
    }

    pub(crate) fn mark_finalized(&self) {
        let mut counts = self.counts.lock().unwrap();
        counts.pending = counts.pending.saturating_sub(1);
        if counts.pending == 0 {
            counts.total_submitted = 0;
        }
    }

    /// Fraction of submitted work finalized since the loader was last idle,
    /// 1.0 when idle. Callable from any thread, no side effects.
    pub fn progress(&self) -> f32 {
        let counts = self.counts.lock().unwrap();
        if counts.pending == 0 || counts.total_submitted == 0 {
            return 1.0;
        }

        1.0 - counts.pending as f32 / counts.total_submitted as f32
    }
}
