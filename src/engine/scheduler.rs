use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::engine::envelope::EnvelopeStage;

/// An envelope event waiting on the control-rate queue.
///
/// Events are self-contained: each fade step carries its captured play token,
/// its endpoints, and the absolute start of its fade, so firing one needs no
/// lookup beyond the token comparison. Steps are chained rather than bulk
/// enqueued: firing step `i` schedules step `i + 1` at `base + (i + 1) *
/// step_time`. Deadlines stay drift-free and a voice never has more than one
/// pending step per envelope lineage, which keeps queue depth bounded under
/// rapid retriggering. A stale lineage dies at its next firing.
#[derive(Debug, Clone, Copy)]
pub enum ControlEvent {
    FadeStep {
        voice: usize,
        token: u64,
        stage: EnvelopeStage,
        step: u32,
        from: f32,
        to: f32,
        /// Queue time at which the fade began.
        base: Duration,
        /// Spacing between consecutive steps.
        step_time: Duration,
    },
    /// End of the sustain hold; hands the voice into Release.
    SustainEnd { voice: usize, token: u64 },
}

#[derive(Debug)]
struct Scheduled {
    due: Duration,
    seq: u64,
    event: ControlEvent,
}

// BinaryHeap is a max-heap; invert so the earliest deadline pops first, with
// the insertion sequence as a FIFO tie-break. Same-voice events scheduled for
// the same instant therefore never reorder.
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

/// Cooperative delayed-event queue for the control-rate domain.
///
/// The host drives time explicitly through [`ControlQueue::advance`]; nothing
/// here touches a wall clock or a thread. Events scheduled during a drain
/// with an already-elapsed deadline fire in the same drain, so short-circuited
/// stage chains complete without waiting for the next host tick.
#[derive(Debug)]
pub struct ControlQueue {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Scheduled>,
}

impl ControlQueue {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current queue time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `event` at an absolute queue time.
    ///
    /// Deadlines already in the past are fired on the next drain.
    pub fn schedule_at(&mut self, due: Duration, event: ControlEvent) {
        let seq = self.seq;
        self.seq += 1;
        self.queue.push(Scheduled { due, seq, event });
    }

    /// Schedule `event` after a delay from now.
    pub fn schedule(&mut self, delay: Duration, event: ControlEvent) {
        self.schedule_at(self.now + delay, event);
    }

    /// Move queue time forward.
    pub fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed;
    }

    /// Pop the next event whose deadline has passed, if any.
    pub fn pop_due(&mut self) -> Option<ControlEvent> {
        if self.queue.peek()?.due <= self.now {
            self.queue.pop().map(|s| s.event)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for ControlQueue {
    fn default() -> Self {
        Self::new()
    }
}
