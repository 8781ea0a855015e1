//! The self-rescheduling animation loop.
//!
//! The host's refresh-synchronized callback sits behind [`FrameDriver`].
//! [`Scheduler`] holds at most one pending [`FrameHandle`]; a frame whose
//! handle is not the pending one is stale and does nothing.

/// Ticket for one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Hands out sequential handles.
#[derive(Debug, Default)]
pub struct HandleSequence {
    next: u64,
}

impl HandleSequence {
    pub fn next_handle(&mut self) -> FrameHandle {
        self.next += 1;
        FrameHandle(self.next)
    }
}

/// Abstraction over "call me back on the next display refresh".
pub trait FrameDriver {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Deterministic driver advanced by hand.
///
/// Every requested and not yet cancelled frame fires on the next [`tick`].
///
/// [`tick`]: ManualFrameDriver::tick
#[derive(Debug, Default)]
pub struct ManualFrameDriver {
    handles: HandleSequence,
    pending: Vec<FrameHandle>,
    pub requested: u64,
    pub cancelled: u64,
}

impl ManualFrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the frames due on this refresh, oldest first.
    pub fn tick(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl FrameDriver for ManualFrameDriver {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.handles.next_handle();
        self.pending.push(handle);
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|&h| h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    /// Waiting for the driver to fire `pending`.
    Running { pending: FrameHandle },
    /// A frame body is executing; nothing is pending yet.
    InFrame,
}

/// Start/stop lifecycle of the loop.
///
/// The scheduler never runs a frame itself; the owner calls
/// [`begin_frame`](Scheduler::begin_frame) when the driver fires, does the
/// work, then calls [`end_frame`](Scheduler::end_frame) to queue the next one.
#[derive(Debug)]
pub struct Scheduler<D: FrameDriver> {
    driver: D,
    state: LoopState,
}

impl<D: FrameDriver> Scheduler<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            state: LoopState::Stopped,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != LoopState::Stopped
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Enters `Running` and requests the first frame. Any pending frame is
    /// cancelled first, so calling this while running restarts the loop.
    pub fn start(&mut self) {
        self.cancel_pending();
        let pending = self.driver.request_frame();
        self.state = LoopState::Running { pending };
    }

    /// Cancels the pending frame, if any. Safe to call when stopped.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.state = LoopState::Stopped;
    }

    /// Whether `handle` is the live frame. Consumes it: the loop has no
    /// pending frame until [`end_frame`](Scheduler::end_frame).
    pub fn begin_frame(&mut self, handle: FrameHandle) -> bool {
        match self.state {
            LoopState::Running { pending } if pending == handle => {
                self.state = LoopState::InFrame;
                true
            }
            _ => false,
        }
    }

    /// Queues the next iteration, unless the loop was stopped or restarted
    /// while the frame body ran.
    pub fn end_frame(&mut self) {
        if self.state == LoopState::InFrame {
            let pending = self.driver.request_frame();
            self.state = LoopState::Running { pending };
        }
    }

    fn cancel_pending(&mut self) {
        if let LoopState::Running { pending } = self.state {
            self.driver.cancel_frame(pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs every due frame, counting bodies that actually execute.
    fn pump(scheduler: &mut Scheduler<ManualFrameDriver>) -> usize {
        let mut ran = 0;
        for handle in scheduler.driver_mut().tick() {
            if scheduler.begin_frame(handle) {
                ran += 1;
                scheduler.end_frame();
            }
        }
        ran
    }

    #[test]
    fn test_starts_stopped() {
        let scheduler = Scheduler::new(ManualFrameDriver::new());
        assert_eq!(scheduler.state(), LoopState::Stopped);
        assert_eq!(scheduler.driver().pending(), 0);
    }

    #[test]
    fn test_loop_reschedules_itself() {
        let mut scheduler = Scheduler::new(ManualFrameDriver::new());
        scheduler.start();
        for _ in 0..10 {
            assert_eq!(pump(&mut scheduler), 1);
            assert_eq!(scheduler.driver().pending(), 1);
        }
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut scheduler = Scheduler::new(ManualFrameDriver::new());
        scheduler.stop();
        scheduler.start();
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.driver().pending(), 0);
        assert_eq!(pump(&mut scheduler), 0);
    }

    #[test]
    fn test_restart_keeps_single_frame_in_flight() {
        let mut scheduler = Scheduler::new(ManualFrameDriver::new());
        scheduler.start();
        scheduler.start();
        scheduler.start();
        assert_eq!(scheduler.driver().pending(), 1);
        assert_eq!(scheduler.driver().cancelled, 2);
        assert_eq!(pump(&mut scheduler), 1);
    }

    #[test]
    fn test_stale_handle_does_nothing() {
        let mut scheduler = Scheduler::new(ManualFrameDriver::new());
        scheduler.start();
        let stale = scheduler.driver_mut().tick()[0];
        scheduler.start();

        assert!(!scheduler.begin_frame(stale));
        assert_eq!(scheduler.driver().pending(), 1);
    }

    #[test]
    fn test_stop_during_frame_prevents_reschedule() {
        let mut scheduler = Scheduler::new(ManualFrameDriver::new());
        scheduler.start();
        let handle = scheduler.driver_mut().tick()[0];

        assert!(scheduler.begin_frame(handle));
        scheduler.stop();
        scheduler.end_frame();
        assert_eq!(scheduler.driver().pending(), 0);
    }

    #[test]
    fn test_restart_during_frame_keeps_one_pending() {
        let mut scheduler = Scheduler::new(ManualFrameDriver::new());
        scheduler.start();
        let handle = scheduler.driver_mut().tick()[0];

        assert!(scheduler.begin_frame(handle));
        scheduler.start();
        scheduler.end_frame();
        assert_eq!(scheduler.driver().pending(), 1);
    }
}
