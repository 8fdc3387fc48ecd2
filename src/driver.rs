use anyhow::Result;
use std::time::{Duration, Instant};

/// Whether the driver is still scheduling frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Stopped,
}

/// What the per-frame callback wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

/// Drives the per-frame callback as an explicit, owned loop instead of a
/// self-rescheduling callback, so cancellation is always well-defined.
///
/// A driver starts `Running` and transitions to `Stopped` exactly once, either
/// via `stop()` or when the callback returns `Tick::Stop`. `Stopped` is
/// terminal for the instance; a new run requires a new driver. Frames are
/// paced to the target fps by sleeping out the remainder of each frame
/// interval (fps 0 runs unpaced).
pub struct FrameDriver {
    frame_interval: Option<Duration>,
    state: DriverState,
}

impl FrameDriver {
    pub fn new(fps: u32) -> Self {
        let frame_interval = if fps > 0 {
            Some(Duration::from_secs_f64(1.0 / fps as f64))
        } else {
            None
        };
        Self { frame_interval, state: DriverState::Running }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Stops the driver. Idempotent; there is no resume.
    pub fn stop(&mut self) {
        self.state = DriverState::Stopped;
    }

    /// Runs the frame loop until the callback asks to stop (or the driver was
    /// already stopped, in which case nothing runs). Exactly one frame of
    /// work executes per tick; the callback receives the frame index.
    /// Returns the number of frames executed.
    pub fn run<F>(&mut self, mut tick: F) -> Result<u32>
    where
        F: FnMut(u32) -> Result<Tick>,
    {
        let mut frames = 0u32;

        while self.state == DriverState::Running {
            let frame_start = Instant::now();

            if tick(frames)? == Tick::Stop {
                self.stop();
            }
            frames += 1;

            if self.state == DriverState::Running {
                if let Some(interval) = self.frame_interval {
                    let elapsed = frame_start.elapsed();
                    if elapsed < interval {
                        std::thread::sleep(interval - elapsed);
                    }
                }
            }
        }

        Ok(frames)
    }
}
