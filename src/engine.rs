use crate::{
    evaluate::{Evaluation, Evaluator},
    pose::Keypoint,
};
use std::{
    sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError},
    time::{Duration, Instant},
};
use tracing::trace;

/// Drives an evaluator from a live frame source.
///
/// The evaluator is stateless; throttling and stale-frame policy live here.
pub struct Engine<E> {
    evaluator: E,
    min_interval: Duration,
    last_evaluation: Option<Instant>,
    pub timing: Timing,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct Timing {
    pub evaluation: Duration,
    pub evaluated: usize,
    /// Frames superseded by a newer one or arriving too soon after the last evaluation.
    pub dropped: usize,
}

impl Timing {
    /// Evaluations per second of evaluation time.
    pub fn evaluation_rate(&self) -> f64 {
        let secs = self.evaluation.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.evaluated as f64 / secs
        }
    }
}

impl<E> Engine<E>
where
    E: Evaluator,
{
    pub fn new(evaluator: E, min_interval: Duration) -> Self {
        Self {
            evaluator,
            min_interval,
            last_evaluation: None,
            timing: Default::default(),
        }
    }

    /// How long to wait before a frame offered at `now` would be evaluated.
    pub fn next_wait(&self, now: Instant) -> Duration {
        self.last_evaluation.map_or(Duration::ZERO, |last| {
            self.min_interval
                .saturating_sub(now.saturating_duration_since(last))
        })
    }

    /// Evaluate `keypoints` unless the previous evaluation was less than the minimum interval
    /// ago, in which case the frame is dropped.
    pub fn offer(&mut self, keypoints: &[Keypoint], now: Instant) -> Option<Evaluation> {
        if !self.next_wait(now).is_zero() {
            self.timing.dropped += 1;
            trace!(dropped = self.timing.dropped, "throttled frame");
            return None;
        }
        self.last_evaluation = Some(now);

        let start = Instant::now();
        let evaluation = self.evaluator.evaluate(keypoints);
        self.timing.evaluation += start.elapsed();
        self.timing.evaluated += 1;
        Some(evaluation)
    }

    /// Wait up to `timeout` for the next frame, then skip ahead to the newest one queued.
    pub fn latest<T>(
        &mut self,
        frames: &Receiver<T>,
        timeout: Duration,
    ) -> Result<T, RecvTimeoutError> {
        let frame = frames.recv_timeout(timeout)?;
        Ok(self.refresh(frames, frame))
    }

    /// Replace `frame` with anything newer already queued, without blocking.
    pub fn refresh<T>(&mut self, frames: &Receiver<T>, mut frame: T) -> T {
        loop {
            match frames.try_recv() {
                Ok(newer) => {
                    self.timing.dropped += 1;
                    frame = newer;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return frame,
            }
        }
    }
}
