//! Cooperative deferred-task scheduler.
//!
//! Deferred work is described by small [`ScheduledTask`] records instead of closures. The
//! dispatcher submits them through a [`SchedulerHandle`]; the owner of the [`Scheduler`]
//! advances its clock once per tick and applies whatever came due.
//!
//! Submissions travel over a channel, so handing out handles never borrows the scheduler.
//! A submission's delay is measured from the clock value at the next [`Scheduler::advance`],
//! which in the single-threaded tick model is the clock value at submission time.

use crate::container::ContainerId;
use crate::events::DestroyReason;
use crate::keys::VoiceKey;
use crossbeam_channel::{Receiver, Sender};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Tasks due within this many seconds of the clock fire on the current tick.
pub const RESOLUTION: f64 = 1e-4;

/// What to do when a task fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Destroy the voice if it is still live
    DestroyVoice(DestroyReason),
}

/// Deferred operation on one voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub container: ContainerId,
    pub entry: usize,
    pub voice: VoiceKey,
    pub action: TaskAction,
}

#[derive(Debug)]
struct Submission {
    delay: f64,
    task: ScheduledTask,
}

#[derive(Debug)]
struct Pending {
    due: f64,
    seq: u64,
    task: ScheduledTask,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Cloneable submission side of a [`Scheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    sender: Sender<Submission>,
}

impl SchedulerHandle {
    /// Runs `task` once, `seconds` from now.
    ///
    /// Negative or NaN delays are ignored without error. Returns whether the task was queued.
    pub fn after(&self, seconds: f32, task: ScheduledTask) -> bool {
        if seconds.is_nan() || seconds < 0.0 {
            log::trace!(
                "Ignoring task for voice {} with delay {}",
                task.voice,
                seconds
            );
            return false;
        }

        self.sender
            .send(Submission {
                delay: seconds as f64,
                task,
            })
            .is_ok()
    }
}

/// Single-fire timer queue driven by an external tick.
#[derive(Debug)]
pub struct Scheduler {
    now: f64,
    next_seq: u64,
    pending: BinaryHeap<Reverse<Pending>>,
    sender: Sender<Submission>,
    receiver: Receiver<Submission>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            now: 0.0,
            next_seq: 0,
            pending: BinaryHeap::new(),
            sender,
            receiver,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            sender: self.sender.clone(),
        }
    }

    /// Current clock value in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of tasks that have not fired yet.
    pub fn pending_count(&self) -> usize {
        self.pending.len() + self.receiver.len()
    }

    /// Moves the clock forward by `dt` seconds and returns the tasks that came due, in due order.
    ///
    /// Tasks with equal due times fire in submission order.
    pub fn advance(&mut self, dt: f64) -> Vec<ScheduledTask> {
        self.collect_submissions();

        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }

        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.pending.peek() {
            if next.due > self.now + RESOLUTION {
                break;
            }
            if let Some(Reverse(next)) = self.pending.pop() {
                log::trace!(
                    "Task for voice {} fired at {:.4}s (due {:.4}s)",
                    next.task.voice,
                    self.now,
                    next.due
                );
                due.push(next.task);
            }
        }
        due
    }

    fn collect_submissions(&mut self) {
        for submission in self.receiver.try_iter() {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.pending.push(Reverse(Pending {
                due: self.now + submission.delay,
                seq,
                task: submission.task,
            }));
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
