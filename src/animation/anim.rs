use std::collections::VecDeque;

use crate::animation::clock::{AnimClock, ClockStep};
use crate::animation::ease::Ease;

/// Sample handed to an animation update function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimFrame {
    /// Eased progress. May leave `[0, 1]` for overshooting eases.
    pub progress: f64,
    /// Completed cycles before this sample.
    pub play_count: u32,
    /// Frame timestamp in milliseconds.
    pub time: f64,
}

/// Whether an animation keeps its slot after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimStatus {
    /// Keep advancing on later frames.
    Running,
    /// Finished; drop from its queue.
    Finished,
}

type UpdateFn<T> = Box<dyn FnMut(&mut T, AnimFrame)>;
type EndFn<T> = Box<dyn FnOnce(&mut T)>;

/// An [`AnimClock`] bound to an update function operating on a target of type `T`.
pub struct Anim<T> {
    clock: AnimClock,
    update: UpdateFn<T>,
    on_end: Option<EndFn<T>>,
}

impl<T> std::fmt::Debug for Anim<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anim")
            .field("clock", &self.clock)
            .field("has_on_end", &self.on_end.is_some())
            .finish()
    }
}

impl<T> Anim<T> {
    /// Create an animation running once over `duration_ms`.
    ///
    /// A negative duration repeats forever; see [`Anim::infinite`].
    pub fn new(duration_ms: f64, ease: Ease, update: impl FnMut(&mut T, AnimFrame) + 'static) -> Self {
        Self {
            clock: AnimClock::new(duration_ms, ease),
            update: Box::new(update),
            on_end: None,
        }
    }

    /// Create an animation repeating forever with the given period.
    pub fn infinite(
        period_ms: f64,
        ease: Ease,
        update: impl FnMut(&mut T, AnimFrame) + 'static,
    ) -> Self {
        Self::new(-period_ms.abs(), ease, update)
    }

    /// Attach a handler invoked once when a finite animation ends (or is force-ended).
    pub fn on_end(mut self, f: impl FnOnce(&mut T) + 'static) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }

    /// Underlying timing state.
    pub fn clock(&self) -> &AnimClock {
        &self.clock
    }

    /// Advance against `target` at `time`.
    pub fn frame(&mut self, target: &mut T, time: f64) -> AnimStatus {
        let play_count = self.clock.play_count();
        match self.clock.step(time) {
            ClockStep::Latched => AnimStatus::Running,
            ClockStep::Progress(progress) => {
                (self.update)(
                    target,
                    AnimFrame {
                        progress,
                        play_count,
                        time,
                    },
                );
                AnimStatus::Running
            }
            ClockStep::Cycle => {
                (self.update)(
                    target,
                    AnimFrame {
                        progress: 1.0,
                        play_count,
                        time,
                    },
                );
                AnimStatus::Running
            }
            ClockStep::Finished => {
                (self.update)(
                    target,
                    AnimFrame {
                        progress: 1.0,
                        play_count,
                        time,
                    },
                );
                if let Some(end) = self.on_end.take() {
                    end(target);
                }
                AnimStatus::Finished
            }
            ClockStep::Idle => AnimStatus::Finished,
        }
    }

    /// Terminate immediately: sample progress `1` once, then run the end handler.
    pub fn force_end(mut self, target: &mut T, time: f64) {
        let play_count = self.clock.play_count();
        self.clock.finish_now();
        (self.update)(
            target,
            AnimFrame {
                progress: 1.0,
                play_count,
                time,
            },
        );
        if let Some(end) = self.on_end.take() {
            end(target);
        }
    }
}

/// Per-object animation queue: a FIFO backlog of unique animations where only the head plays,
/// plus a set of concurrently playing animations.
pub struct AnimQueue<T> {
    backlog: VecDeque<Anim<T>>,
    currents: Vec<Anim<T>>,
    last_time: f64,
}

impl<T> Default for AnimQueue<T> {
    fn default() -> Self {
        Self {
            backlog: VecDeque::new(),
            currents: Vec::new(),
            last_time: 0.0,
        }
    }
}

impl<T> std::fmt::Debug for AnimQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimQueue")
            .field("backlog", &self.backlog.len())
            .field("currents", &self.currents.len())
            .finish()
    }
}

impl<T> AnimQueue<T> {
    /// Return `true` when nothing is queued or playing.
    pub fn is_empty(&self) -> bool {
        self.backlog.is_empty() && self.currents.is_empty()
    }

    /// Number of unique animations waiting or playing (the head plays).
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Number of concurrently playing animations.
    pub fn currents_len(&self) -> usize {
        self.currents.len()
    }

    /// The unique animation currently playing, if any.
    pub fn head(&self) -> Option<&Anim<T>> {
        self.backlog.front()
    }

    /// Concurrent animations.
    pub fn currents(&self) -> &[Anim<T>] {
        &self.currents
    }

    /// Drop every animation without running end handlers.
    pub fn clear(&mut self) {
        self.backlog.clear();
        self.currents.clear();
    }

    fn absorb(&mut self, mut other: AnimQueue<T>) {
        self.backlog.append(&mut other.backlog);
        self.currents.append(&mut other.currents);
    }
}

/// Objects owning an [`AnimQueue`] over themselves.
///
/// Queue processing moves the queue out of the object while callbacks run, so update functions may
/// freely mutate the object and even enqueue further animations on it.
pub trait Animated: Sized + 'static {
    /// Access the object's animation queue.
    fn anim_queue(&mut self) -> &mut AnimQueue<Self>;

    /// Play `anim`.
    ///
    /// Unique animations join the backlog; with `force`, the playing head is ended right away
    /// (sampled at progress `1`, end handler invoked) and `anim` replaces it.
    fn play_anim(&mut self, anim: Anim<Self>, unique: bool, force: bool) {
        let mut queue = std::mem::take(self.anim_queue());
        if unique {
            if force {
                if let Some(head) = queue.backlog.pop_front() {
                    head.force_end(self, queue.last_time);
                }
                queue.backlog.push_front(anim);
            } else {
                queue.backlog.push_back(anim);
            }
        } else {
            queue.currents.push(anim);
        }
        let added = std::mem::take(self.anim_queue());
        queue.absorb(added);
        *self.anim_queue() = queue;
    }

    /// Advance the backlog head and every concurrent animation to `time`.
    fn run_anims(&mut self, time: f64) {
        if self.anim_queue().is_empty() {
            self.anim_queue().last_time = time;
            return;
        }
        let mut queue = std::mem::take(self.anim_queue());
        queue.last_time = time;

        if let Some(head) = queue.backlog.front_mut()
            && head.frame(self, time) == AnimStatus::Finished
        {
            queue.backlog.pop_front();
        }
        queue
            .currents
            .retain_mut(|anim| anim.frame(self, time) == AnimStatus::Running);

        let added = std::mem::take(self.anim_queue());
        queue.absorb(added);
        *self.anim_queue() = queue;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
