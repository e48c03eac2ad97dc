//! Lifecycle of transient (pointer-mode) strokes.
//!
//! Each completed transient stroke moves through
//! `glowing -> fading -> deleted`:
//!
//! - it starts glowing as soon as the lifecycle observes it;
//! - it starts fading `fade_delay` after its age anchor (completion time,
//!   or creation time for strokes restored without one);
//! - it is deleted `fade_duration` after fading began.
//!
//! The delete timer is only scheduled once the fade timer has fired, so
//! the two transitions can never run out of order. An id is tracked at
//! most once over the lifecycle's lifetime; observing it again is a no-op.
//!
//! Failures never reach the host. A stroke that is already gone counts as
//! deleted, and a scheduler that refuses a timer gets the stroke deleted
//! on the spot rather than leaked.

use crate::clock::Timestamp;
use crate::config::LifecycleConfig;
use crate::glow::{glow_style, GlowStyle};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::shapes::{Shape, ShapeId};
use crate::store::{ShapeStore, StoreError};
use std::collections::{HashMap, HashSet};

/// Timer payloads scheduled by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleTimer {
    Fade(ShapeId),
    Delete(ShapeId),
}

impl LifecycleTimer {
    pub fn shape_id(&self) -> ShapeId {
        match *self {
            LifecycleTimer::Fade(id) | LifecycleTimer::Delete(id) => id,
        }
    }
}

/// Where a pointer stroke is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Glowing,
    Fading,
    /// Terminal. The stroke is gone from the store.
    Deleted,
}

#[derive(Debug, Clone)]
struct Tracked {
    phase: PointerPhase,
    timer: Option<TimerHandle>,
    fade_started_at: Option<Timestamp>,
}

/// Drives transient strokes from glowing to deletion.
#[derive(Debug, Clone, Default)]
pub struct PointerLifecycle {
    config: LifecycleConfig,
    tracked: HashMap<ShapeId, Tracked>,
    /// Grows for the lifecycle's lifetime: an id, once deleted, must never
    /// be tracked again. Bounded by the number of strokes ever observed.
    deleted: HashSet<ShapeId>,
    attached: bool,
}

impl PointerLifecycle {
    /// Create a detached lifecycle.
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Start managing strokes, catching up on those already in the store.
    ///
    /// Returns how many strokes were picked up. Attaching twice is a no-op.
    pub fn attach<S, Q>(&mut self, store: &mut S, timers: &mut Q, now: Timestamp) -> usize
    where
        S: ShapeStore + ?Sized,
        Q: Scheduler<LifecycleTimer> + ?Sized,
    {
        if self.attached {
            return 0;
        }
        self.attached = true;

        let existing = store.query(&Shape::is_finished_pointer_stroke);
        let picked_up = existing
            .into_iter()
            .filter(|&id| self.observe(id, store, timers, now))
            .count();
        log::info!("Pointer lifecycle attached, caught up on {} stroke(s)", picked_up);
        picked_up
    }

    /// Stop managing strokes and cancel every pending timer.
    ///
    /// Strokes that were still alive become observable again, so a later
    /// [`attach`](Self::attach) picks them up.
    pub fn detach<Q>(&mut self, timers: &mut Q)
    where
        Q: Scheduler<LifecycleTimer> + ?Sized,
    {
        if !self.attached {
            return;
        }
        for (_, tracked) in self.tracked.drain() {
            if let Some(handle) = tracked.timer {
                timers.cancel(handle);
            }
        }
        self.attached = false;
        log::info!("Pointer lifecycle detached");
    }

    /// Take ownership of a completed transient stroke.
    ///
    /// Returns false (and does nothing) if the lifecycle is detached, the
    /// id was seen before, or the shape is not a completed transient stroke.
    pub fn observe<S, Q>(&mut self, id: ShapeId, store: &mut S, timers: &mut Q, now: Timestamp) -> bool
    where
        S: ShapeStore + ?Sized,
        Q: Scheduler<LifecycleTimer> + ?Sized,
    {
        if !self.attached || self.tracked.contains_key(&id) || self.deleted.contains(&id) {
            return false;
        }
        let Some(stroke) = store.get(id).and_then(Shape::as_stroke) else {
            return false;
        };
        if !(stroke.transient && stroke.complete) {
            return false;
        }

        let anchor = stroke.age_anchor();
        let elapsed = now.saturating_since(anchor);
        if elapsed >= self.config.fade_delay() {
            log::debug!("Stroke {} is {:?} old, fading immediately", id, elapsed);
            self.tracked.insert(
                id,
                Tracked {
                    phase: PointerPhase::Fading,
                    timer: None,
                    fade_started_at: Some(now),
                },
            );
            self.schedule_delete(id, store, timers, now);
            return true;
        }

        let fade_at = anchor.saturating_add(self.config.fade_delay());
        match timers.schedule_at(fade_at, LifecycleTimer::Fade(id)) {
            Ok(handle) => {
                log::debug!("Stroke {} glowing, fade at {}", id, fade_at);
                self.tracked.insert(
                    id,
                    Tracked {
                        phase: PointerPhase::Glowing,
                        timer: Some(handle),
                        fade_started_at: None,
                    },
                );
            }
            Err(e) => {
                log::warn!("Could not schedule fade for stroke {}: {}; deleting now", id, e);
                self.delete_now(id, store);
            }
        }
        true
    }

    /// Handle a timer popped from the scheduler.
    ///
    /// Timers that no longer match a tracked stroke are ignored.
    pub fn on_timer<S, Q>(
        &mut self,
        handle: TimerHandle,
        timer: LifecycleTimer,
        store: &mut S,
        timers: &mut Q,
        now: Timestamp,
    ) where
        S: ShapeStore + ?Sized,
        Q: Scheduler<LifecycleTimer> + ?Sized,
    {
        let id = timer.shape_id();
        let Some(tracked) = self.tracked.get_mut(&id) else {
            log::debug!("Ignoring stale {:?}", timer);
            return;
        };
        if tracked.timer != Some(handle) {
            log::debug!("Ignoring superseded {:?}", timer);
            return;
        }

        match timer {
            LifecycleTimer::Fade(_) => {
                log::debug!("Stroke {} fading", id);
                tracked.phase = PointerPhase::Fading;
                tracked.timer = None;
                tracked.fade_started_at = Some(now);
                self.schedule_delete(id, store, timers, now);
            }
            LifecycleTimer::Delete(_) => self.delete_now(id, store),
        }
    }

    /// The stroke was deleted by someone else; drop its pending timers.
    ///
    /// Returns true if the stroke was being tracked.
    pub fn forget<Q>(&mut self, id: ShapeId, timers: &mut Q) -> bool
    where
        Q: Scheduler<LifecycleTimer> + ?Sized,
    {
        let Some(tracked) = self.tracked.remove(&id) else {
            return false;
        };
        if let Some(handle) = tracked.timer {
            timers.cancel(handle);
        }
        self.deleted.insert(id);
        log::debug!("Stroke {} removed externally, timers cancelled", id);
        true
    }

    /// Current phase of a stroke, `None` if it was never tracked.
    pub fn phase(&self, id: ShapeId) -> Option<PointerPhase> {
        match self.tracked.get(&id) {
            Some(tracked) => Some(tracked.phase),
            None if self.deleted.contains(&id) => Some(PointerPhase::Deleted),
            None => None,
        }
    }

    /// When the stroke started fading.
    pub fn fade_started_at(&self, id: ShapeId) -> Option<Timestamp> {
        self.tracked.get(&id).and_then(|t| t.fade_started_at)
    }

    /// Pending timer of a tracked stroke.
    pub fn pending_timer(&self, id: ShapeId) -> Option<TimerHandle> {
        self.tracked.get(&id).and_then(|t| t.timer)
    }

    /// Fraction of the fade completed at `now` (0 while glowing).
    pub fn fade_progress(&self, id: ShapeId, now: Timestamp) -> Option<f64> {
        let tracked = self.tracked.get(&id)?;
        let Some(started) = tracked.fade_started_at else {
            return Some(0.0);
        };
        let duration = self.config.fade_duration().as_secs_f64();
        if duration <= 0.0 {
            return Some(1.0);
        }
        Some((now.saturating_since(started).as_secs_f64() / duration).min(1.0))
    }

    /// Presentation of a tracked stroke at `now`.
    pub fn style_at(&self, id: ShapeId, now: Timestamp, stroke_width: f64, opacity: f64) -> Option<GlowStyle> {
        let phase = self.phase(id)?;
        let progress = self.fade_progress(id, now).unwrap_or(1.0);
        glow_style(phase, progress, stroke_width, opacity)
    }

    /// Number of strokes currently glowing or fading.
    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }

    fn schedule_delete<S, Q>(&mut self, id: ShapeId, store: &mut S, timers: &mut Q, now: Timestamp)
    where
        S: ShapeStore + ?Sized,
        Q: Scheduler<LifecycleTimer> + ?Sized,
    {
        match timers.schedule_after(now, self.config.fade_duration(), LifecycleTimer::Delete(id)) {
            Ok(handle) => {
                if let Some(tracked) = self.tracked.get_mut(&id) {
                    tracked.timer = Some(handle);
                }
            }
            Err(e) => {
                log::warn!("Could not schedule delete for stroke {}: {}; deleting now", id, e);
                self.delete_now(id, store);
            }
        }
    }

    fn delete_now<S>(&mut self, id: ShapeId, store: &mut S)
    where
        S: ShapeStore + ?Sized,
    {
        // Release tracking first: the store's delete notification may come
        // straight back through `forget`.
        self.tracked.remove(&id);
        self.deleted.insert(id);
        match store.delete(id) {
            Ok(_) => log::debug!("Stroke {} deleted", id),
            Err(StoreError::NotFound(_)) => log::debug!("Stroke {} already deleted", id),
            Err(e) => log::warn!("Failed to delete stroke {}: {}", id, e),
        }
    }
}
