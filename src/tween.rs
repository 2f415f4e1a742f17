//! Property-bag interpolation driven by a host update loop.
//!
//! A [`Tween`] blends a shared [`Properties`] bag in place toward a
//! destination snapshot. Tweens are registered on a [`TweenGroup`], which the
//! host advances once per frame:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use transitionable::tween::{Tween, TweenGroup};
//! use transitionable::state::Properties;
//!
//! let values = Rc::new(RefCell::new(Properties::from([("alpha".to_string(), 0.0)])));
//! let group = TweenGroup::new();
//! group.add(Tween::new(values.clone()).to(Properties::from([("alpha".to_string(), 1.0)]), 100.0));
//!
//! while group.update(16.0) {}
//! assert_eq!(values.borrow()["alpha"], 1.0);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::animation::{Animatable, TimingFunction};
use crate::state::Properties;

/// Identifies a tween registered on a [`TweenGroup`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TweenId(u64);

type UpdateCallback = Box<dyn FnMut()>;
type CompleteCallback = Box<dyn FnOnce()>;

/// Time-based interpolation of a shared property bag
pub struct Tween {
    /// Live values, mutated in place on every update
    values: Rc<RefCell<Properties>>,
    /// Values at the first non-delayed update, restricted to the shared keys
    start: Option<Properties>,
    end: Properties,
    duration_ms: f32,
    delay_ms: f32,
    elapsed_ms: f32,
    timing: TimingFunction,
    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,
}

impl Tween {
    /// Create a tween over `values`. Until [`Tween::to`] is called the
    /// destination is empty and the tween only waits out its duration.
    pub fn new(values: Rc<RefCell<Properties>>) -> Self {
        Self {
            values,
            start: None,
            end: Properties::new(),
            duration_ms: 0.0,
            delay_ms: 0.0,
            elapsed_ms: 0.0,
            timing: TimingFunction::default(),
            on_update: None,
            on_complete: None,
        }
    }

    /// Set the destination snapshot and duration
    pub fn to(mut self, end: Properties, duration_ms: f32) -> Self {
        self.end = end;
        self.duration_ms = duration_ms.max(0.0);
        self
    }

    /// Set the easing curve
    pub fn easing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    /// Wait `delay_ms` before interpolating
    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    /// Called after every update that wrote new values
    pub fn on_update(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Called once after the final update
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Advance by `delta_ms`. Returns true while the tween is still running.
    pub fn update(&mut self, delta_ms: f32) -> bool {
        self.elapsed_ms += delta_ms.max(0.0);
        let active_ms = self.elapsed_ms - self.delay_ms;
        if active_ms < 0.0 {
            return true;
        }

        let end = &self.end;
        let start = self.start.get_or_insert_with(|| {
            self.values
                .borrow()
                .iter()
                .filter(|(name, _)| end.contains_key(*name))
                .map(|(name, value)| (name.clone(), *value))
                .collect()
        });

        let t = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (active_ms / self.duration_ms).min(1.0)
        };
        let finished = t >= 1.0;

        // The final write lands exactly on the destination
        let eased = if finished { 1.0 } else { self.timing.evaluate(t) };
        let blended = Properties::lerp(start, end, eased);
        self.values.borrow_mut().extend(blended);

        if let Some(on_update) = self.on_update.as_mut() {
            on_update();
        }

        if finished {
            if let Some(on_complete) = self.on_complete.take() {
                on_complete();
            }
            return false;
        }

        true
    }
}

#[derive(Default)]
struct GroupState {
    next_id: Cell<u64>,
    active: RefCell<Vec<(TweenId, Tween)>>,
    /// Ids of the batch currently being advanced by `update`
    in_flight: RefCell<Vec<TweenId>>,
    /// Tweens added while a batch is being advanced
    pending: RefCell<Vec<(TweenId, Tween)>>,
    /// Ids removed while a batch is being advanced
    removed: RefCell<Vec<TweenId>>,
    updating: Cell<bool>,
}

/// Shared set of running tweens, advanced together by the host loop.
///
/// Cloning yields another handle to the same group.
#[derive(Clone, Default)]
pub struct TweenGroup {
    state: Rc<GroupState>,
}

thread_local! {
    static DEFAULT_GROUP: TweenGroup = TweenGroup::new();
}

impl TweenGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// The group used by transitions that were not given one explicitly
    pub fn thread_default() -> Self {
        DEFAULT_GROUP.with(|group| group.clone())
    }

    /// Register a tween; it is first advanced by the next [`update`](Self::update)
    pub fn add(&self, tween: Tween) -> TweenId {
        let id = TweenId(self.state.next_id.get());
        self.state.next_id.set(id.0 + 1);

        if self.state.updating.get() {
            self.state.pending.borrow_mut().push((id, tween));
        } else {
            self.state.active.borrow_mut().push((id, tween));
        }
        id
    }

    /// Drop a tween without completing it. Returns false if it was not registered.
    pub fn remove(&self, id: TweenId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.state.in_flight.borrow().contains(&id) {
            self.state.removed.borrow_mut().push(id);
        }
        self.state.active.borrow_mut().retain(|(other, _)| *other != id);
        self.state.pending.borrow_mut().retain(|(other, _)| *other != id);
        true
    }

    pub fn contains(&self, id: TweenId) -> bool {
        let state = &self.state;
        if state.removed.borrow().contains(&id) {
            return false;
        }
        state.in_flight.borrow().contains(&id)
            || state.active.borrow().iter().any(|(other, _)| *other == id)
            || state.pending.borrow().iter().any(|(other, _)| *other == id)
    }

    pub fn len(&self) -> usize {
        let state = &self.state;
        let removed = state.removed.borrow();
        let in_flight = state
            .in_flight
            .borrow()
            .iter()
            .filter(|id| !removed.contains(id))
            .count();
        state.active.borrow().len() + in_flight + state.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advance every registered tween by `delta_ms` and drop the finished ones.
    ///
    /// Callbacks may add or remove tweens on this group. Returns true while
    /// any tween remains registered.
    pub fn update(&self, delta_ms: f32) -> bool {
        if self.state.updating.replace(true) {
            log::warn!("TweenGroup::update called re-entrantly; ignoring");
            return !self.is_empty();
        }

        let batch = std::mem::take(&mut *self.state.active.borrow_mut());
        *self.state.in_flight.borrow_mut() = batch.iter().map(|(id, _)| *id).collect();
        let mut survivors = Vec::with_capacity(batch.len());

        for (id, mut tween) in batch {
            if self.state.removed.borrow().contains(&id) {
                continue;
            }
            if tween.update(delta_ms) {
                survivors.push((id, tween));
            } else {
                self.state.in_flight.borrow_mut().retain(|other| *other != id);
            }
        }

        let removed = std::mem::take(&mut *self.state.removed.borrow_mut());
        survivors.retain(|(id, _)| !removed.contains(id));
        survivors.append(&mut self.state.pending.borrow_mut());
        *self.state.active.borrow_mut() = survivors;
        self.state.in_flight.borrow_mut().clear();

        self.state.updating.set(false);
        !self.is_empty()
    }
}
