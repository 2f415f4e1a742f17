//! Transition between two states of a shared target.
//!
//! [`TransitionController`] plays a set of clips on the target while it
//! interpolates the target's properties from the source state toward the
//! destination state. The transition finishes once every clip has stopped
//! and the interpolation has completed. At that point the clips are detached,
//! the destination state is installed, and the completion callback fires.
//!
//! Progress is driven entirely by the host: tweens advance through
//! [`TweenGroup::update`] and clips report completion through their observer
//! (see [`advance_clip`](crate::clip::advance_clip)).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::animation::{PropertyPolicy, TimingFunction, Transition};
use crate::clip::{AnimatedClip, ClipCallback, ClipHandle};
use crate::error::{Result, TransitionError};
use crate::state::{same_target, Properties, StateHandle, TargetHandle};
use crate::tween::{Tween, TweenGroup, TweenId};

/// One-shot callback fired when a transition finishes
pub type CompletionCallback = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Inside `play()`, before the interpolation is registered
    Starting,
    Playing,
    Completed,
}

struct Inner {
    from_state: StateHandle,
    to_state: StateHandle,
    target: TargetHandle,
    clips: Vec<ClipHandle>,
    /// Live property values, written by the tween and pushed to the target
    interpolated: Rc<RefCell<Properties>>,
    /// Present from `play()` until the tween completes
    interpolation: Option<TweenId>,
    config: Transition,
    phase: Phase,
    on_complete: Option<CompletionCallback>,
    tweens: TweenGroup,
    /// Set while `finish_now` tears the transition down
    finishing: bool,
    /// `finish_now` was requested while the target was mid-update
    finish_deferred: bool,
}

/// Drives a single transition from one state of a target to another.
///
/// A controller plays at most once and is discarded after it completes.
/// Once playing, the transition keeps itself alive until it completes, so
/// the controller may be dropped right after [`play`](Self::play).
pub struct TransitionController {
    inner: Rc<RefCell<Inner>>,
}

impl TransitionController {
    /// Create a transition between two states of the same target.
    ///
    /// Fails if either state has no target or the targets differ.
    pub fn new(from_state: StateHandle, to_state: StateHandle) -> Result<Self> {
        let target = from_state
            .borrow()
            .target()
            .ok_or(TransitionError::InvalidTransition("source state has no target"))?;
        let to_target = to_state
            .borrow()
            .target()
            .ok_or(TransitionError::InvalidTransition("destination state has no target"))?;
        if !same_target(&target, &to_target) {
            return Err(TransitionError::InvalidTransition(
                "states govern different targets",
            ));
        }

        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                from_state,
                to_state,
                target,
                clips: Vec::new(),
                interpolated: Rc::new(RefCell::new(Properties::new())),
                interpolation: None,
                config: Transition::default(),
                phase: Phase::Idle,
                on_complete: None,
                tweens: TweenGroup::thread_default(),
                finishing: false,
                finish_deferred: false,
            })),
        })
    }

    /// Use `tweens` instead of the thread's default group
    pub fn with_tweens(self, tweens: TweenGroup) -> Self {
        self.inner.borrow_mut().tweens = tweens;
        self
    }

    /// Replace the whole interpolation configuration
    pub fn with_config(self, config: Transition) -> Self {
        self.set_config(config);
        self
    }

    /// Queue a clip to play on the target during the transition
    pub fn add_animated_clip(&self, clip: ClipHandle) {
        let mut inner = self.inner.borrow_mut();
        if inner.phase != Phase::Idle {
            log::warn!("Ignoring clip added to a transition that has already started");
            return;
        }
        inner.clips.push(clip);
    }

    /// Install the callback fired once the transition finishes
    pub fn set_on_complete(&self, f: impl FnOnce() + 'static) {
        self.inner.borrow_mut().on_complete = Some(Box::new(f));
    }

    /// Interpolation duration in milliseconds
    pub fn duration(&self) -> f32 {
        self.inner.borrow().config.duration_ms
    }

    /// Set the interpolation duration in milliseconds
    pub fn set_duration(&self, duration_ms: f32) {
        self.inner.borrow_mut().config.duration_ms = duration_ms;
    }

    /// Easing curve used by the interpolation
    pub fn easing(&self) -> TimingFunction {
        self.inner.borrow().config.timing.clone()
    }

    /// Set the easing curve
    pub fn set_easing(&self, timing: TimingFunction) {
        self.inner.borrow_mut().config.timing = timing;
    }

    /// Set the delay before the interpolation starts
    pub fn set_delay(&self, delay_ms: f32) {
        self.inner.borrow_mut().config.delay_ms = delay_ms;
    }

    /// Set how properties missing from one state are handled
    pub fn set_property_policy(&self, policy: PropertyPolicy) {
        self.inner.borrow_mut().config.properties = policy;
    }

    /// Snapshot of the interpolation configuration
    pub fn config(&self) -> Transition {
        self.inner.borrow().config.clone()
    }

    /// Replace the interpolation configuration
    pub fn set_config(&self, config: Transition) {
        self.inner.borrow_mut().config = config;
    }

    /// The state being transitioned away from
    pub fn from_state(&self) -> StateHandle {
        self.inner.borrow().from_state.clone()
    }

    /// The state installed once the transition completes
    pub fn to_state(&self) -> StateHandle {
        self.inner.borrow().to_state.clone()
    }

    /// The target shared by both states
    pub fn target(&self) -> TargetHandle {
        self.inner.borrow().target.clone()
    }

    /// Clips played during the transition, in insertion order
    pub fn clips(&self) -> Vec<ClipHandle> {
        self.inner.borrow().clips.clone()
    }

    /// True from the start of `play()` until the transition completes
    pub fn is_playing(&self) -> bool {
        matches!(self.inner.borrow().phase, Phase::Starting | Phase::Playing)
    }

    /// True once the destination state has been installed
    pub fn is_completed(&self) -> bool {
        self.inner.borrow().phase == Phase::Completed
    }

    /// Current interpolated property values
    pub fn interpolated_properties(&self) -> Properties {
        let interpolated = self.inner.borrow().interpolated.clone();
        let values = interpolated.borrow().clone();
        values
    }

    /// Start the transition.
    ///
    /// Uninstalls the source state, starts every clip on the target and
    /// registers the property interpolation. Returns immediately; completion
    /// is reported through the callback set with [`set_on_complete`](Self::set_on_complete).
    pub fn play(&self) -> Result<()> {
        let (from_state, to_state, target, clips, interpolated, config, tweens) = {
            let inner = self.inner.borrow();
            match inner.phase {
                Phase::Idle => {}
                Phase::Starting | Phase::Playing => return Err(TransitionError::AlreadyPlaying),
                Phase::Completed => return Err(TransitionError::AlreadyCompleted),
            }
            (
                inner.from_state.clone(),
                inner.to_state.clone(),
                inner.target.clone(),
                inner.clips.clone(),
                inner.interpolated.clone(),
                inner.config.clone(),
                inner.tweens.clone(),
            )
        };

        if config.properties == PropertyPolicy::Strict {
            let from = from_state.borrow().properties();
            let to = to_state.borrow().properties();
            if let Some(name) = mismatched_property(&from, &to) {
                return Err(TransitionError::PropertyMismatch { name });
            }
        }

        self.inner.borrow_mut().phase = Phase::Starting;
        log::debug!(
            "Starting transition: {} clip(s), {}ms {:?}",
            clips.len(),
            config.duration_ms,
            config.timing
        );

        from_state.borrow_mut().uninstall();

        // Observers hold the transition alive; completion releases them
        for clip in &clips {
            target.borrow_mut().add_child(clip);
            let mut playback = clip.borrow_mut();
            playback.set_loop(false);
            playback.set_on_complete(Some(clip_observer(
                self.inner.clone(),
                Rc::downgrade(clip),
            )));
            playback.goto_and_play(0);
        }

        *interpolated.borrow_mut() = from_state.borrow().properties();
        let destination = to_state.borrow().properties();

        let on_update = {
            let inner = self.inner.clone();
            move || apply_interpolated(&inner)
        };
        let on_complete = {
            let inner = self.inner.clone();
            move || {
                inner.borrow_mut().interpolation = None;
                check_complete(&inner);
            }
        };

        let tween = Tween::new(interpolated)
            .to(destination, config.duration_ms)
            .easing(config.timing)
            .delay(config.delay_ms)
            .on_update(on_update)
            .on_complete(on_complete);
        let id = tweens.add(tween);

        let mut inner = self.inner.borrow_mut();
        inner.interpolation = Some(id);
        inner.phase = Phase::Playing;
        Ok(())
    }

    /// Force an in-flight transition to its end.
    ///
    /// The interpolation is dropped and the destination values are applied
    /// to the target. Every clip is stopped, and the transition then completes
    /// as usual, so the completion callback still fires exactly once.
    ///
    /// Called from inside the target's property update, the finish runs as
    /// soon as that update returns.
    pub fn finish_now(&self) -> Result<()> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.phase != Phase::Playing {
                return Err(TransitionError::NotPlaying);
            }
            if inner.finishing {
                return Ok(());
            }
            if inner.target.try_borrow_mut().is_err() {
                log::debug!("Target busy; deferring early finish");
                inner.finish_deferred = true;
                return Ok(());
            }
        }

        finish(&self.inner);
        Ok(())
    }
}

/// Drop the interpolation, land on the destination values and complete
fn finish(inner: &Rc<RefCell<Inner>>) {
    let (interpolation, tweens, interpolated, to_state, clips) = {
        let mut state = inner.borrow_mut();
        if state.phase != Phase::Playing || state.finishing {
            return;
        }
        state.finishing = true;
        (
            state.interpolation.take(),
            state.tweens.clone(),
            state.interpolated.clone(),
            state.to_state.clone(),
            state.clips.clone(),
        )
    };

    log::debug!("Finishing transition early");

    if let Some(id) = interpolation {
        tweens.remove(id);
    }

    let destination = to_state.borrow().properties();
    {
        let mut values = interpolated.borrow_mut();
        for (name, value) in destination {
            if let Some(slot) = values.get_mut(&name) {
                *slot = value;
            }
        }
    }
    apply_interpolated(inner);

    for clip in &clips {
        clip.borrow_mut().stop();
    }

    check_complete(inner);
    inner.borrow_mut().finishing = false;
}

/// Observer installed on every clip while the transition runs
fn clip_observer(
    inner: Rc<RefCell<Inner>>,
    clip: Weak<RefCell<dyn AnimatedClip>>,
) -> ClipCallback {
    Rc::new(move || {
        if let Some(clip) = clip.upgrade() {
            if clip.try_borrow().map_or(false, |c| c.is_playing()) {
                log::debug!("Clip reported completion while still playing");
            }
        }
        check_complete(&inner);
    })
}

/// Push the live interpolated values to the target
fn apply_interpolated(inner: &Rc<RefCell<Inner>>) {
    let (target, values) = {
        let inner = inner.borrow();
        let values = inner.interpolated.borrow().clone();
        (inner.target.clone(), values)
    };
    target.borrow_mut().set_state_properties(&values);

    let deferred = std::mem::take(&mut inner.borrow_mut().finish_deferred);
    if deferred {
        finish(inner);
    }
}

/// Finish the transition if every clip and the interpolation are done.
///
/// Runs from every completion source; only the first call that finds
/// everything done has any effect.
fn check_complete(inner: &Rc<RefCell<Inner>>) {
    let (clips, target, to_state, callback) = {
        let mut state = inner.borrow_mut();
        if state.phase != Phase::Playing {
            return;
        }
        // A clip that is mid-update counts as still playing
        let clip_running = state
            .clips
            .iter()
            .any(|clip| clip.try_borrow().map_or(true, |c| c.is_playing()));
        if clip_running || state.interpolation.is_some() {
            return;
        }

        state.phase = Phase::Completed;
        (
            state.clips.clone(),
            state.target.clone(),
            state.to_state.clone(),
            state.on_complete.take(),
        )
    };

    for clip in &clips {
        {
            let mut playback = clip.borrow_mut();
            playback.stop();
            playback.set_on_complete(None);
        }
        target.borrow_mut().remove_child(clip);
    }

    to_state.borrow_mut().install();
    log::debug!("Transition complete");

    if let Some(callback) = callback {
        callback();
    }
}

/// First property name carried by only one of the two snapshots
fn mismatched_property(from: &Properties, to: &Properties) -> Option<String> {
    from.keys()
        .find(|name| !to.contains_key(*name))
        .or_else(|| to.keys().find(|name| !from.contains_key(*name)))
        .cloned()
}
