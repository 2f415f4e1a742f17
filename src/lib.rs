//! State transitions for a shared display target.
//!
//! A [`TransitionController`] moves a target from one [`State`](state::State)
//! to another. It plays transitional [clips](clip::AnimatedClip) as children
//! of the target and interpolates the target's properties between the two
//! states' snapshots. When both finish, it installs the destination state.
//!
//! Everything is single-threaded and driven by the host's frame loop:
//!
//! ```ignore
//! let transition = TransitionController::new(idle, pressed)?.with_tweens(tweens.clone());
//! transition.add_animated_clip(sparkle.clone());
//! transition.set_on_complete(|| log::info!("pressed"));
//! transition.play()?;
//!
//! // every frame
//! tweens.update(dt_ms);
//! advance_clip(&sparkle, dt_ms);
//! ```

pub mod animation;
pub mod clip;
pub mod controller;
pub mod error;
pub mod state;
pub mod tween;

pub use controller::{CompletionCallback, TransitionController};
pub use error::{Result, TransitionError};

pub mod prelude {
    pub use crate::animation::{Animatable, PropertyPolicy, TimingFunction, Transition};
    pub use crate::clip::{advance_clip, AnimatedClip, ClipCallback, ClipHandle, MovieClip};
    pub use crate::state::{same_target, Properties, State, StateHandle, Target, TargetHandle};
    pub use crate::tween::{Tween, TweenGroup, TweenId};
    pub use crate::{TransitionController, TransitionError};
}
