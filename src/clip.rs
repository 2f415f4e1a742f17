//! Animated clips played as children of a target during a transition.
//!
//! [`AnimatedClip`] is the playback contract. [`MovieClip`] is a
//! frame-counted implementation driven by elapsed time, and [`advance_clip`]
//! is the per-frame driver that delivers its completion notification.

use std::cell::RefCell;
use std::rc::Rc;

/// Completion observer installed on a clip
pub type ClipCallback = Rc<dyn Fn()>;

/// Shared handle to a clip
pub type ClipHandle = Rc<RefCell<dyn AnimatedClip>>;

/// Playback control for a short animation sequence
pub trait AnimatedClip {
    /// Enable or disable looping
    fn set_loop(&mut self, looping: bool);

    fn is_looping(&self) -> bool;

    /// Whether the clip is currently playing
    fn is_playing(&self) -> bool;

    /// Install or clear the completion observer
    fn set_on_complete(&mut self, callback: Option<ClipCallback>);

    /// The installed completion observer
    fn on_complete(&self) -> Option<ClipCallback>;

    /// Jump to `frame` and start playing
    fn goto_and_play(&mut self, frame: usize);

    /// Stop at the current frame
    fn stop(&mut self);
}

/// Frame-based clip advanced by elapsed milliseconds
pub struct MovieClip {
    total_frames: usize,
    frame_ms: f32,
    current_frame: usize,
    /// Time accumulated toward the next frame
    accumulated_ms: f32,
    looping: bool,
    playing: bool,
    on_complete: Option<ClipCallback>,
}

impl MovieClip {
    /// Create a stopped, looping clip of `total_frames` frames at `fps`
    pub fn new(total_frames: usize, fps: f32) -> Self {
        Self {
            total_frames: total_frames.max(1),
            frame_ms: 1000.0 / fps.max(f32::EPSILON),
            current_frame: 0,
            accumulated_ms: 0.0,
            looping: true,
            playing: false,
            on_complete: None,
        }
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Advance playback by `delta_ms`.
    ///
    /// Returns true exactly when a non-looping clip has just reached its last
    /// frame and stopped.
    pub fn advance(&mut self, delta_ms: f32) -> bool {
        if !self.playing {
            return false;
        }

        self.accumulated_ms += delta_ms.max(0.0);
        let last = self.total_frames - 1;

        while self.accumulated_ms >= self.frame_ms {
            self.accumulated_ms -= self.frame_ms;
            if self.current_frame < last {
                self.current_frame += 1;
            } else if self.looping {
                self.current_frame = 0;
            }

            if self.current_frame == last && !self.looping {
                self.playing = false;
                self.accumulated_ms = 0.0;
                return true;
            }
        }

        false
    }
}

impl AnimatedClip for MovieClip {
    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_on_complete(&mut self, callback: Option<ClipCallback>) {
        self.on_complete = callback;
    }

    fn on_complete(&self) -> Option<ClipCallback> {
        self.on_complete.clone()
    }

    fn goto_and_play(&mut self, frame: usize) {
        self.current_frame = frame.min(self.total_frames - 1);
        self.accumulated_ms = 0.0;
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }
}

/// Advance a [`MovieClip`] and notify its observer when it finishes.
///
/// The borrow on the clip is released before the observer runs, so the
/// observer may inspect or mutate the clip.
pub fn advance_clip(clip: &Rc<RefCell<MovieClip>>, delta_ms: f32) {
    let finished = clip.borrow_mut().advance(delta_ms);
    if !finished {
        return;
    }

    let callback = clip.borrow().on_complete();
    if let Some(callback) = callback {
        callback();
    }
}
