mod animatable;
mod timing;

pub use animatable::Animatable;
pub use timing::TimingFunction;

/// Default interpolation length in milliseconds
pub const DEFAULT_DURATION_MS: f32 = 200.0;

/// How a transition treats properties that appear in only one of the two
/// state snapshots
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PropertyPolicy {
    /// Interpolate the shared keys only; the rest are left alone
    #[default]
    Ignore,
    /// Refuse to play unless both snapshots carry the same keys
    Strict,
}

/// Configuration for how the shared properties animate during a transition
#[derive(Clone, Debug)]
pub struct Transition {
    /// Duration of the interpolation in milliseconds
    pub duration_ms: f32,
    /// Timing function controlling the interpolation curve
    pub timing: TimingFunction,
    /// Delay before the interpolation starts in milliseconds
    pub delay_ms: f32,
    /// Handling of properties missing from one snapshot
    pub properties: PropertyPolicy,
}

impl Transition {
    /// Create a new transition with the given duration and timing function
    pub fn new(duration_ms: f32, timing: TimingFunction) -> Self {
        Self {
            duration_ms,
            timing,
            delay_ms: 0.0,
            properties: PropertyPolicy::Ignore,
        }
    }

    /// Set the delay before the interpolation starts
    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the duration of the interpolation
    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the timing function
    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    /// Set the property policy
    pub fn properties(mut self, policy: PropertyPolicy) -> Self {
        self.properties = policy;
        self
    }
}

impl Default for Transition {
    /// 200ms quadratic ease-in-out, no delay
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_MS, TimingFunction::EaseInOut)
    }
}
