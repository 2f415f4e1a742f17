use crate::state::Properties;

/// Trait for types that can be animated by interpolating between values
pub trait Animatable: Clone + PartialEq + 'static {
    /// Linear interpolation between two values
    /// t = 0.0 returns `from`, t = 1.0 returns `to`
    /// t can exceed [0, 1] range for overshoot effects
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

/// Keys present in only one of the two bags are carried over from `from`
/// unchanged, or dropped when they exist only in `to`.
impl Animatable for Properties {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from.iter()
            .map(|(name, start)| {
                let value = match to.get(name) {
                    Some(end) => f32::lerp(start, end, t),
                    None => *start,
                };
                (name.clone(), value)
            })
            .collect()
    }
}
