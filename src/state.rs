//! Collaborator contracts for the display side of a transition.
//!
//! A [`State`] is a named configuration of a [`Target`]'s animatable
//! properties. Both sides are implemented by the host application and shared
//! through `Rc<RefCell<_>>` handles; target identity is pointer identity.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::clip::ClipHandle;

/// Open-ended bag of animatable properties, keyed by name
pub type Properties = BTreeMap<String, f32>;

/// Shared handle to a display target
pub type TargetHandle = Rc<RefCell<dyn Target>>;

/// Shared handle to a state
pub type StateHandle = Rc<RefCell<dyn State>>;

/// The visual object whose children and properties a transition mutates
pub trait Target {
    /// Attach a clip to the child list
    fn add_child(&mut self, clip: &ClipHandle);

    /// Detach a clip from the child list
    fn remove_child(&mut self, clip: &ClipHandle);

    /// Apply a property snapshot
    fn set_state_properties(&mut self, properties: &Properties);
}

/// A configuration of a target, with lifecycle hooks controlling whether it
/// is the active one
pub trait State {
    /// The target this state governs, if any
    fn target(&self) -> Option<TargetHandle>;

    /// Snapshot of this state's animatable properties
    fn properties(&self) -> Properties;

    /// Take ownership of the target's configuration
    fn install(&mut self);

    /// Release ownership of the target's configuration
    fn uninstall(&mut self);
}

/// True when both handles point at the same target object
pub fn same_target(a: &TargetHandle, b: &TargetHandle) -> bool {
    // Compare data pointers only; vtable pointers may differ across codegen units
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
