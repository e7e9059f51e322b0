//! Hooks fired on breaker state transitions

use std::sync::Arc;

pub type TransitionHook = Arc<dyn Fn(&str) + Send + Sync>;

/// A state change produced by one breaker operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened,
    HalfOpened,
    Closed,
}

/// User callbacks, each receiving the breaker name
///
/// The breaker fires them after releasing its lock, so a hook may call back
/// into the same breaker.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_open: Option<TransitionHook>,
    pub on_half_open: Option<TransitionHook>,
    pub on_close: Option<TransitionHook>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self, transition: Transition, breaker: &str) {
        let hook = match transition {
            Transition::Opened => &self.on_open,
            Transition::HalfOpened => &self.on_half_open,
            Transition::Closed => &self.on_close,
        };
        if let Some(hook) = hook {
            hook(breaker);
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_open", &self.on_open.is_some())
            .field("on_half_open", &self.on_half_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
