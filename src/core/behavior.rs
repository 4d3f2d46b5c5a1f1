//! Ordered callback lists for entry, exit and transition effects.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Side-effecting action with no arguments.
pub type Action = Arc<dyn Fn() + Send + Sync>;

/// Side-effecting action receiving the message that triggered a transition.
pub type MessageAction = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Zero or more actions, invoked in registration order.
#[derive(Clone, Default)]
pub struct Behavior {
    actions: Vec<Action>,
}

impl Behavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&mut self, action: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.actions.push(Arc::new(action));
    }

    /// Run every action once, in the order they were added.
    pub fn invoke(&self) {
        for action in &self.actions {
            action();
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("actions", &self.actions.len())
            .finish()
    }
}
