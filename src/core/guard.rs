//! Guard predicates for controlling transitions.
//!
//! Guards are boolean functions that decide whether a transition is enabled.
//! They should be pure: the engine evaluates every candidate guard of a
//! dispatch to detect ambiguity, so a guard with side effects runs even when
//! its transition is not taken.

use std::any::{type_name, Any};
use std::fmt;

/// Argument-less predicate guarding a completion transition.
///
/// # Example
///
/// ```rust
/// use statechart::core::Guard;
///
/// let always = Guard::always();
/// let never = Guard::new(|| false);
///
/// assert!(always.check());
/// assert!(!never.check());
/// ```
pub struct Guard {
    predicate: Box<dyn Fn() -> bool + Send + Sync>,
}

impl Guard {
    /// Create a guard from a predicate function.
    ///
    /// The predicate must be thread-safe (Send + Sync) because models are
    /// shared across machine instances.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Guard that is always satisfied.
    pub fn always() -> Self {
        Self::new(|| true)
    }

    pub fn check(&self) -> bool {
        (self.predicate)()
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard")
    }
}

fn is_message<M: Any>(message: &dyn Any) -> bool {
    message.is::<M>()
}

/// Predicate guarding a message-triggered transition.
///
/// A message guard accepts exactly one message type; messages of any other
/// runtime type never satisfy it.
///
/// # Example
///
/// ```rust
/// use statechart::core::MessageGuard;
///
/// struct Coin(u32);
/// struct Push;
///
/// let enough = MessageGuard::new(|coin: &Coin| coin.0 >= 25);
///
/// assert!(enough.check(&Coin(25)));
/// assert!(!enough.check(&Coin(10)));
/// assert!(!enough.check(&Push));
/// assert!(enough.accepts(&Coin(1)));
/// ```
pub struct MessageGuard {
    accepts: fn(&dyn Any) -> bool,
    message_type: &'static str,
    predicate: Box<dyn Fn(&dyn Any) -> bool + Send + Sync>,
}

impl MessageGuard {
    /// Create a guard over messages of type `M`.
    pub fn new<M, F>(predicate: F) -> Self
    where
        M: Any,
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        MessageGuard {
            accepts: is_message::<M>,
            message_type: type_name::<M>(),
            predicate: Box::new(move |message: &dyn Any| {
                message.downcast_ref::<M>().is_some_and(&predicate)
            }),
        }
    }

    /// Guard satisfied by every message of type `M`.
    pub fn any<M: Any>() -> Self {
        Self::new(|_: &M| true)
    }

    /// Check if `message` has the type this guard is declared over.
    pub fn accepts(&self, message: &dyn Any) -> bool {
        (self.accepts)(message)
    }

    /// Check the message type and then the predicate.
    pub fn check(&self, message: &dyn Any) -> bool {
        self.accepts(message) && (self.predicate)(message)
    }

    /// Name of the accepted message type, for diagnostics.
    pub fn message_type(&self) -> &'static str {
        self.message_type
    }
}

impl fmt::Debug for MessageGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageGuard")
            .field("message_type", &self.message_type)
            .finish_non_exhaustive()
    }
}
