//! Structural validity of submitted messages.

/// Pure validity predicate over a structured message.
///
/// Implementations must not depend on any state outside the message itself.
pub trait MessageValidator {
    fn is_valid(&self) -> bool;
}
