use thiserror::Error;

/// Errors that can occur when registering an actor with an [`crate::ActorSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorSystemError {
    /// The requested actor id is already registered.
    #[error("actor id `{0}` is already registered")]
    DuplicateId(String),
}
