//! Client state-synchronization layer.
//!
//! Keeps a signed-in user's customization state consistent with the server:
//! optimistic mutations with recorded rollback values, a normalized entity
//! cache with type-specific merge policy, a single-slot undo buffer with an
//! explicit lifecycle, and a toast bus for user-facing notifications.
//!
//! The layer talks to any server through the [`CharacterApi`] trait, so
//! tests can inject failing transports and the integration suite can drive
//! it against the real GraphQL endpoint.

mod api;
mod cache;
mod character;
mod review;
mod session;
mod store;
mod toast;
mod undo;

pub use api::CharacterApi;
pub use cache::NormalizedCache;
pub use character::CharacterContext;
pub use review::{DialogState, ReviewDialog, ReviewDraft};
pub use session::{AuthSession, EquipmentBrowser};
pub use store::{MemoryStore, StateStore};
pub use toast::{Toast, ToastBus, ToastKind};
pub use undo::{UndoBuffer, UndoSlot, UndoState};

/// Errors surfaced by the client layer. All of them are recovered at the
/// call site that issued the operation; the UI stays usable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Input rejected before any network call
    Validation(String),
    /// Equipment capacity reached
    InventoryFull,
    /// Operation requires a signed-in user
    NotAuthenticated,
    /// Error raised by a resolver (conflicts, not-found, ...)
    Server(String),
    /// Transport failure; never retried automatically
    Network(String),
}

impl ClientError {
    pub fn message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::InventoryFull => {
                "Cannot add any more items, inventory is full".to_string()
            }
            ClientError::NotAuthenticated => "You must be logged in".to_string(),
            ClientError::Server(msg) => msg.clone(),
            ClientError::Network(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ClientError {}

#[cfg(test)]
pub(crate) mod testing;
