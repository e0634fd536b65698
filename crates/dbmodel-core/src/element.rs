//! Capabilities shared by every model entity.

use crate::error::{SemanticError, SemanticErrorKind};
use crate::ids::EntityId;
use crate::span::Span;

/// A model entity: it has an allocated identifier and the token it was
/// declared at, and it can raise errors attributed to that token.
pub trait Element {
    /// Identifier type of the entity.
    type Id: EntityId;

    /// The entity's identifier.
    fn id(&self) -> Self::Id;

    /// Where the entity was declared.
    fn token(&self) -> Span;

    /// Build a semantic error pointing at this entity.
    fn error(&self, kind: SemanticErrorKind, message: impl Into<String>) -> SemanticError {
        SemanticError::new(message, self.token(), kind)
    }
}

/// Implements [`Element`] for a struct with `id` and `token` fields.
macro_rules! impl_element {
    ($ty:ty, $id:ty) => {
        impl $crate::element::Element for $ty {
            type Id = $id;

            fn id(&self) -> $id {
                self.id
            }

            fn token(&self) -> $crate::span::Span {
                self.token
            }
        }
    };
}

pub(crate) use impl_element;
