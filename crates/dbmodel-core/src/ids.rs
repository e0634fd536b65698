//! Typed entity identifiers.
//!
//! Every model entity is keyed by a newtype over the integer issued by the
//! [`IdAllocator`](crate::allocator::IdAllocator) for its kind, so a table
//! id can never be used to look up a field.

use crate::allocator::IdKind;
use serde::{Deserialize, Serialize};

/// An identifier type tied to one allocator counter.
pub trait EntityId: Copy + Eq + Ord + std::hash::Hash + std::fmt::Debug {
    /// The counter this identifier is drawn from.
    const KIND: IdKind;

    /// Wrap a raw allocator value.
    fn from_raw(raw: u32) -> Self;

    /// The raw allocator value.
    fn get(self) -> u32;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl EntityId for $name {
            const KIND: IdKind = IdKind::$kind;

            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            fn get(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of the root database.
    DatabaseId => Database
);
entity_id!(
    /// Identifier of a schema.
    SchemaId => Schema
);
entity_id!(
    /// Identifier of a table.
    TableId => Table
);
entity_id!(
    /// Identifier of a table field (column).
    FieldId => Field
);
entity_id!(
    /// Identifier of a table index.
    IndexId => Index
);
entity_id!(
    /// Identifier of a column inside an index.
    IndexColumnId => IndexColumn
);
entity_id!(
    /// Identifier of an enum.
    EnumId => Enum
);
entity_id!(
    /// Identifier of an enum value.
    EnumValueId => EnumValue
);
entity_id!(
    /// Identifier of a ref (relationship).
    RefId => Ref
);
entity_id!(
    /// Identifier of one side of a ref.
    EndpointId => Endpoint
);
entity_id!(
    /// Identifier of a table group.
    TableGroupId => TableGroup
);
entity_id!(
    /// Identifier of a tag.
    TagId => Tag
);
