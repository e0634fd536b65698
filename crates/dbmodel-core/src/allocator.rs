//! Identifier allocation.

use crate::error::{Result, SemanticError};
use crate::ids::EntityId;
use std::collections::HashMap;

/// The independent counter sequences an allocator keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Database,
    Schema,
    Table,
    Field,
    Index,
    IndexColumn,
    Enum,
    EnumValue,
    Ref,
    Endpoint,
    TableGroup,
    Tag,
}

impl IdKind {
    /// Counter name, as used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Database => "dbId",
            IdKind::Schema => "schemaId",
            IdKind::Table => "tableId",
            IdKind::Field => "fieldId",
            IdKind::Index => "indexId",
            IdKind::IndexColumn => "indexColumnId",
            IdKind::Enum => "enumId",
            IdKind::EnumValue => "enumValueId",
            IdKind::Ref => "refId",
            IdKind::Endpoint => "endpointId",
            IdKind::TableGroup => "tableGroupId",
            IdKind::Tag => "tagId",
        }
    }
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind monotonic counters.
///
/// One allocator belongs to one database and is passed by `&mut` into every
/// entity constructor. Each kind starts at `base` and increases by one per
/// allocation; identifiers are never reused. A kind whose counter would
/// pass `u32::MAX` is exhausted and further allocations fail.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    base: u32,
    next: HashMap<IdKind, u64>,
}

impl IdAllocator {
    /// Create an allocator whose counters start at `base`.
    pub fn new(base: u32) -> Self {
        Self {
            base,
            next: HashMap::new(),
        }
    }

    /// Issue the next identifier for `kind`.
    pub fn allocate(&mut self, kind: IdKind) -> Result<u32> {
        let next = self.next.entry(kind).or_insert(u64::from(self.base));
        let id = u32::try_from(*next)
            .map_err(|_| SemanticError::id_space_exhausted(kind.as_str(), self.base))?;
        *next += 1;
        Ok(id)
    }

    /// Issue the next typed identifier.
    pub fn next_id<T: EntityId>(&mut self) -> Result<T> {
        self.allocate(T::KIND).map(T::from_raw)
    }

    /// The identifier the next allocation for `kind` will return, or `None`
    /// once the kind is exhausted.
    pub fn peek(&self, kind: IdKind) -> Option<u32> {
        u32::try_from(self.counter(kind)).ok()
    }

    /// How many identifiers of `kind` have been issued.
    pub fn issued(&self, kind: IdKind) -> u64 {
        self.counter(kind) - u64::from(self.base)
    }

    fn counter(&self, kind: IdKind) -> u64 {
        self.next
            .get(&kind)
            .copied()
            .unwrap_or(u64::from(self.base))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SemanticErrorKind;
    use crate::ids::{SchemaId, TableId};

    #[test]
    fn test_counters_are_per_kind() {
        let mut ids = IdAllocator::default();

        assert_eq!(ids.allocate(IdKind::Table), Ok(1));
        assert_eq!(ids.allocate(IdKind::Table), Ok(2));
        assert_eq!(ids.allocate(IdKind::Schema), Ok(1));
        assert_eq!(ids.allocate(IdKind::Table), Ok(3));

        assert_eq!(ids.issued(IdKind::Table), 3);
        assert_eq!(ids.issued(IdKind::Schema), 1);
        assert_eq!(ids.issued(IdKind::Tag), 0);
    }

    #[test]
    fn test_custom_base() {
        let mut ids = IdAllocator::new(100);

        assert_eq!(ids.peek(IdKind::Enum), Some(100));
        let schema: SchemaId = ids.next_id().unwrap();
        let table: TableId = ids.next_id().unwrap();
        assert_eq!(schema, SchemaId(100));
        assert_eq!(table, TableId(100));
        assert_eq!(ids.next_id::<TableId>(), Ok(TableId(101)));
    }

    #[test]
    fn test_exhausted_kind_fails() {
        let mut ids = IdAllocator::new(u32::MAX - 1);

        assert_eq!(ids.allocate(IdKind::Table), Ok(u32::MAX - 1));
        assert_eq!(ids.allocate(IdKind::Table), Ok(u32::MAX));
        assert_eq!(ids.peek(IdKind::Table), None);
        assert_eq!(ids.issued(IdKind::Table), 2);

        let err = ids.allocate(IdKind::Table).unwrap_err();
        assert_eq!(err.kind, SemanticErrorKind::IdSpaceExhausted);
        assert_eq!(err.message, "tableId identifiers exhausted (base 4294967294)");
        assert_eq!(ids.allocate(IdKind::Field), Ok(u32::MAX - 1));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(IdKind::Database.to_string(), "dbId");
        assert_eq!(IdKind::IndexColumn.as_str(), "indexColumnId");
    }
}
