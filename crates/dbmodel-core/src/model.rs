//! Arena storage for every entity of a database.
//!
//! Entities never point at each other directly. Each kind lives in an
//! [`Arena`] keyed by its typed identifier, and relations (schema children,
//! tag membership, enum consumers, endpoint fields) are identifier lists.

use crate::enums::{Enum, EnumValue};
use crate::ids::{
    EndpointId, EntityId, EnumId, EnumValueId, FieldId, IndexColumnId, IndexId, RefId, SchemaId,
    TableGroupId, TableId, TagId,
};
use crate::reference::{Endpoint, Ref};
use crate::schema::Schema;
use crate::table::{Field, Index, IndexColumn, Table};
use crate::table_group::TableGroup;
use crate::tag::Tag;
use std::collections::HashMap;

/// Identifier-keyed storage for one entity kind.
#[derive(Debug, Clone)]
pub struct Arena<I, T> {
    items: HashMap<I, T>,
}

impl<I: EntityId, T> Arena<I, T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Get an entity by identifier.
    pub fn get(&self, id: I) -> Option<&T> {
        self.items.get(&id)
    }

    pub(crate) fn insert(&mut self, id: I, item: T) {
        self.items.insert(id, item);
    }

    /// Check whether an identifier is present.
    pub fn contains(&self, id: I) -> bool {
        self.items.contains_key(&id)
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All identifiers, in ascending order.
    pub fn ids(&self) -> Vec<I> {
        let mut ids: Vec<I> = self.items.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Iterate over stored entities in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }
}

impl<I: EntityId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: EntityId, T> std::ops::Index<I> for Arena<I, T> {
    type Output = T;

    /// Panics if the identifier was never inserted. Identifiers handed out
    /// by a constructed model always resolve.
    fn index(&self, id: I) -> &T {
        match self.items.get(&id) {
            Some(item) => item,
            None => panic!("no {} with id {}", I::KIND, id.get()),
        }
    }
}

impl<I: EntityId, T> std::ops::IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        match self.items.get_mut(&id) {
            Some(item) => item,
            None => panic!("no {} with id {}", I::KIND, id.get()),
        }
    }
}

/// All entities owned by one database.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub schemas: Arena<SchemaId, Schema>,
    pub tables: Arena<TableId, Table>,
    pub fields: Arena<FieldId, Field>,
    pub indexes: Arena<IndexId, Index>,
    pub index_columns: Arena<IndexColumnId, IndexColumn>,
    pub enums: Arena<EnumId, Enum>,
    pub enum_values: Arena<EnumValueId, EnumValue>,
    pub refs: Arena<RefId, Ref>,
    pub endpoints: Arena<EndpointId, Endpoint>,
    pub table_groups: Arena<TableGroupId, TableGroup>,
    pub tags: Arena<TagId, Tag>,
}

impl Model {
    /// Display name of a table for diagnostics: `"schema"."table"`.
    pub fn qualified_table_name(&self, id: TableId) -> String {
        let table = &self.tables[id];
        format!("\"{}\".\"{}\"", self.schemas[table.schema].name, table.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TagId;

    #[test]
    fn test_arena_basics() {
        let mut arena: Arena<TagId, &str> = Arena::new();
        assert!(arena.is_empty());

        arena.insert(TagId(2), "b");
        arena.insert(TagId(1), "a");

        assert_eq!(arena.len(), 2);
        assert!(arena.contains(TagId(1)));
        assert_eq!(arena.get(TagId(3)), None);
        assert_eq!(arena[TagId(2)], "b");
        assert_eq!(arena.ids(), vec![TagId(1), TagId(2)]);

        arena[TagId(1)] = "z";
        assert_eq!(arena.get(TagId(1)), Some(&"z"));
    }

    #[test]
    #[should_panic(expected = "no tagId with id 9")]
    fn test_arena_index_missing() {
        let arena: Arena<TagId, ()> = Arena::new();
        let _ = &arena[TagId(9)];
    }
}
