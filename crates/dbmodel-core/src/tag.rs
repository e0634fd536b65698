//! Tags attached to tables.

use crate::allocator::IdAllocator;
use crate::element::impl_element;
use crate::error::Result;
use crate::export::TagExport;
use crate::ids::{SchemaId, TableId, TagId};
use crate::normalize::{NormalizedModel, NormalizedTag};
use crate::raw::{RawTag, RawTagRef};
use crate::span::Span;

/// A named tag. Tables reference tags by name; tag binding resolves those
/// names to tags of the table's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub token: Span,
    pub name: String,
    pub note: Option<String>,
    pub color: Option<String>,
    /// Owning schema.
    pub schema: SchemaId,
    /// Tables carrying this tag.
    pub tables: Vec<TableId>,
}

impl_element!(Tag, TagId);

impl Tag {
    pub(crate) fn new(raw: RawTag, schema: SchemaId, ids: &mut IdAllocator) -> Result<Self> {
        Ok(Tag {
            id: ids.next_id()?,
            token: raw.token,
            name: raw.name,
            note: raw.note,
            color: raw.color,
            schema,
            tables: Vec::new(),
        })
    }

    /// Create a tag from a name declared on a table.
    pub(crate) fn from_table_ref(
        raw: &RawTagRef,
        schema: SchemaId,
        ids: &mut IdAllocator,
    ) -> Result<Self> {
        Ok(Tag {
            id: ids.next_id()?,
            token: raw.token,
            name: raw.name.clone(),
            note: None,
            color: None,
            schema,
            tables: Vec::new(),
        })
    }

    pub(crate) fn push_table(&mut self, table: TableId) {
        if !self.tables.contains(&table) {
            self.tables.push(table);
        }
    }

    /// Export the tag as a nested record.
    pub fn export(&self) -> TagExport {
        TagExport {
            name: self.name.clone(),
            note: self.note.clone(),
            color: self.color.clone(),
        }
    }

    /// Insert this tag into the flat model.
    pub fn normalize(&self, out: &mut NormalizedModel) {
        out.tags.insert(
            self.id,
            NormalizedTag {
                id: self.id,
                name: self.name.clone(),
                note: self.note.clone(),
                color: self.color.clone(),
                table_ids: self.tables.clone(),
                schema_id: self.schema,
            },
        );
    }
}
