//! Tables and their fields and indexes.

use crate::allocator::IdAllocator;
use crate::element::{impl_element, Element};
use crate::error::{Result, SemanticErrorKind};
use crate::export::{FieldExport, IndexColumnExport, IndexExport, TableExport};
use crate::ids::{
    EndpointId, EnumId, FieldId, IndexColumnId, IndexId, SchemaId, TableGroupId, TableId, TagId,
};
use crate::model::Model;
use crate::normalize::{
    NormalizedField, NormalizedIndex, NormalizedIndexColumn, NormalizedModel, NormalizedTable,
};
use crate::raw::{RawDefault, RawField, RawFieldType, RawIndex, RawTable, RawTagRef};
use crate::span::Span;

/// A table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub id: TableId,
    pub token: Span,
    pub name: String,
    pub alias: Option<String>,
    pub note: Option<String>,
    pub header_color: Option<String>,
    /// Owning schema.
    pub schema: SchemaId,
    pub fields: Vec<FieldId>,
    pub indexes: Vec<IndexId>,
    /// Tags bound to this table.
    pub tags: Vec<TagId>,
    /// Tag names as declared, resolved by tag binding.
    pub raw_tags: Vec<RawTagRef>,
    /// The table group this table belongs to, if any.
    pub group: Option<TableGroupId>,
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: FieldId,
    pub token: Span,
    pub name: String,
    pub field_type: RawFieldType,
    pub pk: bool,
    pub unique: bool,
    pub not_null: Option<bool>,
    pub increment: bool,
    pub note: Option<String>,
    pub dbdefault: Option<RawDefault>,
    /// Owning table.
    pub table: TableId,
    /// The enum backing this field's type, once bound.
    pub enum_id: Option<EnumId>,
    /// Ref endpoints that include this field.
    pub endpoints: Vec<EndpointId>,
}

/// An index over columns of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub id: IndexId,
    pub token: Span,
    pub name: Option<String>,
    pub index_type: Option<String>,
    pub unique: bool,
    pub pk: bool,
    pub note: Option<String>,
    pub columns: Vec<IndexColumnId>,
    pub table: TableId,
}

/// One column of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub id: IndexColumnId,
    pub token: Span,
    /// `column`, `expression` or `string`.
    pub column_type: String,
    pub value: String,
    pub index: IndexId,
}

impl_element!(Table, TableId);
impl_element!(Field, FieldId);
impl_element!(Index, IndexId);
impl_element!(IndexColumn, IndexColumnId);

/// A constructed table together with the children it owns, not yet
/// inserted into a schema.
#[derive(Debug, Clone)]
pub(crate) struct TableDraft {
    pub table: Table,
    pub fields: Vec<Field>,
    pub indexes: Vec<Index>,
    pub index_columns: Vec<IndexColumn>,
}

impl Table {
    /// Construct a table and its fields and indexes from a raw record.
    ///
    /// Field names must be unique within the table.
    pub(crate) fn build(
        raw: RawTable,
        schema: SchemaId,
        ids: &mut IdAllocator,
    ) -> Result<TableDraft> {
        let id: TableId = ids.next_id()?;

        let mut fields: Vec<Field> = Vec::with_capacity(raw.fields.len());
        for raw_field in raw.fields {
            let field = Field::new(raw_field, id, ids)?;
            if fields.iter().any(|f| f.name == field.name) {
                return Err(field.error(
                    SemanticErrorKind::DuplicateFieldName,
                    format!("field \"{}\" already exists in table \"{}\"", field.name, raw.name),
                ));
            }
            fields.push(field);
        }

        let mut indexes = Vec::with_capacity(raw.indexes.len());
        let mut index_columns = Vec::new();
        for raw_index in raw.indexes {
            let (index, columns) = Index::new(raw_index, id, ids)?;
            indexes.push(index);
            index_columns.extend(columns);
        }

        let table = Table {
            id,
            token: raw.token,
            name: raw.name,
            alias: raw.alias,
            note: raw.note,
            header_color: raw.header_color,
            schema,
            fields: fields.iter().map(|f| f.id).collect(),
            indexes: indexes.iter().map(|i| i.id).collect(),
            tags: Vec::new(),
            raw_tags: raw.tags,
            group: None,
        };

        Ok(TableDraft {
            table,
            fields,
            indexes,
            index_columns,
        })
    }

    /// Whether `name` refers to this table, by name or alias.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name || self.alias.as_deref() == Some(name)
    }

    /// Find a field of this table by name.
    pub fn find_field<'m>(&self, model: &'m Model, name: &str) -> Option<&'m Field> {
        self.fields
            .iter()
            .map(|id| &model.fields[*id])
            .find(|f| f.name == name)
    }

    pub(crate) fn push_tag(&mut self, tag: TagId) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Export the table as a nested record.
    pub fn export(&self, model: &Model) -> TableExport {
        TableExport {
            name: self.name.clone(),
            alias: self.alias.clone(),
            note: self.note.clone(),
            header_color: self.header_color.clone(),
            fields: self.fields.iter().map(|id| model.fields[*id].export()).collect(),
            indexes: self
                .indexes
                .iter()
                .map(|id| model.indexes[*id].export(model))
                .collect(),
            tags: self
                .tags
                .iter()
                .map(|id| model.tags[*id].name.clone())
                .collect(),
        }
    }

    /// Insert this table and its fields and indexes into the flat model.
    pub fn normalize(&self, model: &Model, out: &mut NormalizedModel) {
        out.tables.insert(
            self.id,
            NormalizedTable {
                id: self.id,
                name: self.name.clone(),
                alias: self.alias.clone(),
                note: self.note.clone(),
                header_color: self.header_color.clone(),
                field_ids: self.fields.clone(),
                index_ids: self.indexes.clone(),
                tag_ids: self.tags.clone(),
                schema_id: self.schema,
                group_id: self.group,
            },
        );

        for id in &self.fields {
            model.fields[*id].normalize(out);
        }
        for id in &self.indexes {
            model.indexes[*id].normalize(model, out);
        }
    }
}

impl Field {
    fn new(raw: RawField, table: TableId, ids: &mut IdAllocator) -> Result<Self> {
        Ok(Field {
            id: ids.next_id()?,
            token: raw.token,
            name: raw.name,
            field_type: raw.field_type,
            pk: raw.pk,
            unique: raw.unique,
            not_null: raw.not_null,
            increment: raw.increment,
            note: raw.note,
            dbdefault: raw.dbdefault,
            table,
            enum_id: None,
            endpoints: Vec::new(),
        })
    }

    /// Schema the field's type refers to, falling back to `default_schema`.
    pub fn type_schema_name<'a>(&'a self, default_schema: &'a str) -> &'a str {
        self.field_type
            .schema_name
            .as_deref()
            .unwrap_or(default_schema)
    }

    /// Export the field as a nested record.
    pub fn export(&self) -> FieldExport {
        FieldExport {
            name: self.name.clone(),
            field_type: self.field_type.clone(),
            pk: self.pk,
            unique: self.unique,
            not_null: self.not_null,
            increment: self.increment,
            note: self.note.clone(),
            dbdefault: self.dbdefault.clone(),
        }
    }

    /// Insert this field into the flat model.
    pub fn normalize(&self, out: &mut NormalizedModel) {
        out.fields.insert(
            self.id,
            NormalizedField {
                id: self.id,
                name: self.name.clone(),
                field_type: self.field_type.clone(),
                pk: self.pk,
                unique: self.unique,
                not_null: self.not_null,
                increment: self.increment,
                note: self.note.clone(),
                dbdefault: self.dbdefault.clone(),
                endpoint_ids: self.endpoints.clone(),
                table_id: self.table,
                enum_id: self.enum_id,
            },
        );
    }
}

impl Index {
    fn new(
        raw: RawIndex,
        table: TableId,
        ids: &mut IdAllocator,
    ) -> Result<(Self, Vec<IndexColumn>)> {
        let id: IndexId = ids.next_id()?;
        let columns = raw
            .columns
            .into_iter()
            .map(|c| {
                Ok(IndexColumn {
                    id: ids.next_id()?,
                    token: c.token,
                    column_type: c.column_type,
                    value: c.value,
                    index: id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let index = Index {
            id,
            token: raw.token,
            name: raw.name,
            index_type: raw.index_type,
            unique: raw.unique,
            pk: raw.pk,
            note: raw.note,
            columns: columns.iter().map(|c| c.id).collect(),
            table,
        };
        Ok((index, columns))
    }

    /// Export the index as a nested record.
    pub fn export(&self, model: &Model) -> IndexExport {
        IndexExport {
            name: self.name.clone(),
            index_type: self.index_type.clone(),
            unique: self.unique,
            pk: self.pk,
            note: self.note.clone(),
            columns: self
                .columns
                .iter()
                .map(|id| {
                    let column = &model.index_columns[*id];
                    IndexColumnExport {
                        column_type: column.column_type.clone(),
                        value: column.value.clone(),
                    }
                })
                .collect(),
        }
    }

    /// Insert this index and its columns into the flat model.
    pub fn normalize(&self, model: &Model, out: &mut NormalizedModel) {
        out.indexes.insert(
            self.id,
            NormalizedIndex {
                id: self.id,
                name: self.name.clone(),
                index_type: self.index_type.clone(),
                unique: self.unique,
                pk: self.pk,
                note: self.note.clone(),
                column_ids: self.columns.clone(),
                table_id: self.table,
            },
        );

        for id in &self.columns {
            let column = &model.index_columns[*id];
            out.index_columns.insert(
                column.id,
                NormalizedIndexColumn {
                    id: column.id,
                    column_type: column.column_type.clone(),
                    value: column.value.clone(),
                    index_id: self.id,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawIndexColumn;

    fn users() -> RawTable {
        let mut raw = RawTable::new("users")
            .with_alias("U")
            .with_field(RawField::new("id", "int").primary_key())
            .with_field(RawField::new("email", "varchar"))
            .with_tag("pii");
        raw.indexes.push(RawIndex {
            unique: true,
            columns: vec![RawIndexColumn {
                column_type: "column".into(),
                value: "email".into(),
                token: Span::default(),
            }],
            ..Default::default()
        });
        raw
    }

    #[test]
    fn test_build_allocates_ids_in_order() {
        let mut ids = IdAllocator::default();
        let draft = Table::build(users(), SchemaId(1), &mut ids).unwrap();

        assert_eq!(draft.table.id, TableId(1));
        assert_eq!(draft.table.fields, vec![FieldId(1), FieldId(2)]);
        assert_eq!(draft.table.indexes, vec![IndexId(1)]);
        assert_eq!(draft.index_columns[0].index, IndexId(1));
        assert_eq!(draft.fields[1].table, TableId(1));
        assert_eq!(draft.table.raw_tags[0].name, "pii");
        assert!(draft.table.tags.is_empty());
    }

    #[test]
    fn test_duplicate_field() {
        let raw = RawTable::new("users")
            .with_field(RawField::new("id", "int"))
            .with_field(RawField::new("id", "uuid"));

        let err = Table::build(raw, SchemaId(1), &mut IdAllocator::default()).unwrap_err();
        assert_eq!(err.kind, SemanticErrorKind::DuplicateFieldName);
        assert!(err.message.contains("\"id\""));
    }

    #[test]
    fn test_is_named_by_alias() {
        let draft = Table::build(users(), SchemaId(1), &mut IdAllocator::default()).unwrap();
        assert!(draft.table.is_named("users"));
        assert!(draft.table.is_named("U"));
        assert!(!draft.table.is_named("u"));
    }

    #[test]
    fn test_type_schema_defaults() {
        let mut ids = IdAllocator::default();
        let plain = Field::new(RawField::new("s", "status"), TableId(1), &mut ids).unwrap();
        let qualified = Field::new(
            RawField::new("s", "status").with_type_schema("crm"),
            TableId(1),
            &mut ids,
        )
        .unwrap();

        assert_eq!(plain.type_schema_name("public"), "public");
        assert_eq!(qualified.type_schema_name("public"), "crm");
    }
}
