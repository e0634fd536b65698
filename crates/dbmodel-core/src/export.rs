//! Nested export view.
//!
//! `Database::export` produces a [`DatabaseExport`] tree that mirrors the
//! declaration structure and serializes directly to JSON. Every export
//! record converts back into the raw record it was built from, which is what
//! rebuilding a model from an export goes through.

use crate::raw::{
    RawDatabase, RawDefault, RawEndpoint, RawEnum, RawEnumValue, RawFieldType, RawField, RawIndex,
    RawIndexColumn, RawProject, RawRef, RawSchema, RawTable, RawTableGroup, RawTableGroupMember,
    RawTag, RawTagRef, Relation,
};
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Scalar fields of the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseShallowExport {
    pub has_default_schema: bool,
    pub note: Option<String>,
    pub database_type: Option<String>,
    pub name: Option<String>,
}

/// The whole model as a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseExport {
    pub has_default_schema: bool,
    pub note: Option<String>,
    pub database_type: Option<String>,
    pub name: Option<String>,
    pub schemas: Vec<SchemaExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaExport {
    pub name: String,
    pub note: Option<String>,
    pub alias: Option<String>,
    pub tables: Vec<TableExport>,
    pub enums: Vec<EnumExport>,
    pub table_groups: Vec<TableGroupExport>,
    pub refs: Vec<RefExport>,
    pub tags: Vec<TagExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableExport {
    pub name: String,
    pub alias: Option<String>,
    pub note: Option<String>,
    pub header_color: Option<String>,
    pub fields: Vec<FieldExport>,
    pub indexes: Vec<IndexExport>,
    /// Names of the tags bound to the table.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExport {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: RawFieldType,
    pub pk: bool,
    pub unique: bool,
    pub not_null: Option<bool>,
    pub increment: bool,
    pub note: Option<String>,
    pub dbdefault: Option<RawDefault>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexExport {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub index_type: Option<String>,
    pub unique: bool,
    pub pk: bool,
    pub note: Option<String>,
    pub columns: Vec<IndexColumnExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumnExport {
    #[serde(rename = "type")]
    pub column_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumExport {
    pub name: String,
    pub note: Option<String>,
    pub values: Vec<EnumValueExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueExport {
    pub name: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefExport {
    pub name: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
    pub endpoints: Vec<EndpointExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointExport {
    /// Schema name as declared on the endpoint.
    pub schema_name: Option<String>,
    pub table_name: String,
    pub field_names: Vec<String>,
    pub relation: Relation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGroupExport {
    pub name: String,
    pub note: Option<String>,
    pub tables: Vec<TableGroupMemberExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableGroupMemberExport {
    pub table_name: String,
    /// Name of the schema the member table resolved into.
    pub schema_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagExport {
    pub name: String,
    pub note: Option<String>,
    pub color: Option<String>,
}

impl From<DatabaseExport> for RawDatabase {
    /// Every schema becomes an explicit schema declaration holding its own
    /// records, so rebuilding does not depend on routing.
    fn from(export: DatabaseExport) -> Self {
        RawDatabase {
            schemas: export.schemas.into_iter().map(RawSchema::from).collect(),
            project: RawProject {
                name: export.name,
                note: export.note,
                database_type: export.database_type,
            },
            ..Default::default()
        }
    }
}

impl From<SchemaExport> for RawSchema {
    fn from(export: SchemaExport) -> Self {
        RawSchema {
            name: export.name,
            alias: export.alias,
            note: export.note,
            tables: export.tables.into_iter().map(RawTable::from).collect(),
            refs: export.refs.into_iter().map(RawRef::from).collect(),
            enums: export.enums.into_iter().map(RawEnum::from).collect(),
            tags: export.tags.into_iter().map(RawTag::from).collect(),
            table_groups: export
                .table_groups
                .into_iter()
                .map(RawTableGroup::from)
                .collect(),
            token: Span::default(),
        }
    }
}

impl From<TableExport> for RawTable {
    fn from(export: TableExport) -> Self {
        RawTable {
            name: export.name,
            schema_name: None,
            alias: export.alias,
            note: export.note,
            header_color: export.header_color,
            fields: export.fields.into_iter().map(RawField::from).collect(),
            indexes: export.indexes.into_iter().map(RawIndex::from).collect(),
            tags: export
                .tags
                .into_iter()
                .map(|name| RawTagRef {
                    name,
                    token: Span::default(),
                })
                .collect(),
            token: Span::default(),
        }
    }
}

impl From<FieldExport> for RawField {
    fn from(export: FieldExport) -> Self {
        RawField {
            name: export.name,
            field_type: export.field_type,
            pk: export.pk,
            unique: export.unique,
            not_null: export.not_null,
            increment: export.increment,
            note: export.note,
            dbdefault: export.dbdefault,
            token: Span::default(),
        }
    }
}

impl From<IndexExport> for RawIndex {
    fn from(export: IndexExport) -> Self {
        RawIndex {
            name: export.name,
            index_type: export.index_type,
            unique: export.unique,
            pk: export.pk,
            note: export.note,
            columns: export
                .columns
                .into_iter()
                .map(|c| RawIndexColumn {
                    column_type: c.column_type,
                    value: c.value,
                    token: Span::default(),
                })
                .collect(),
            token: Span::default(),
        }
    }
}

impl From<EnumExport> for RawEnum {
    fn from(export: EnumExport) -> Self {
        RawEnum {
            name: export.name,
            schema_name: None,
            note: export.note,
            values: export
                .values
                .into_iter()
                .map(|v| RawEnumValue {
                    name: v.name,
                    note: v.note,
                    token: Span::default(),
                })
                .collect(),
            token: Span::default(),
        }
    }
}

impl From<RefExport> for RawRef {
    fn from(export: RefExport) -> Self {
        RawRef {
            name: export.name,
            schema_name: None,
            endpoints: export
                .endpoints
                .into_iter()
                .map(|e| RawEndpoint {
                    schema_name: e.schema_name,
                    table_name: e.table_name,
                    field_names: e.field_names,
                    relation: e.relation,
                    token: Span::default(),
                })
                .collect(),
            on_delete: export.on_delete,
            on_update: export.on_update,
            token: Span::default(),
        }
    }
}

impl From<TableGroupExport> for RawTableGroup {
    fn from(export: TableGroupExport) -> Self {
        RawTableGroup {
            name: export.name,
            schema_name: None,
            note: export.note,
            tables: export
                .tables
                .into_iter()
                .map(|m| RawTableGroupMember {
                    name: m.table_name,
                    schema_name: Some(m.schema_name),
                    token: Span::default(),
                })
                .collect(),
            token: Span::default(),
        }
    }
}

impl From<TagExport> for RawTag {
    fn from(export: TagExport) -> Self {
        RawTag {
            name: export.name,
            schema_name: None,
            note: export.note,
            color: export.color,
            token: Span::default(),
        }
    }
}
