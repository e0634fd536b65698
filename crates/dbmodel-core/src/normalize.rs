//! Flat, identifier-indexed view of a model.
//!
//! Each bucket maps an identifier to a record holding the entity's scalar
//! fields, identifier lists for its children and related entities, and the
//! identifier of its owner. Buckets are ordered maps so output is stable.

use crate::ids::{
    DatabaseId, EndpointId, EnumId, EnumValueId, FieldId, IndexColumnId, IndexId, RefId, SchemaId,
    TableGroupId, TableId, TagId,
};
use crate::raw::{RawDefault, RawFieldType, Relation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The normalized model: one bucket per entity kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedModel {
    pub database: BTreeMap<DatabaseId, NormalizedDatabase>,
    pub schemas: BTreeMap<SchemaId, NormalizedSchema>,
    pub refs: BTreeMap<RefId, NormalizedRef>,
    pub enums: BTreeMap<EnumId, NormalizedEnum>,
    pub table_groups: BTreeMap<TableGroupId, NormalizedTableGroup>,
    pub tags: BTreeMap<TagId, NormalizedTag>,
    pub tables: BTreeMap<TableId, NormalizedTable>,
    pub endpoints: BTreeMap<EndpointId, NormalizedEndpoint>,
    pub enum_values: BTreeMap<EnumValueId, NormalizedEnumValue>,
    pub indexes: BTreeMap<IndexId, NormalizedIndex>,
    pub index_columns: BTreeMap<IndexColumnId, NormalizedIndexColumn>,
    pub fields: BTreeMap<FieldId, NormalizedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDatabase {
    pub id: DatabaseId,
    pub has_default_schema: bool,
    pub note: Option<String>,
    pub database_type: Option<String>,
    pub name: Option<String>,
    pub schema_ids: Vec<SchemaId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSchema {
    pub id: SchemaId,
    pub name: String,
    pub note: Option<String>,
    pub alias: Option<String>,
    pub table_ids: Vec<TableId>,
    pub enum_ids: Vec<EnumId>,
    pub table_group_ids: Vec<TableGroupId>,
    pub ref_ids: Vec<RefId>,
    pub tag_ids: Vec<TagId>,
    pub database_id: DatabaseId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTable {
    pub id: TableId,
    pub name: String,
    pub alias: Option<String>,
    pub note: Option<String>,
    pub header_color: Option<String>,
    pub field_ids: Vec<FieldId>,
    pub index_ids: Vec<IndexId>,
    pub tag_ids: Vec<TagId>,
    pub schema_id: SchemaId,
    pub group_id: Option<TableGroupId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedField {
    pub id: FieldId,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: RawFieldType,
    pub pk: bool,
    pub unique: bool,
    #[serde(rename = "not_null")]
    pub not_null: Option<bool>,
    pub increment: bool,
    pub note: Option<String>,
    pub dbdefault: Option<RawDefault>,
    pub endpoint_ids: Vec<EndpointId>,
    pub table_id: TableId,
    pub enum_id: Option<EnumId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedIndex {
    pub id: IndexId,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub index_type: Option<String>,
    pub unique: bool,
    pub pk: bool,
    pub note: Option<String>,
    pub column_ids: Vec<IndexColumnId>,
    pub table_id: TableId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedIndexColumn {
    pub id: IndexColumnId,
    #[serde(rename = "type")]
    pub column_type: String,
    pub value: String,
    pub index_id: IndexId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEnum {
    pub id: EnumId,
    pub name: String,
    pub note: Option<String>,
    pub value_ids: Vec<EnumValueId>,
    pub field_ids: Vec<FieldId>,
    pub schema_id: SchemaId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEnumValue {
    pub id: EnumValueId,
    pub name: String,
    pub note: Option<String>,
    pub enum_id: EnumId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRef {
    pub id: RefId,
    pub name: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
    pub endpoint_ids: Vec<EndpointId>,
    pub schema_id: SchemaId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEndpoint {
    pub id: EndpointId,
    pub schema_name: Option<String>,
    pub table_name: String,
    pub field_names: Vec<String>,
    pub relation: Relation,
    pub ref_id: RefId,
    pub table_id: TableId,
    pub field_ids: Vec<FieldId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTableGroup {
    pub id: TableGroupId,
    pub name: String,
    pub note: Option<String>,
    pub table_ids: Vec<TableId>,
    pub schema_id: SchemaId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTag {
    pub id: TagId,
    pub name: String,
    pub note: Option<String>,
    pub color: Option<String>,
    pub table_ids: Vec<TableId>,
    pub schema_id: SchemaId,
}

impl NormalizedModel {
    /// Total number of records across all buckets.
    pub fn record_count(&self) -> usize {
        self.database.len()
            + self.schemas.len()
            + self.refs.len()
            + self.enums.len()
            + self.table_groups.len()
            + self.tags.len()
            + self.tables.len()
            + self.endpoints.len()
            + self.enum_values.len()
            + self.indexes.len()
            + self.index_columns.len()
            + self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_names() {
        let value = serde_json::to_value(NormalizedModel::default()).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        keys.sort();

        assert_eq!(
            keys,
            vec![
                "database",
                "endpoints",
                "enumValues",
                "enums",
                "fields",
                "indexColumns",
                "indexes",
                "refs",
                "schemas",
                "tableGroups",
                "tables",
                "tags",
            ]
        );
    }
}
