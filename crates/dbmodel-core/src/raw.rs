//! Raw configuration records, as produced by the DSL parser.
//!
//! These are plain data: nothing here is validated or linked. Field names
//! follow the parser's JSON output (`schemaName`, `tableGroups`,
//! `type_name`, `not_null`, ...).

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A raw record that may name the schema it belongs to.
pub trait SchemaScoped {
    /// Declared schema name, if any.
    fn schema_name(&self) -> Option<&str>;
}

macro_rules! schema_scoped {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SchemaScoped for $ty {
                fn schema_name(&self) -> Option<&str> {
                    self.schema_name.as_deref()
                }
            }
        )*
    };
}

schema_scoped!(RawTable, RawEnum, RawRef, RawTag, RawTableGroup);

/// The complete parser output for one source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDatabase {
    #[serde(default)]
    pub schemas: Vec<RawSchema>,
    #[serde(default)]
    pub tables: Vec<RawTable>,
    #[serde(default)]
    pub enums: Vec<RawEnum>,
    #[serde(default)]
    pub refs: Vec<RawRef>,
    #[serde(default)]
    pub table_groups: Vec<RawTableGroup>,
    #[serde(default)]
    pub tags: Vec<RawTag>,
    #[serde(default)]
    pub project: RawProject,
}

/// Project-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_type: Option<String>,
}

/// An explicitly declared schema with its nested records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub tables: Vec<RawTable>,
    #[serde(default)]
    pub refs: Vec<RawRef>,
    #[serde(default)]
    pub enums: Vec<RawEnum>,
    #[serde(default)]
    pub tags: Vec<RawTag>,
    #[serde(default)]
    pub table_groups: Vec<RawTableGroup>,
    #[serde(default)]
    pub token: Span,
}

/// A table declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_color: Option<String>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub indexes: Vec<RawIndex>,
    /// Tag names attached to the table.
    #[serde(default)]
    pub tags: Vec<RawTagRef>,
    #[serde(default)]
    pub token: Span,
}

/// A column declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: RawFieldType,
    #[serde(default)]
    pub pk: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_null: Option<bool>,
    #[serde(default)]
    pub increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbdefault: Option<RawDefault>,
    #[serde(default)]
    pub token: Span,
}

/// A declared column type. `type_name` is opaque except when it matches an
/// enum name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFieldType {
    pub type_name: String,
    #[serde(
        default,
        rename = "schemaName",
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

/// A column default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDefault {
    /// `number`, `string`, `boolean` or `expression`.
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: serde_json::Value,
}

/// An index declaration inside a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub pk: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub columns: Vec<RawIndexColumn>,
    #[serde(default)]
    pub token: Span,
}

/// One column of an index: a column name, an expression, or a literal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIndexColumn {
    #[serde(rename = "type")]
    pub column_type: String,
    pub value: String,
    #[serde(default)]
    pub token: Span,
}

/// An enum declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnum {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub values: Vec<RawEnumValue>,
    #[serde(default)]
    pub token: Span,
}

/// One value of an enum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEnumValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub token: Span,
}

/// A relationship between two sets of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<RawEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    #[serde(default)]
    pub token: Span,
}

/// Cardinality marker on one side of a ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Relation {
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "*")]
    Many,
}

/// One side of a ref.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub field_names: Vec<String>,
    #[serde(default)]
    pub relation: Relation,
    #[serde(default)]
    pub token: Span,
}

/// A table group declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTableGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub tables: Vec<RawTableGroupMember>,
    #[serde(default)]
    pub token: Span,
}

/// A table named inside a table group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTableGroupMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub token: Span,
}

/// A standalone tag declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub token: Span,
}

/// A tag name attached to a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTagRef {
    pub name: String,
    #[serde(default)]
    pub token: Span,
}

impl RawDatabase {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an explicit schema.
    pub fn with_schema(mut self, schema: RawSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Add a top-level table.
    pub fn with_table(mut self, table: RawTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Add a top-level enum.
    pub fn with_enum(mut self, raw_enum: RawEnum) -> Self {
        self.enums.push(raw_enum);
        self
    }

    /// Add a top-level ref.
    pub fn with_ref(mut self, raw_ref: RawRef) -> Self {
        self.refs.push(raw_ref);
        self
    }

    /// Add a top-level table group.
    pub fn with_table_group(mut self, group: RawTableGroup) -> Self {
        self.table_groups.push(group);
        self
    }

    /// Add a top-level tag.
    pub fn with_tag(mut self, tag: RawTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Set the project name.
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project.name = Some(name.into());
        self
    }
}

impl RawSchema {
    /// Create an empty schema declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add a nested table.
    pub fn with_table(mut self, table: RawTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Add a nested enum.
    pub fn with_enum(mut self, raw_enum: RawEnum) -> Self {
        self.enums.push(raw_enum);
        self
    }
}

impl RawTable {
    /// Create a table with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Route the table to a schema.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    /// Set the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add a field.
    pub fn with_field(mut self, field: RawField) -> Self {
        self.fields.push(field);
        self
    }

    /// Attach a tag by name.
    pub fn with_tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(RawTagRef {
            name: name.into(),
            token: Span::default(),
        });
        self
    }

    /// Set the source token.
    pub fn at(mut self, token: Span) -> Self {
        self.token = token;
        self
    }
}

impl RawField {
    /// Create a field of the given type.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: RawFieldType {
                type_name: type_name.into(),
                schema_name: None,
                args: None,
            },
            ..Default::default()
        }
    }

    /// Qualify the field type with a schema, e.g. `crm.status`.
    pub fn with_type_schema(mut self, schema: impl Into<String>) -> Self {
        self.field_type.schema_name = Some(schema.into());
        self
    }

    /// Mark as primary key.
    pub fn primary_key(mut self) -> Self {
        self.pk = true;
        self
    }
}

impl RawEnum {
    /// Create an enum with the given values.
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|v| RawEnumValue {
                    name: v.into(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Route the enum to a schema.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl RawRef {
    /// Create a ref between two endpoints.
    pub fn new(from: RawEndpoint, to: RawEndpoint) -> Self {
        Self {
            endpoints: vec![from, to],
            ..Default::default()
        }
    }

    /// Route the ref to a schema.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl RawEndpoint {
    /// Create an endpoint over columns of a table.
    pub fn new<I, S>(table_name: impl Into<String>, field_names: I, relation: Relation) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            field_names: field_names.into_iter().map(Into::into).collect(),
            relation,
            token: Span::default(),
        }
    }

    /// Qualify the table with a schema.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl RawTableGroup {
    /// Create a table group over the named tables.
    pub fn new<I, S>(name: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tables: tables
                .into_iter()
                .map(|t| RawTableGroupMember {
                    name: t.into(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Route the group to a schema.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl RawTag {
    /// Create a tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Route the tag to a schema.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bundle_from_parser_json() {
        let raw: RawDatabase = serde_json::from_value(json!({
            "tables": [{
                "name": "users",
                "schemaName": "crm",
                "headerColor": "#fff",
                "fields": [{
                    "name": "status",
                    "type": { "type_name": "status", "schemaName": "crm" },
                    "not_null": true,
                    "dbdefault": { "type": "string", "value": "active" },
                    "token": { "start": 20, "end": 34 }
                }],
                "tags": [{ "name": "pii" }]
            }],
            "refs": [{
                "endpoints": [
                    { "tableName": "a", "fieldNames": ["id"], "relation": "1" },
                    { "tableName": "b", "fieldNames": ["a_id"], "relation": "*" }
                ],
                "onDelete": "cascade"
            }],
            "tableGroups": [{ "name": "core", "tables": [{ "name": "users" }] }],
            "project": { "name": "shop", "database_type": "PostgreSQL" }
        }))
        .unwrap();

        assert_eq!(raw.tables.len(), 1);
        let table = &raw.tables[0];
        assert_eq!(table.schema_name(), Some("crm"));
        assert_eq!(table.header_color.as_deref(), Some("#fff"));
        assert_eq!(table.fields[0].field_type.schema_name.as_deref(), Some("crm"));
        assert_eq!(table.fields[0].not_null, Some(true));
        assert_eq!(table.fields[0].token, Span::new(20, 34));
        assert_eq!(table.tags[0].name, "pii");

        assert_eq!(raw.refs[0].endpoints[1].relation, Relation::Many);
        assert_eq!(raw.refs[0].on_delete.as_deref(), Some("cascade"));
        assert_eq!(raw.table_groups[0].tables[0].name, "users");
        assert_eq!(raw.project.database_type.as_deref(), Some("PostgreSQL"));
        assert!(raw.schemas.is_empty());
    }

    #[test]
    fn test_builders() {
        let raw = RawDatabase::new()
            .with_table(
                RawTable::new("users")
                    .in_schema("crm")
                    .with_field(RawField::new("id", "int").primary_key())
                    .with_tag("pii"),
            )
            .with_enum(RawEnum::new("status", ["active", "banned"]));

        assert!(raw.tables[0].fields[0].pk);
        assert_eq!(raw.tables[0].tags.len(), 1);
        assert_eq!(raw.enums[0].values.len(), 2);
        assert_eq!(raw.enums[0].schema_name(), None);
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let result: Result<RawTable, _> = serde_json::from_value(json!({ "fields": [] }));
        assert!(result.is_err());
    }
}
