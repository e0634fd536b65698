//! The root aggregate.
//!
//! A [`Database`] is built once from a [`RawDatabase`] bundle and is
//! read-only afterwards. Construction runs a fixed pipeline:
//!
//! 1. explicit schemas, each with its nested records
//! 2. top-level tables
//! 3. top-level tags, followed by tag binding
//! 4. top-level refs
//! 5. top-level enums
//! 6. top-level table groups
//!
//! Later phases look up entities created by earlier ones, so the order is
//! fixed. Top-level records are routed to the schema they name, or to the
//! default schema, and schemas are created on first mention.

use crate::allocator::IdAllocator;
use crate::config::{EnumBindingPolicy, ModelConfig};
use crate::element::impl_element;
use crate::error::{Error, Result, SemanticError};
use crate::export::{DatabaseExport, DatabaseShallowExport, SchemaExport};
use crate::ids::{DatabaseId, EnumId, FieldId, SchemaId, TableId};
use crate::model::Model;
use crate::normalize::{NormalizedDatabase, NormalizedModel};
use crate::raw::{
    RawDatabase, RawEnum, RawRef, RawSchema, RawTable, RawTableGroup, RawTag, SchemaScoped,
};
use crate::schema::{Schema, SchemaScope};
use crate::span::Span;
use crate::tag::Tag;
use tracing::{debug, info, instrument};

/// A fully constructed, validated and linked model.
#[derive(Debug, Clone)]
pub struct Database {
    id: DatabaseId,
    token: Span,
    name: Option<String>,
    note: Option<String>,
    database_type: Option<String>,
    has_default_schema: bool,
    schemas: Vec<SchemaId>,
    pub(crate) model: Model,
    pub(crate) ids: IdAllocator,
    pub(crate) config: ModelConfig,
}

impl_element!(Database, DatabaseId);

impl Database {
    /// Build a database with the default configuration.
    pub fn new(raw: RawDatabase) -> Result<Self> {
        Self::with_config(raw, ModelConfig::default())
    }

    /// Build a database.
    ///
    /// The first semantic violation aborts construction and is returned.
    #[instrument(
        skip_all,
        fields(
            schemas = raw.schemas.len(),
            tables = raw.tables.len(),
            refs = raw.refs.len()
        )
    )]
    pub fn with_config(raw: RawDatabase, config: ModelConfig) -> Result<Self> {
        let mut ids = IdAllocator::new(config.id_base);
        let id = ids.next_id()?;

        let RawDatabase {
            schemas,
            tables,
            enums,
            refs,
            table_groups,
            tags,
            project,
        } = raw;

        let mut db = Database {
            id,
            token: Span::default(),
            name: project.name,
            note: project.note,
            database_type: project.database_type,
            has_default_schema: false,
            schemas: Vec::new(),
            model: Model::default(),
            ids,
            config,
        };

        db.process_schemas(schemas)?;
        db.process_tables(tables)?;
        db.process_tags(tags)?;
        db.process_refs(refs)?;
        db.process_enums(enums)?;
        db.process_table_groups(table_groups)?;

        if db.config.enum_binding == EnumBindingPolicy::AfterConstruction {
            db.resolve_enum_bindings();
        }

        info!(
            schemas = db.schemas.len(),
            tables = db.model.tables.len(),
            enums = db.model.enums.len(),
            refs = db.model.refs.len(),
            tags = db.model.tags.len(),
            "Model constructed"
        );
        Ok(db)
    }

    /// Decode a JSON bundle and build a database with the default
    /// configuration.
    pub fn from_json(json: &str) -> std::result::Result<Self, Error> {
        Self::from_json_with_config(json, ModelConfig::default())
    }

    /// Decode a JSON bundle and build a database.
    pub fn from_json_with_config(
        json: &str,
        config: ModelConfig,
    ) -> std::result::Result<Self, Error> {
        let raw: RawDatabase = serde_json::from_str(json)?;
        Ok(Self::with_config(raw, config)?)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn database_type(&self) -> Option<&str> {
        self.database_type.as_deref()
    }

    /// Whether any record resolved into the default schema, either by
    /// routing or as a child of an explicit schema with the default name.
    pub fn has_default_schema(&self) -> bool {
        self.has_default_schema
    }

    /// Schemas in creation order.
    pub fn schemas(&self) -> &[SchemaId] {
        &self.schemas
    }

    /// Get a schema by identifier.
    pub fn schema(&self, id: SchemaId) -> &Schema {
        &self.model.schemas[id]
    }

    /// All entities of the database.
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Find a schema by name or alias. Never creates one.
    pub fn find_schema(&self, name: &str) -> Option<SchemaId> {
        self.schemas
            .iter()
            .copied()
            .find(|id| self.model.schemas[*id].is_named(name))
    }

    /// Find a table in the named schema, or in the default schema when no
    /// name is given.
    ///
    /// Unlike routing, this never creates a schema: an unknown schema is
    /// an error, an unknown table is `Ok(None)`.
    pub fn find_table(
        &self,
        schema_name: Option<&str>,
        table_name: &str,
    ) -> Result<Option<TableId>> {
        let name = schema_name.unwrap_or(&self.config.default_schema_name);
        let schema = self
            .find_schema(name)
            .ok_or_else(|| SemanticError::schema_not_found(name, self.token))?;
        Ok(self.model.schemas[schema].find_table(&self.model, table_name))
    }

    /// Whether diagnostics about entities of `schema` should name it.
    pub(crate) fn should_qualify(&self, schema: &Schema) -> bool {
        schema.name != self.config.default_schema_name || self.has_default_schema
    }

    /// Append a schema unless one with the same name or alias exists.
    pub(crate) fn push_schema(&mut self, schema: Schema) -> Result<SchemaId> {
        let model = &self.model;
        if self
            .schemas
            .iter()
            .any(|id| model.schemas[*id].check_same_id(&schema))
        {
            return Err(SemanticError::duplicate_schema(&schema.name, schema.token));
        }

        let id = schema.id;
        self.model.schemas.insert(id, schema);
        self.schemas.push(id);
        Ok(id)
    }

    /// Look up a schema, creating it when absent.
    ///
    /// Resolving to the default schema, by its name or its alias, marks the
    /// database as having a default schema.
    pub(crate) fn get_or_create_schema(&mut self, name: &str) -> Result<SchemaId> {
        if let Some(id) = self.find_schema(name) {
            if self.model.schemas[id].name == self.config.default_schema_name {
                self.has_default_schema = true;
            }
            return Ok(id);
        }

        let is_default = name == self.config.default_schema_name;
        if is_default {
            self.has_default_schema = true;
        }
        let note = is_default.then(|| self.config.default_schema_note());
        let schema = Schema::new(self.ids.next_id()?, name, None, note, Span::default(), self.id);
        let id = self.push_schema(schema)?;
        debug!(schema = name, id = %id, "Schema created on first reference");
        Ok(id)
    }

    /// The schema a top-level record belongs to.
    fn resolve_schema<R: SchemaScoped>(&mut self, raw: &R) -> Result<SchemaId> {
        let name = raw
            .schema_name()
            .unwrap_or(&self.config.default_schema_name)
            .to_string();
        self.get_or_create_schema(&name)
    }

    fn process_schemas(&mut self, raws: Vec<RawSchema>) -> Result<()> {
        for raw in raws {
            let schema = Schema::new(
                self.ids.next_id()?,
                raw.name.clone(),
                raw.alias.clone(),
                raw.note.clone(),
                raw.token,
                self.id,
            );
            let id = self.push_schema(schema)?;
            SchemaScope::new(self, id).process(raw)?;

            let schema = &self.model.schemas[id];
            if schema.name == self.config.default_schema_name && !schema.is_empty() {
                self.has_default_schema = true;
            }
        }
        Ok(())
    }

    fn process_tables(&mut self, raws: Vec<RawTable>) -> Result<()> {
        for raw in raws {
            let schema = self.resolve_schema(&raw)?;
            SchemaScope::new(self, schema).push_raw_table(raw)?;
        }
        Ok(())
    }

    fn process_tags(&mut self, raws: Vec<RawTag>) -> Result<()> {
        for raw in raws {
            let schema = self.resolve_schema(&raw)?;
            let tag = Tag::new(raw, schema, &mut self.ids)?;
            SchemaScope::new(self, schema).push_tag(tag)?;
        }
        self.bind_tag_to_table()
    }

    fn process_refs(&mut self, raws: Vec<RawRef>) -> Result<()> {
        for raw in raws {
            let schema = self.resolve_schema(&raw)?;
            SchemaScope::new(self, schema).push_raw_ref(raw)?;
        }
        Ok(())
    }

    fn process_enums(&mut self, raws: Vec<RawEnum>) -> Result<()> {
        for raw in raws {
            let schema = self.resolve_schema(&raw)?;
            SchemaScope::new(self, schema).push_raw_enum(raw)?;
        }
        Ok(())
    }

    fn process_table_groups(&mut self, raws: Vec<RawTableGroup>) -> Result<()> {
        for raw in raws {
            let schema = self.resolve_schema(&raw)?;
            SchemaScope::new(self, schema).push_raw_table_group(raw)?;
        }
        Ok(())
    }

    /// Link every table to the tags it declares, creating tags that its
    /// schema does not define yet.
    fn bind_tag_to_table(&mut self) -> Result<()> {
        for schema in self.schemas.clone() {
            for table in self.model.schemas[schema].tables.clone() {
                for raw_tag in self.model.tables[table].raw_tags.clone() {
                    let existing = self.model.schemas[schema].find_tag(&self.model, &raw_tag.name);
                    let tag = match existing {
                        Some(tag) => tag,
                        None => {
                            let tag = Tag::from_table_ref(&raw_tag, schema, &mut self.ids)?;
                            debug!(
                                schema = %self.model.schemas[schema].name,
                                tag = %raw_tag.name,
                                "Tag created from table declaration"
                            );
                            SchemaScope::new(self, schema).push_tag(tag)?
                        }
                    };
                    self.model.tables[table].push_tag(tag);
                    self.model.tags[tag].push_table(table);
                }
            }
        }
        Ok(())
    }

    /// Link an enum to every field, in any schema, whose type names it.
    ///
    /// Only fields that exist when this runs are considered. Returns the
    /// number of fields linked.
    pub(crate) fn bind_enum_to_field(&mut self, enum_id: EnumId) -> usize {
        let model = &self.model;
        let enum_def = &model.enums[enum_id];
        let enum_schema = &model.schemas[enum_def.schema].name;
        let default_schema = &self.config.default_schema_name;

        let matches: Vec<FieldId> = self
            .schemas
            .iter()
            .flat_map(|schema| model.schemas[*schema].tables.iter())
            .flat_map(|table| model.tables[*table].fields.iter())
            .map(|field| &model.fields[*field])
            .filter(|field| {
                field.field_type.type_name == enum_def.name
                    && field.type_schema_name(default_schema) == enum_schema
            })
            .map(|field| field.id)
            .collect();

        for field in &matches {
            self.model.fields[*field].enum_id = Some(enum_id);
            self.model.enums[enum_id].push_field(*field);
        }

        if !matches.is_empty() {
            debug!(
                enum_name = %self.model.enums[enum_id].name,
                fields = matches.len(),
                "Enum bound to fields"
            );
        }
        matches.len()
    }

    /// Bind every enum, in creation order, against the complete model.
    pub(crate) fn resolve_enum_bindings(&mut self) {
        for id in self.model.enums.ids() {
            self.bind_enum_to_field(id);
        }
    }

    /// Export the whole model as a tree.
    pub fn export(&self) -> DatabaseExport {
        let shallow = self.shallow_export();
        DatabaseExport {
            has_default_schema: shallow.has_default_schema,
            note: shallow.note,
            database_type: shallow.database_type,
            name: shallow.name,
            schemas: self.export_child(),
        }
    }

    /// Scalar fields of the database.
    pub fn shallow_export(&self) -> DatabaseShallowExport {
        DatabaseShallowExport {
            has_default_schema: self.has_default_schema,
            note: self.note.clone(),
            database_type: self.database_type.clone(),
            name: self.name.clone(),
        }
    }

    /// Exported schemas, in creation order.
    pub fn export_child(&self) -> Vec<SchemaExport> {
        self.schemas
            .iter()
            .map(|id| self.model.schemas[*id].export(&self.model))
            .collect()
    }

    pub fn export_child_ids(&self) -> Vec<SchemaId> {
        self.schemas.clone()
    }

    /// Flatten the model into identifier-keyed buckets.
    pub fn normalize(&self) -> NormalizedModel {
        let shallow = self.shallow_export();
        let mut out = NormalizedModel::default();
        out.database.insert(
            self.id,
            NormalizedDatabase {
                id: self.id,
                has_default_schema: shallow.has_default_schema,
                note: shallow.note,
                database_type: shallow.database_type,
                name: shallow.name,
                schema_ids: self.export_child_ids(),
            },
        );

        for id in &self.schemas {
            self.model.schemas[*id].normalize(&self.model, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::error::SemanticErrorKind;
    use crate::raw::RawField;

    #[test]
    fn test_empty_bundle() {
        let db = Database::new(RawDatabase::new()).unwrap();

        assert_eq!(db.id(), DatabaseId(1));
        assert!(db.schemas().is_empty());
        assert!(!db.has_default_schema());
        assert_eq!(db.normalize().record_count(), 1);
    }

    #[test]
    fn test_get_or_create_schema() {
        let mut db = Database::new(RawDatabase::new()).unwrap();

        let crm = db.get_or_create_schema("crm").unwrap();
        assert!(!db.has_default_schema());
        assert_eq!(db.schema(crm).note, None);
        assert_eq!(db.get_or_create_schema("crm").unwrap(), crm);

        let public = db.get_or_create_schema("public").unwrap();
        assert!(db.has_default_schema());
        assert_eq!(db.schema(public).note.as_deref(), Some("Default Public Schema"));
        assert_eq!(db.schemas(), &[crm, public]);
    }

    #[test]
    fn test_get_or_create_schema_by_default_alias() {
        let raw = RawDatabase::new().with_schema(RawSchema::new("public").with_alias("p"));
        let mut db = Database::new(raw).unwrap();
        assert!(!db.has_default_schema());

        let public = db.get_or_create_schema("p").unwrap();
        assert_eq!(db.schema(public).name, "public");
        assert!(db.has_default_schema());
    }

    #[test]
    fn test_find_schema_does_not_create() {
        let db = Database::new(RawDatabase::new()).unwrap();
        assert_eq!(db.find_schema("public"), None);
        assert!(db.schemas().is_empty());
    }

    #[test]
    fn test_find_schema_by_alias() {
        let raw = RawDatabase::new().with_schema(RawSchema::new("sales").with_alias("s"));
        let db = Database::new(raw).unwrap();

        assert_eq!(db.find_schema("s"), db.find_schema("sales"));
        assert!(db.find_schema("s").is_some());
    }

    #[test]
    fn test_find_table() {
        let raw = RawDatabase::new().with_table(
            RawTable::new("users")
                .with_alias("U")
                .with_field(RawField::new("id", "int")),
        );
        let db = Database::new(raw).unwrap();

        let users = db.find_table(None, "users").unwrap().unwrap();
        assert_eq!(db.find_table(Some("public"), "U").unwrap(), Some(users));
        assert_eq!(db.find_table(None, "orders").unwrap(), None);

        let err = db.find_table(Some("crm"), "users").unwrap_err();
        assert_eq!(err.kind, SemanticErrorKind::SchemaNotFound);
        assert_eq!(db.find_schema("crm"), None);
    }

    #[test]
    fn test_duplicate_schema_alias() {
        let raw = RawDatabase::new()
            .with_schema(RawSchema::new("sales").with_alias("s"))
            .with_schema(RawSchema::new("s"));

        let err = Database::new(raw).unwrap_err();
        assert_eq!(err.kind, SemanticErrorKind::DuplicateSchemaName);
        assert_eq!(err.message, "schema \"s\" already exists");
    }

    #[test]
    fn test_explicit_default_schema_flagged_once_populated() {
        let raw = RawDatabase::new().with_schema(RawSchema::new("public"));
        let db = Database::new(raw).unwrap();
        assert!(!db.has_default_schema());
        assert_eq!(db.schema(db.schemas()[0]).note, None);

        let raw = RawDatabase::new()
            .with_schema(RawSchema::new("public").with_table(RawTable::new("users")));
        let db = Database::new(raw).unwrap();
        assert!(db.has_default_schema());
    }

    #[test]
    fn test_duplicate_message_qualification() {
        let raw = RawDatabase::new().with_schema(
            RawSchema::new("public")
                .with_table(RawTable::new("users"))
                .with_table(RawTable::new("users")),
        );
        let err = Database::new(raw).unwrap_err();
        assert_eq!(err.message, "table \"users\" already exists");

        let raw = RawDatabase::new()
            .with_table(RawTable::new("users"))
            .with_table(RawTable::new("users"));
        let err = Database::new(raw).unwrap_err();
        assert_eq!(err.message, "table \"public\".\"users\" already exists");
    }

    #[test]
    fn test_id_base() {
        let raw = RawDatabase::new().with_table(RawTable::new("users"));
        let db = Database::with_config(raw, ModelConfig::default().with_id_base(100)).unwrap();

        assert_eq!(db.id(), DatabaseId(100));
        assert_eq!(db.schemas(), &[SchemaId(100)]);
        assert_eq!(db.model().tables.ids(), vec![TableId(100)]);
    }

    #[test]
    fn test_custom_default_schema() {
        let raw = RawDatabase::new().with_table(RawTable::new("users"));
        let config = ModelConfig::default().with_default_schema_name("dbo");
        let db = Database::with_config(raw, config).unwrap();

        let dbo = db.schema(db.schemas()[0]);
        assert_eq!(dbo.name, "dbo");
        assert_eq!(dbo.note.as_deref(), Some("Default Dbo Schema"));
        assert!(db.has_default_schema());
    }

    #[test]
    fn test_from_json_decode_error() {
        let err = Database::from_json("{\"tables\": 3}").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
