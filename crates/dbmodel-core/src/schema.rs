//! Schemas: the namespaces of a database.
//!
//! A [`Schema`] is plain data (name, alias, note and ordered child id lists).
//! Insertion into a schema goes through [`SchemaScope`], which borrows the
//! owning database mutably so uniqueness checks can see sibling entities and
//! enum binding can scan every table of the database.

use crate::config::EnumBindingPolicy;
use crate::database::Database;
use crate::element::{impl_element, Element};
use crate::enums::{Enum, EnumValue};
use crate::error::{Result, SemanticErrorKind};
use crate::export::SchemaExport;
use crate::ids::{DatabaseId, EnumId, RefId, SchemaId, TableGroupId, TableId, TagId};
use crate::model::Model;
use crate::normalize::{NormalizedModel, NormalizedSchema};
use crate::raw::{RawEnum, RawRef, RawSchema, RawTable, RawTableGroup, RawTag};
use crate::reference::{Ref, RefDraft};
use crate::span::Span;
use crate::table::{Table, TableDraft};
use crate::table_group::TableGroup;
use crate::tag::Tag;
use tracing::debug;

/// A named namespace inside a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub id: SchemaId,
    pub token: Span,
    pub name: String,
    pub alias: Option<String>,
    pub note: Option<String>,
    /// Owning database.
    pub database: DatabaseId,
    pub tables: Vec<TableId>,
    pub enums: Vec<EnumId>,
    pub refs: Vec<RefId>,
    pub tags: Vec<TagId>,
    pub table_groups: Vec<TableGroupId>,
}

impl_element!(Schema, SchemaId);

impl Schema {
    pub(crate) fn new(
        id: SchemaId,
        name: impl Into<String>,
        alias: Option<String>,
        note: Option<String>,
        token: Span,
        database: DatabaseId,
    ) -> Self {
        Schema {
            id,
            token,
            name: name.into(),
            alias,
            note,
            database,
            tables: Vec::new(),
            enums: Vec::new(),
            refs: Vec::new(),
            tags: Vec::new(),
            table_groups: Vec::new(),
        }
    }

    /// Whether `name` refers to this schema, by name or alias.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name || self.alias.as_deref() == Some(name)
    }

    /// Whether two schemas denote the same namespace: either one's name
    /// matches the other's name or alias, or both share an alias.
    pub fn check_same_id(&self, other: &Schema) -> bool {
        self.name == other.name
            || self.alias.as_deref() == Some(other.name.as_str())
            || other.alias.as_deref() == Some(self.name.as_str())
            || (self.alias.is_some() && self.alias == other.alias)
    }

    /// Whether the schema holds no entities.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.enums.is_empty()
            && self.refs.is_empty()
            && self.tags.is_empty()
            && self.table_groups.is_empty()
    }

    /// Find a table of this schema by name or alias.
    pub fn find_table(&self, model: &Model, name: &str) -> Option<TableId> {
        self.tables
            .iter()
            .copied()
            .find(|id| model.tables[*id].is_named(name))
    }

    /// Find a tag of this schema by name.
    pub fn find_tag(&self, model: &Model, name: &str) -> Option<TagId> {
        self.tags
            .iter()
            .copied()
            .find(|id| model.tags[*id].name == name)
    }

    /// Find an enum of this schema by name.
    pub fn find_enum(&self, model: &Model, name: &str) -> Option<EnumId> {
        self.enums
            .iter()
            .copied()
            .find(|id| model.enums[*id].name == name)
    }

    /// Export the schema and its children as a nested record.
    pub fn export(&self, model: &Model) -> SchemaExport {
        SchemaExport {
            name: self.name.clone(),
            note: self.note.clone(),
            alias: self.alias.clone(),
            tables: self.tables.iter().map(|id| model.tables[*id].export(model)).collect(),
            enums: self.enums.iter().map(|id| model.enums[*id].export(model)).collect(),
            table_groups: self
                .table_groups
                .iter()
                .map(|id| model.table_groups[*id].export(model))
                .collect(),
            refs: self.refs.iter().map(|id| model.refs[*id].export(model)).collect(),
            tags: self.tags.iter().map(|id| model.tags[*id].export()).collect(),
        }
    }

    /// Insert this schema into the flat model, then its tables, enums,
    /// table groups, refs and tags.
    pub fn normalize(&self, model: &Model, out: &mut NormalizedModel) {
        out.schemas.insert(
            self.id,
            NormalizedSchema {
                id: self.id,
                name: self.name.clone(),
                note: self.note.clone(),
                alias: self.alias.clone(),
                table_ids: self.tables.clone(),
                enum_ids: self.enums.clone(),
                table_group_ids: self.table_groups.clone(),
                ref_ids: self.refs.clone(),
                tag_ids: self.tags.clone(),
                database_id: self.database,
            },
        );

        for id in &self.tables {
            model.tables[*id].normalize(model, out);
        }
        for id in &self.enums {
            model.enums[*id].normalize(model, out);
        }
        for id in &self.table_groups {
            model.table_groups[*id].normalize(out);
        }
        for id in &self.refs {
            model.refs[*id].normalize(model, out);
        }
        for id in &self.tags {
            model.tags[*id].normalize(out);
        }
    }
}

/// Mutable access to one schema of a database during construction.
pub(crate) struct SchemaScope<'db> {
    db: &'db mut Database,
    schema: SchemaId,
}

impl<'db> SchemaScope<'db> {
    pub(crate) fn new(db: &'db mut Database, schema: SchemaId) -> Self {
        Self { db, schema }
    }

    fn schema(&self) -> &Schema {
        &self.db.model.schemas[self.schema]
    }

    fn schema_mut(&mut self) -> &mut Schema {
        &mut self.db.model.schemas[self.schema]
    }

    /// `"schema".` when the schema name belongs in diagnostics, else empty.
    fn prefix(&self) -> String {
        if self.db.should_qualify(self.schema()) {
            format!("\"{}\".", self.schema().name)
        } else {
            String::new()
        }
    }

    /// Process the records nested in an explicit schema declaration, in the
    /// order tables, tags, enums, refs, table groups.
    pub(crate) fn process(&mut self, raw: RawSchema) -> Result<()> {
        self.process_tables(raw.tables)?;
        self.process_tags(raw.tags)?;
        self.process_enums(raw.enums)?;
        self.process_refs(raw.refs)?;
        self.process_table_groups(raw.table_groups)?;
        Ok(())
    }

    pub(crate) fn process_tables(&mut self, raws: Vec<RawTable>) -> Result<()> {
        for raw in raws {
            self.push_raw_table(raw)?;
        }
        Ok(())
    }

    pub(crate) fn push_raw_table(&mut self, raw: RawTable) -> Result<TableId> {
        let draft = Table::build(raw, self.schema, &mut self.db.ids)?;
        self.push_table(draft)
    }

    /// Insert a table after checking its name is free in this schema.
    pub(crate) fn push_table(&mut self, draft: TableDraft) -> Result<TableId> {
        let name = &draft.table.name;
        let model = &self.db.model;
        if self
            .schema()
            .tables
            .iter()
            .any(|id| model.tables[*id].name == *name)
        {
            return Err(draft.table.error(
                SemanticErrorKind::DuplicateTableName,
                format!("table {}\"{}\" already exists", self.prefix(), name),
            ));
        }

        let TableDraft {
            table,
            fields,
            indexes,
            index_columns,
        } = draft;
        let id = table.id;
        let model = &mut self.db.model;
        for field in fields {
            model.fields.insert(field.id, field);
        }
        for index in indexes {
            model.indexes.insert(index.id, index);
        }
        for column in index_columns {
            model.index_columns.insert(column.id, column);
        }
        model.tables.insert(id, table);
        self.schema_mut().tables.push(id);
        Ok(id)
    }

    pub(crate) fn process_enums(&mut self, raws: Vec<RawEnum>) -> Result<()> {
        for raw in raws {
            self.push_raw_enum(raw)?;
        }
        Ok(())
    }

    pub(crate) fn push_raw_enum(&mut self, raw: RawEnum) -> Result<EnumId> {
        let (enum_def, values) = Enum::build(raw, self.schema, &mut self.db.ids)?;
        self.push_enum(enum_def, values)
    }

    /// Insert an enum after checking its name is free in this schema, then
    /// bind it to matching fields when the policy binds on insert.
    pub(crate) fn push_enum(
        &mut self,
        enum_def: Enum,
        values: Vec<EnumValue>,
    ) -> Result<EnumId> {
        if self.schema().find_enum(&self.db.model, &enum_def.name).is_some() {
            return Err(enum_def.error(
                SemanticErrorKind::DuplicateEnumName,
                format!("enum {}\"{}\" already exists", self.prefix(), enum_def.name),
            ));
        }

        let id = enum_def.id;
        for value in values {
            self.db.model.enum_values.insert(value.id, value);
        }
        self.db.model.enums.insert(id, enum_def);
        self.schema_mut().enums.push(id);

        if self.db.config.enum_binding == EnumBindingPolicy::OnEnumInsert {
            self.db.bind_enum_to_field(id);
        }
        Ok(id)
    }

    pub(crate) fn process_tags(&mut self, raws: Vec<RawTag>) -> Result<()> {
        for raw in raws {
            let tag = Tag::new(raw, self.schema, &mut self.db.ids)?;
            self.push_tag(tag)?;
        }
        Ok(())
    }

    /// Insert a tag after checking its name is free in this schema.
    pub(crate) fn push_tag(&mut self, tag: Tag) -> Result<TagId> {
        if self.schema().find_tag(&self.db.model, &tag.name).is_some() {
            return Err(tag.error(
                SemanticErrorKind::DuplicateTagName,
                format!("tag {}\"{}\" already exists", self.prefix(), tag.name),
            ));
        }

        let id = tag.id;
        self.db.model.tags.insert(id, tag);
        self.schema_mut().tags.push(id);
        Ok(id)
    }

    pub(crate) fn process_refs(&mut self, raws: Vec<RawRef>) -> Result<()> {
        for raw in raws {
            self.push_raw_ref(raw)?;
        }
        Ok(())
    }

    pub(crate) fn push_raw_ref(&mut self, raw: RawRef) -> Result<RefId> {
        let resolved = Ref::resolve_endpoints(&raw, self.db)?;
        let draft = Ref::new(raw, self.schema, resolved, &mut self.db.ids)?;
        self.push_ref(draft)
    }

    /// Insert a ref unless an existing ref of this schema connects the same
    /// endpoints. Each endpoint field records the endpoint.
    pub(crate) fn push_ref(&mut self, draft: RefDraft) -> Result<RefId> {
        let model = &self.db.model;
        if self
            .schema()
            .refs
            .iter()
            .any(|id| draft.equals(&model.refs[*id], model))
        {
            return Err(draft.reference.error(
                SemanticErrorKind::DuplicateRef,
                "a ref with the same endpoints already exists",
            ));
        }

        let RefDraft {
            reference,
            endpoints,
        } = draft;
        let id = reference.id;
        let model = &mut self.db.model;
        for endpoint in endpoints {
            for field in &endpoint.fields {
                model.fields[*field].endpoints.push(endpoint.id);
            }
            model.endpoints.insert(endpoint.id, endpoint);
        }
        model.refs.insert(id, reference);
        self.schema_mut().refs.push(id);
        Ok(id)
    }

    pub(crate) fn process_table_groups(&mut self, raws: Vec<RawTableGroup>) -> Result<()> {
        for raw in raws {
            self.push_raw_table_group(raw)?;
        }
        Ok(())
    }

    pub(crate) fn push_raw_table_group(&mut self, raw: RawTableGroup) -> Result<TableGroupId> {
        let tables = TableGroup::resolve_members(&raw, self.db)?;
        let group = TableGroup::new(raw, self.schema, tables, &mut self.db.ids)?;
        self.push_table_group(group)
    }

    /// Insert a table group after checking its name is free in this schema
    /// and none of its tables already belongs to a group. Member tables
    /// record the group.
    pub(crate) fn push_table_group(&mut self, group: TableGroup) -> Result<TableGroupId> {
        let model = &self.db.model;
        if self
            .schema()
            .table_groups
            .iter()
            .any(|id| model.table_groups[*id].name == group.name)
        {
            return Err(group.error(
                SemanticErrorKind::DuplicateTableGroupName,
                format!("table group {}\"{}\" already exists", self.prefix(), group.name),
            ));
        }

        if let Some((table, other)) = group
            .tables
            .iter()
            .find_map(|t| model.tables[*t].group.map(|g| (*t, g)))
        {
            return Err(group.error(
                SemanticErrorKind::TableAlreadyGrouped,
                format!(
                    "table {} is already in table group \"{}\"",
                    model.qualified_table_name(table),
                    model.table_groups[other].name
                ),
            ));
        }

        let id = group.id;
        for table in &group.tables {
            self.db.model.tables[*table].group = Some(id);
        }
        debug!(
            schema = %self.schema().name,
            group = %group.name,
            members = group.tables.len(),
            "Table group added"
        );
        self.db.model.table_groups.insert(id, group);
        self.schema_mut().table_groups.push(id);
        Ok(id)
    }
}
