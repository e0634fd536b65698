//! Table groups.

use crate::allocator::IdAllocator;
use crate::database::Database;
use crate::element::impl_element;
use crate::error::{Result, SemanticError};
use crate::export::{TableGroupExport, TableGroupMemberExport};
use crate::ids::{SchemaId, TableGroupId, TableId};
use crate::model::Model;
use crate::normalize::{NormalizedModel, NormalizedTableGroup};
use crate::raw::RawTableGroup;
use crate::span::Span;

/// A named group of tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableGroup {
    pub id: TableGroupId,
    pub token: Span,
    pub name: String,
    pub note: Option<String>,
    /// Owning schema.
    pub schema: SchemaId,
    pub tables: Vec<TableId>,
}

impl_element!(TableGroup, TableGroupId);

impl TableGroup {
    /// Resolve the member tables of a raw group.
    ///
    /// Members are looked up through [`Database::find_table`], so a member in
    /// an unknown schema fails with `SchemaNotFound` and an unknown table
    /// with `TableNotFound`.
    pub(crate) fn resolve_members(raw: &RawTableGroup, db: &Database) -> Result<Vec<TableId>> {
        let mut tables = Vec::with_capacity(raw.tables.len());
        for member in &raw.tables {
            let token = if member.token.is_empty() {
                raw.token
            } else {
                member.token
            };
            let table = db
                .find_table(member.schema_name.as_deref(), &member.name)
                .map_err(|e| e.at(token))?
                .ok_or_else(|| {
                    let schema = member
                        .schema_name
                        .as_deref()
                        .unwrap_or(&db.config().default_schema_name);
                    SemanticError::table_not_found(
                        &format!("\"{}\".\"{}\"", schema, member.name),
                        token,
                    )
                })?;
            if !tables.contains(&table) {
                tables.push(table);
            }
        }
        Ok(tables)
    }

    pub(crate) fn new(
        raw: RawTableGroup,
        schema: SchemaId,
        tables: Vec<TableId>,
        ids: &mut IdAllocator,
    ) -> Result<Self> {
        Ok(TableGroup {
            id: ids.next_id()?,
            token: raw.token,
            name: raw.name,
            note: raw.note,
            schema,
            tables,
        })
    }

    /// Export the group as a nested record.
    pub fn export(&self, model: &Model) -> TableGroupExport {
        TableGroupExport {
            name: self.name.clone(),
            note: self.note.clone(),
            tables: self
                .tables
                .iter()
                .map(|id| {
                    let table = &model.tables[*id];
                    TableGroupMemberExport {
                        table_name: table.name.clone(),
                        schema_name: model.schemas[table.schema].name.clone(),
                    }
                })
                .collect(),
        }
    }

    /// Insert this group into the flat model.
    pub fn normalize(&self, out: &mut NormalizedModel) {
        out.table_groups.insert(
            self.id,
            NormalizedTableGroup {
                id: self.id,
                name: self.name.clone(),
                note: self.note.clone(),
                table_ids: self.tables.clone(),
                schema_id: self.schema,
            },
        );
    }
}
