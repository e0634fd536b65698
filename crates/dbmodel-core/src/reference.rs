//! Refs (relationships) and their endpoints.

use crate::allocator::IdAllocator;
use crate::database::Database;
use crate::element::impl_element;
use crate::error::{Result, SemanticError};
use crate::export::{EndpointExport, RefExport};
use crate::ids::{EndpointId, FieldId, RefId, SchemaId, TableId};
use crate::model::Model;
use crate::normalize::{NormalizedEndpoint, NormalizedModel, NormalizedRef};
use crate::raw::{RawEndpoint, RawRef, Relation};
use crate::span::Span;
use std::collections::BTreeSet;

/// A relationship between two endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub id: RefId,
    pub token: Span,
    pub name: Option<String>,
    /// Owning schema.
    pub schema: SchemaId,
    /// Always two endpoints.
    pub endpoints: Vec<EndpointId>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// One side of a ref: a set of columns of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub id: EndpointId,
    pub token: Span,
    /// Schema name as declared; `None` means the default schema.
    pub schema_name: Option<String>,
    pub table_name: String,
    pub field_names: Vec<String>,
    pub relation: Relation,
    /// Owning ref.
    pub ref_id: RefId,
    /// Resolved table.
    pub table: TableId,
    /// Resolved fields, in declaration order.
    pub fields: Vec<FieldId>,
}

impl_element!(Ref, RefId);
impl_element!(Endpoint, EndpointId);

/// An endpoint whose table and fields have been looked up.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedEndpoint {
    raw: RawEndpoint,
    table: TableId,
    fields: Vec<FieldId>,
}

/// A constructed ref and its endpoints, not yet inserted into a schema.
#[derive(Debug, Clone)]
pub(crate) struct RefDraft {
    pub reference: Ref,
    pub endpoints: Vec<Endpoint>,
}

impl ResolvedEndpoint {
    fn resolve(raw: &RawEndpoint, ref_token: Span, db: &Database) -> Result<Self> {
        let token = if raw.token.is_empty() {
            ref_token
        } else {
            raw.token
        };
        let schema_name = raw
            .schema_name
            .as_deref()
            .unwrap_or(&db.config().default_schema_name);
        let qualified = format!("\"{}\".\"{}\"", schema_name, raw.table_name);

        let table_id = db
            .find_table(raw.schema_name.as_deref(), &raw.table_name)
            .map_err(|e| e.at(token))?
            .ok_or_else(|| SemanticError::table_not_found(&qualified, token))?;
        let table = &db.model().tables[table_id];

        let mut fields = Vec::with_capacity(raw.field_names.len());
        for name in &raw.field_names {
            let field = table.find_field(db.model(), name).ok_or_else(|| {
                let table_name = db.model().qualified_table_name(table_id);
                SemanticError::field_not_found(&table_name, name, token)
            })?;
            if fields.contains(&field.id) {
                return Err(SemanticError::invalid_endpoints(
                    format!("field \"{}\" is listed twice in one endpoint", name),
                    token,
                ));
            }
            fields.push(field.id);
        }

        Ok(ResolvedEndpoint {
            raw: raw.clone(),
            table: table_id,
            fields,
        })
    }

    fn same_fields(&self, other: &ResolvedEndpoint) -> bool {
        same_field_set(&self.fields, &other.fields)
    }
}

impl Ref {
    /// Resolve both endpoints of a raw ref against the tables built so far.
    pub(crate) fn resolve_endpoints(
        raw: &RawRef,
        db: &Database,
    ) -> Result<Vec<ResolvedEndpoint>> {
        if raw.endpoints.len() != 2 {
            return Err(SemanticError::invalid_endpoints(
                format!("a ref needs exactly two endpoints, found {}", raw.endpoints.len()),
                raw.token,
            ));
        }

        let from = ResolvedEndpoint::resolve(&raw.endpoints[0], raw.token, db)?;
        let to = ResolvedEndpoint::resolve(&raw.endpoints[1], raw.token, db)?;

        if from.fields.len() != to.fields.len() {
            return Err(SemanticError::invalid_endpoints(
                "both endpoints of a ref must have the same number of fields",
                raw.token,
            ));
        }
        if from.same_fields(&to) {
            return Err(SemanticError::invalid_endpoints(
                "the two endpoints of a ref are the same",
                raw.token,
            ));
        }

        Ok(vec![from, to])
    }

    pub(crate) fn new(
        raw: RawRef,
        schema: SchemaId,
        resolved: Vec<ResolvedEndpoint>,
        ids: &mut IdAllocator,
    ) -> Result<RefDraft> {
        let id: RefId = ids.next_id()?;
        let endpoints = resolved
            .into_iter()
            .map(|e| {
                Ok(Endpoint {
                    id: ids.next_id()?,
                    token: e.raw.token,
                    schema_name: e.raw.schema_name,
                    table_name: e.raw.table_name,
                    field_names: e.raw.field_names,
                    relation: e.raw.relation,
                    ref_id: id,
                    table: e.table,
                    fields: e.fields,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let reference = Ref {
            id,
            token: raw.token,
            name: raw.name,
            schema,
            endpoints: endpoints.iter().map(|e| e.id).collect(),
            on_delete: raw.on_delete,
            on_update: raw.on_update,
        };
        Ok(RefDraft {
            reference,
            endpoints,
        })
    }

    /// Whether `other` connects the same unordered pair of endpoints.
    pub fn equals(&self, other: &Ref, model: &Model) -> bool {
        let mine = endpoints_of(self, model);
        let theirs = endpoints_of(other, model);
        same_endpoint_pair(&mine, &theirs)
    }

    /// Export the ref as a nested record.
    pub fn export(&self, model: &Model) -> RefExport {
        RefExport {
            name: self.name.clone(),
            on_delete: self.on_delete.clone(),
            on_update: self.on_update.clone(),
            endpoints: self
                .endpoints
                .iter()
                .map(|id| model.endpoints[*id].export())
                .collect(),
        }
    }

    /// Insert this ref and its endpoints into the flat model.
    pub fn normalize(&self, model: &Model, out: &mut NormalizedModel) {
        out.refs.insert(
            self.id,
            NormalizedRef {
                id: self.id,
                name: self.name.clone(),
                on_delete: self.on_delete.clone(),
                on_update: self.on_update.clone(),
                endpoint_ids: self.endpoints.clone(),
                schema_id: self.schema,
            },
        );

        for id in &self.endpoints {
            model.endpoints[*id].normalize(out);
        }
    }
}

impl RefDraft {
    /// Whether an already stored ref connects the same endpoints as this one.
    pub(crate) fn equals(&self, other: &Ref, model: &Model) -> bool {
        let mine: Vec<&Endpoint> = self.endpoints.iter().collect();
        let theirs = endpoints_of(other, model);
        same_endpoint_pair(&mine, &theirs)
    }
}

impl Endpoint {
    /// Whether both endpoints cover the same set of fields.
    pub fn equals(&self, other: &Endpoint) -> bool {
        same_field_set(&self.fields, &other.fields)
    }

    /// Export the endpoint as a nested record.
    pub fn export(&self) -> EndpointExport {
        EndpointExport {
            schema_name: self.schema_name.clone(),
            table_name: self.table_name.clone(),
            field_names: self.field_names.clone(),
            relation: self.relation,
        }
    }

    /// Insert this endpoint into the flat model.
    pub fn normalize(&self, out: &mut NormalizedModel) {
        out.endpoints.insert(
            self.id,
            NormalizedEndpoint {
                id: self.id,
                schema_name: self.schema_name.clone(),
                table_name: self.table_name.clone(),
                field_names: self.field_names.clone(),
                relation: self.relation,
                ref_id: self.ref_id,
                table_id: self.table,
                field_ids: self.fields.clone(),
            },
        );
    }
}

fn endpoints_of<'m>(reference: &Ref, model: &'m Model) -> Vec<&'m Endpoint> {
    reference
        .endpoints
        .iter()
        .map(|id| &model.endpoints[*id])
        .collect()
}

fn same_field_set(a: &[FieldId], b: &[FieldId]) -> bool {
    let set = |ids: &[FieldId]| ids.iter().copied().collect::<BTreeSet<_>>();
    set(a) == set(b)
}

fn same_endpoint_pair(a: &[&Endpoint], b: &[&Endpoint]) -> bool {
    match b {
        [first, second] => {
            a.iter().any(|e| e.equals(first)) && a.iter().any(|e| e.equals(second))
        }
        _ => false,
    }
}
