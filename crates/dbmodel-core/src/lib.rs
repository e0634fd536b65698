//! DBModel Core
//!
//! This crate turns the raw records produced by a schema DSL parser into a
//! validated, cross-linked model: schemas, tables, fields, indexes, enums,
//! refs, table groups and tags.
//!
//! # Construction
//!
//! A [`Database`] is built from a [`RawDatabase`] bundle in one fixed pass:
//! explicit schemas, then tables, tags (with tag binding), refs, enums and
//! table groups. Records that name no schema land in the default schema
//! (`public` unless configured otherwise), which is created on first use.
//! The first semantic violation aborts construction with a
//! [`SemanticError`].
//!
//! # Views
//!
//! - [`Database::export`] returns a nested [`DatabaseExport`] tree.
//! - [`Database::normalize`] returns a flat [`NormalizedModel`] with one
//!   identifier-keyed bucket per entity kind.
//!
//! # Usage
//!
//! ```rust
//! use dbmodel_core::{Database, RawDatabase, RawField, RawTable};
//!
//! let raw = RawDatabase::new().with_table(
//!     RawTable::new("users").with_field(RawField::new("id", "int").primary_key()),
//! );
//! let db = Database::new(raw).unwrap();
//!
//! assert!(db.has_default_schema());
//! let public = db.find_schema("public").unwrap();
//! assert_eq!(db.schema(public).tables.len(), 1);
//! assert_eq!(db.normalize().tables.len(), 1);
//! ```

pub mod allocator;
pub mod config;
pub mod database;
pub mod element;
pub mod enums;
pub mod error;
pub mod export;
pub mod ids;
pub mod model;
pub mod normalize;
pub mod raw;
pub mod reference;
pub mod schema;
pub mod span;
pub mod table;
pub mod table_group;
pub mod tag;

// Re-export main types
pub use allocator::{IdAllocator, IdKind};
pub use config::{EnumBindingPolicy, ModelConfig, DEFAULT_SCHEMA_NAME};
pub use database::Database;
pub use element::Element;
pub use enums::{Enum, EnumValue};
pub use error::{Error, Result, SemanticError, SemanticErrorKind};
pub use export::{DatabaseExport, DatabaseShallowExport, SchemaExport};
pub use ids::{
    DatabaseId, EndpointId, EntityId, EnumId, EnumValueId, FieldId, IndexColumnId, IndexId, RefId,
    SchemaId, TableGroupId, TableId, TagId,
};
pub use model::{Arena, Model};
pub use normalize::NormalizedModel;
pub use raw::{
    RawDatabase, RawEndpoint, RawEnum, RawField, RawFieldType, RawIndex, RawRef, RawSchema,
    RawTable, RawTableGroup, RawTag, Relation, SchemaScoped,
};
pub use reference::{Endpoint, Ref};
pub use schema::Schema;
pub use span::Span;
pub use table::{Field, Index, IndexColumn, Table};
pub use table_group::TableGroup;
pub use tag::Tag;
