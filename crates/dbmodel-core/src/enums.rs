//! Enums and their values.

use crate::allocator::IdAllocator;
use crate::element::{impl_element, Element};
use crate::error::{Result, SemanticErrorKind};
use crate::export::{EnumExport, EnumValueExport};
use crate::ids::{EnumId, EnumValueId, FieldId, SchemaId};
use crate::model::Model;
use crate::normalize::{NormalizedEnum, NormalizedEnumValue, NormalizedModel};
use crate::raw::RawEnum;
use crate::span::Span;

/// An enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub id: EnumId,
    pub token: Span,
    pub name: String,
    pub note: Option<String>,
    /// Owning schema.
    pub schema: SchemaId,
    pub values: Vec<EnumValueId>,
    /// Fields whose type resolved to this enum.
    pub fields: Vec<FieldId>,
}

/// One value of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub id: EnumValueId,
    pub token: Span,
    pub name: String,
    pub note: Option<String>,
    pub enum_id: EnumId,
}

impl_element!(Enum, EnumId);
impl_element!(EnumValue, EnumValueId);

impl Enum {
    /// Construct an enum and its values. Value names must be unique.
    pub(crate) fn build(
        raw: RawEnum,
        schema: SchemaId,
        ids: &mut IdAllocator,
    ) -> Result<(Enum, Vec<EnumValue>)> {
        let id: EnumId = ids.next_id()?;

        let mut values: Vec<EnumValue> = Vec::with_capacity(raw.values.len());
        for raw_value in raw.values {
            let value = EnumValue {
                id: ids.next_id()?,
                token: raw_value.token,
                name: raw_value.name,
                note: raw_value.note,
                enum_id: id,
            };
            if values.iter().any(|v| v.name == value.name) {
                return Err(value.error(
                    SemanticErrorKind::DuplicateEnumValue,
                    format!(
                        "enum value \"{}\" already exists in enum \"{}\"",
                        value.name, raw.name
                    ),
                ));
            }
            values.push(value);
        }

        let enum_def = Enum {
            id,
            token: raw.token,
            name: raw.name,
            note: raw.note,
            schema,
            values: values.iter().map(|v| v.id).collect(),
            fields: Vec::new(),
        };
        Ok((enum_def, values))
    }

    pub(crate) fn push_field(&mut self, field: FieldId) {
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }

    /// Export the enum as a nested record.
    pub fn export(&self, model: &Model) -> EnumExport {
        EnumExport {
            name: self.name.clone(),
            note: self.note.clone(),
            values: self
                .values
                .iter()
                .map(|id| {
                    let value = &model.enum_values[*id];
                    EnumValueExport {
                        name: value.name.clone(),
                        note: value.note.clone(),
                    }
                })
                .collect(),
        }
    }

    /// Insert this enum and its values into the flat model.
    pub fn normalize(&self, model: &Model, out: &mut NormalizedModel) {
        out.enums.insert(
            self.id,
            NormalizedEnum {
                id: self.id,
                name: self.name.clone(),
                note: self.note.clone(),
                value_ids: self.values.clone(),
                field_ids: self.fields.clone(),
                schema_id: self.schema,
            },
        );

        for id in &self.values {
            let value = &model.enum_values[*id];
            out.enum_values.insert(
                value.id,
                NormalizedEnumValue {
                    id: value.id,
                    name: value.name.clone(),
                    note: value.note.clone(),
                    enum_id: self.id,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let mut ids = IdAllocator::default();
        let (status, values) =
            Enum::build(RawEnum::new("status", ["active", "banned"]), SchemaId(1), &mut ids)
                .unwrap();

        assert_eq!(status.id, EnumId(1));
        assert_eq!(status.values, vec![EnumValueId(1), EnumValueId(2)]);
        assert_eq!(values[1].name, "banned");
        assert_eq!(values[1].enum_id, EnumId(1));
        assert!(status.fields.is_empty());
    }

    #[test]
    fn test_duplicate_value() {
        let err = Enum::build(
            RawEnum::new("status", ["active", "active"]),
            SchemaId(1),
            &mut IdAllocator::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind, SemanticErrorKind::DuplicateEnumValue);
    }

    #[test]
    fn test_push_field_once() {
        let (mut status, _) = Enum::build(
            RawEnum::new("status", ["a"]),
            SchemaId(1),
            &mut IdAllocator::default(),
        )
        .unwrap();

        status.push_field(FieldId(4));
        status.push_field(FieldId(4));
        assert_eq!(status.fields, vec![FieldId(4)]);
    }
}
