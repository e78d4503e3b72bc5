// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field descriptor extraction.
//!
//! Turns [`ReflectionProvider`] answers into immutable [`SchemaVersion`]s.
//! Every type is extracted at most once; nested struct fields and base types
//! share the same `Arc<SchemaVersion>`.

use super::reflect::{ReflectedField, ReflectedType, ReflectionProvider};
use super::types::{EnumDescriptor, FieldDescriptor, FieldType, SchemaVersion};
use crate::config::{EnumEvolution, RegistryConfig};
use crate::error::RegistryError;
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Memoizing extractor over one provider.
pub(crate) struct Extractor<'a, P: ReflectionProvider + ?Sized> {
    provider: &'a P,
    config: &'a RegistryConfig,
    done: HashMap<String, Arc<SchemaVersion>>,
    /// Longest chain of nested struct fields below each extracted type.
    heights: HashMap<String, usize>,
    enums: HashMap<String, Arc<EnumDescriptor>>,
    in_progress: Vec<String>,
}

impl<'a, P: ReflectionProvider + ?Sized> Extractor<'a, P> {
    pub(crate) fn new(provider: &'a P, config: &'a RegistryConfig) -> Self {
        Self {
            provider,
            config,
            done: HashMap::new(),
            heights: HashMap::new(),
            enums: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Extract a type and, transitively, its bases and nested types.
    pub(crate) fn extract(&mut self, type_name: &str) -> Result<Arc<SchemaVersion>, RegistryError> {
        self.extract_at(type_name, 0)
    }

    fn extract_at(
        &mut self,
        type_name: &str,
        depth: usize,
    ) -> Result<Arc<SchemaVersion>, RegistryError> {
        if let Some(schema) = self.done.get(type_name) {
            return Ok(Arc::clone(schema));
        }

        // unextracted bases are built root first, without recursing per version
        let mut pending = vec![type_name.to_string()];
        let mut queued = HashSet::from([type_name.to_string()]);
        let mut current = type_name.to_string();
        while let Some(base) = self.provider.resolve_base(&current) {
            if self.done.contains_key(&base) {
                break;
            }
            if self.in_progress.contains(&base) || !queued.insert(base.clone()) {
                return Err(RegistryError::SchemaCycle {
                    type_name: type_name.to_string(),
                });
            }
            pending.push(base.clone());
            current = base;
        }

        let mut latest = None;
        for name in pending.iter().rev() {
            latest = Some(self.extract_one(name, depth)?);
        }
        latest.ok_or_else(|| RegistryError::SchemaNotFound(type_name.to_string()))
    }

    fn extract_one(
        &mut self,
        type_name: &str,
        depth: usize,
    ) -> Result<Arc<SchemaVersion>, RegistryError> {
        let reflected = self
            .provider
            .enumerate(type_name)
            .ok_or_else(|| RegistryError::SchemaNotFound(type_name.to_string()))?;

        self.in_progress.push(type_name.to_string());
        let built = self.build_version(type_name, reflected, depth);
        self.in_progress.pop();
        let (version, height) = built?;

        let schema = Arc::new(version);
        self.done.insert(type_name.to_string(), Arc::clone(&schema));
        self.heights.insert(type_name.to_string(), height);
        Ok(schema)
    }

    fn build_version(
        &mut self,
        type_name: &str,
        reflected: Vec<ReflectedField>,
        depth: usize,
    ) -> Result<(SchemaVersion, usize), RegistryError> {
        let parent = match self.provider.resolve_base(type_name) {
            Some(base) => {
                if self.in_progress.contains(&base) {
                    return Err(RegistryError::SchemaCycle {
                        type_name: type_name.to_string(),
                    });
                }
                Some(self.extract_at(&base, depth)?)
            }
            None => None,
        };

        let mut seen = HashSet::new();
        let mut height = 0;
        let mut fields = Vec::with_capacity(reflected.len());
        for field in reflected {
            if !seen.insert(field.name.clone()) {
                return Err(RegistryError::DuplicateField {
                    type_name: type_name.to_string(),
                    field: field.name,
                });
            }
            let field_type = self.resolve_type(type_name, &field, depth)?;
            if let FieldType::Struct(nested) = &field_type {
                let below = self.heights.get(nested.type_name()).copied().unwrap_or(0);
                height = height.max(below + 1);
            }
            let default = resolve_default(type_name, &field, &field_type)?;
            fields.push(FieldDescriptor {
                name: field.name,
                field_type,
                default,
            });
        }

        if self.config.enum_evolution == EnumEvolution::AppendOnly {
            if let Some(parent) = &parent {
                check_enum_evolution(type_name, parent, &fields)?;
            }
        }

        Ok((SchemaVersion::new(type_name, parent, fields), height))
    }

    fn resolve_type(
        &mut self,
        type_name: &str,
        field: &ReflectedField,
        depth: usize,
    ) -> Result<FieldType, RegistryError> {
        let unsupported = |reason: String| RegistryError::UnsupportedFieldType {
            type_name: type_name.to_string(),
            field: field.name.clone(),
            reason,
        };

        if field.max_length.is_some() && field.ty != ReflectedType::String {
            return Err(unsupported(
                "size constraint on a non-string field".to_string(),
            ));
        }

        match &field.ty {
            ReflectedType::Primitive(kind) => Ok(FieldType::Primitive(*kind)),
            ReflectedType::Enum(name) => self.resolve_enum(name).map(FieldType::Enum).map_err(unsupported),
            ReflectedType::FixedString(0) => Err(unsupported("fixed string of width 0".to_string())),
            ReflectedType::FixedString(width) => Ok(FieldType::FixedString { width: *width }),
            ReflectedType::String => Ok(FieldType::String {
                max_length: field.max_length,
            }),
            ReflectedType::Struct(nested) => {
                if self.in_progress.contains(nested) {
                    return Err(unsupported(format!("recursive layout through {}", nested)));
                }
                let limit = self.config.max_nesting_depth;
                if depth >= limit {
                    return Err(unsupported(format!("nesting deeper than {}", limit)));
                }
                let schema = self.extract_at(nested, depth + 1)?;
                let below = self.heights.get(nested).copied().unwrap_or(0);
                if below + 1 > limit {
                    return Err(unsupported(format!("nesting deeper than {}", limit)));
                }
                Ok(FieldType::Struct(schema))
            }
            ReflectedType::Unsupported(desc) => Err(unsupported(format!(
                "{} has no stable binary representation",
                desc
            ))),
        }
    }

    fn resolve_enum(&mut self, name: &str) -> Result<Arc<EnumDescriptor>, String> {
        if let Some(desc) = self.enums.get(name) {
            return Ok(Arc::clone(desc));
        }
        let reflected = self
            .provider
            .enumerate_enum(name)
            .ok_or_else(|| format!("unknown enum {}", name))?;
        if !reflected.underlying.is_integer() {
            return Err(format!(
                "enum {} has non-integer underlying type {}",
                name, reflected.underlying
            ));
        }
        if let Some(wide) = reflected
            .variants
            .iter()
            .find(|v| !reflected.underlying.holds(v.value))
        {
            return Err(format!(
                "variant {}::{} = {} does not fit {}",
                name, wide.name, wide.value, reflected.underlying
            ));
        }
        let desc = Arc::new(
            EnumDescriptor::new(reflected.name, reflected.variants)
                .with_underlying(reflected.underlying),
        );
        self.enums.insert(name.to_string(), Arc::clone(&desc));
        Ok(desc)
    }
}

fn resolve_default(
    type_name: &str,
    field: &ReflectedField,
    field_type: &FieldType,
) -> Result<Value, RegistryError> {
    let Some(default) = &field.default else {
        return Ok(field_type.default_value());
    };
    let out_of_bounds = match (field_type, default) {
        (FieldType::String { max_length: Some(max) }, Value::String(s)) => s.len() > *max,
        (FieldType::Enum(desc), Value::Enum(raw)) => !desc.underlying.holds(*raw),
        _ => false,
    };
    if !default.matches(field_type) || out_of_bounds {
        return Err(RegistryError::InvalidDefault {
            type_name: type_name.to_string(),
            field: field.name.clone(),
            expected: field_type.tag().to_string(),
        });
    }
    Ok(default.clone())
}

fn check_enum_evolution(
    type_name: &str,
    parent: &SchemaVersion,
    fields: &[FieldDescriptor],
) -> Result<(), RegistryError> {
    for field in fields {
        let FieldType::Enum(new) = &field.field_type else {
            continue;
        };
        let Some(FieldType::Enum(old)) = parent.field(&field.name).map(|f| &f.field_type) else {
            continue;
        };
        // different widths never match, so the values are not carried over
        if new.underlying != old.underlying {
            continue;
        }
        new.check_extends(old)
            .map_err(|detail| RegistryError::EnumEvolution {
                type_name: type_name.to_string(),
                field: field.name.clone(),
                detail,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::{EnumBuilder, StructBuilder, TypeCatalog};
    use crate::schema::types::PrimitiveKind;

    fn extract(catalog: &TypeCatalog, name: &str) -> Result<Arc<SchemaVersion>, RegistryError> {
        let config = RegistryConfig::default();
        Extractor::new(catalog, &config).extract(name)
    }

    #[test]
    fn test_extracts_fields_in_order() {
        let catalog = TypeCatalog::new().with_struct(
            StructBuilder::new("Save")
                .field("b", PrimitiveKind::U8)
                .string_field("a")
                .fixed_string_field("c", 4)
                .build(),
        );
        let schema = extract(&catalog, "Save").unwrap();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_nested_types_are_shared() {
        let catalog = TypeCatalog::new()
            .with_struct(StructBuilder::new("Vec2").field("x", PrimitiveKind::F32).build())
            .with_struct(
                StructBuilder::new("Save")
                    .struct_field("pos", "Vec2")
                    .struct_field("vel", "Vec2")
                    .build(),
            );
        let schema = extract(&catalog, "Save").unwrap();
        let (FieldType::Struct(a), FieldType::Struct(b)) =
            (&schema.fields()[0].field_type, &schema.fields()[1].field_type)
        else {
            panic!("expected struct fields");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_rejects_unsupported_fields() {
        let catalog = TypeCatalog::new()
            .with_struct(
                StructBuilder::new("A")
                    .field_with_type(ReflectedField::new(
                        "ptr",
                        ReflectedType::Unsupported("raw pointer".into()),
                    ))
                    .build(),
            )
            .with_struct(StructBuilder::new("B").fixed_string_field("tag", 0).build())
            .with_struct(StructBuilder::new("C").enum_field("e", "Missing").build())
            .with_struct(StructBuilder::new("D").enum_field("e", "Floaty").build())
            .with_enum(
                EnumBuilder::new("Floaty")
                    .variant("X")
                    .underlying(PrimitiveKind::F32)
                    .build(),
            );

        for name in ["A", "B", "C", "D"] {
            assert!(
                matches!(
                    extract(&catalog, name),
                    Err(RegistryError::UnsupportedFieldType { .. })
                ),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_rejects_recursive_layout() {
        let catalog = TypeCatalog::new()
            .with_struct(StructBuilder::new("Node").struct_field("next", "Link").build())
            .with_struct(StructBuilder::new("Link").struct_field("node", "Node").build());

        let err = extract(&catalog, "Node").unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedFieldType { .. }));
    }

    #[test]
    fn test_rejects_duplicate_and_bad_default() {
        let catalog = TypeCatalog::new()
            .with_struct(
                StructBuilder::new("Dup")
                    .field("x", PrimitiveKind::U8)
                    .field("x", PrimitiveKind::U16)
                    .build(),
            )
            .with_struct(
                StructBuilder::new("BadDefault")
                    .field("x", PrimitiveKind::U8)
                    .with_default(5u32)
                    .build(),
            );

        assert!(matches!(
            extract(&catalog, "Dup"),
            Err(RegistryError::DuplicateField { .. })
        ));
        assert!(matches!(
            extract(&catalog, "BadDefault"),
            Err(RegistryError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn test_nesting_depth_limit() {
        let mut catalog = TypeCatalog::new();
        catalog.add_struct(StructBuilder::new("L0").field("v", PrimitiveKind::U8).build());
        for level in 1..=3 {
            catalog.add_struct(
                StructBuilder::new(format!("L{}", level))
                    .struct_field("inner", format!("L{}", level - 1))
                    .build(),
            );
        }

        let config = RegistryConfig::builder().max_nesting_depth(2).build();
        let mut extractor = Extractor::new(&catalog, &config);
        assert!(extractor.extract("L2").is_ok());
        // L1 and L2 are memoized; the limit still applies to L3
        assert!(matches!(
            extractor.extract("L3"),
            Err(RegistryError::UnsupportedFieldType { .. })
        ));
    }

    #[test]
    fn test_append_only_enum_policy() {
        let catalog = TypeCatalog::new()
            .with_enum(
                EnumBuilder::new("FlagV1")
                    .variant("A")
                    .variant("B")
                    .underlying(PrimitiveKind::U8)
                    .build(),
            )
            .with_enum(
                EnumBuilder::new("FlagV2")
                    .variant("B")
                    .variant("A")
                    .underlying(PrimitiveKind::U8)
                    .build(),
            )
            .with_struct(StructBuilder::new("V1").enum_field("flag", "FlagV1").build())
            .with_struct(
                StructBuilder::new("V2")
                    .base("V1")
                    .enum_field("flag", "FlagV2")
                    .build(),
            );

        assert!(extract(&catalog, "V2").is_ok());

        let config = RegistryConfig::builder()
            .enum_evolution(EnumEvolution::AppendOnly)
            .build();
        let err = Extractor::new(&catalog, &config).extract("V2").unwrap_err();
        assert!(matches!(err, RegistryError::EnumEvolution { .. }));
    }

    #[test]
    fn test_enum_values_must_fit_underlying() {
        let catalog = TypeCatalog::new()
            .with_enum(
                EnumBuilder::new("Level")
                    .variant("Low")
                    .variant("High")
                    .underlying(PrimitiveKind::U8)
                    .build(),
            )
            .with_enum(
                EnumBuilder::new("Huge")
                    .variant_value("Big", 256)
                    .underlying(PrimitiveKind::U8)
                    .build(),
            )
            .with_struct(
                StructBuilder::new("WideDefault")
                    .enum_field("level", "Level")
                    .with_default(Value::Enum(300))
                    .build(),
            )
            .with_struct(
                StructBuilder::new("MaxDefault")
                    .enum_field("level", "Level")
                    .with_default(Value::Enum(255))
                    .build(),
            )
            .with_struct(StructBuilder::new("WideVariant").enum_field("e", "Huge").build());

        assert!(matches!(
            extract(&catalog, "WideDefault"),
            Err(RegistryError::InvalidDefault { ref field, .. }) if field == "level"
        ));
        assert!(extract(&catalog, "MaxDefault").is_ok());
        assert!(matches!(
            extract(&catalog, "WideVariant"),
            Err(RegistryError::UnsupportedFieldType { .. })
        ));
    }
}
