// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema model: primitive kinds, field types, enum descriptors and schema versions.

use crate::value::Value;
use crate::versioned::VersionedValue;
use std::fmt;
use std::sync::Arc;

/// Fixed-width primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveKind {
    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// True for the integer kinds usable as an enum's underlying type.
    pub fn is_integer(&self) -> bool {
        !matches!(self, Self::Bool | Self::F32 | Self::F64)
    }

    /// Whether an enum raw value survives a round trip at this width.
    ///
    /// `u64` values above `i64::MAX` are carried as their two's complement
    /// reinterpretation, so every `i64` fits the two 64-bit kinds.
    pub fn holds(&self, raw: i64) -> bool {
        match self {
            Self::U8 => u8::try_from(raw).is_ok(),
            Self::U16 => u16::try_from(raw).is_ok(),
            Self::U32 => u32::try_from(raw).is_ok(),
            Self::I8 => i8::try_from(raw).is_ok(),
            Self::I16 => i16::try_from(raw).is_ok(),
            Self::I32 => i32::try_from(raw).is_ok(),
            Self::U64 | Self::I64 => true,
            Self::Bool | Self::F32 | Self::F64 => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    /// Enum type name.
    pub name: String,
    /// Variants in declaration order.
    pub variants: Vec<EnumVariant>,
    /// Underlying integer kind used on the wire (default u32).
    pub underlying: PrimitiveKind,
}

impl EnumDescriptor {
    /// Create enum descriptor.
    pub fn new(name: impl Into<String>, variants: Vec<EnumVariant>) -> Self {
        Self {
            name: name.into(),
            variants,
            underlying: PrimitiveKind::U32,
        }
    }

    /// Create with specific underlying type.
    pub fn with_underlying(mut self, underlying: PrimitiveKind) -> Self {
        self.underlying = underlying;
        self
    }

    /// Get variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Get variant by value.
    pub fn variant_by_value(&self, value: i64) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.value == value)
    }

    /// Check that `self` only appends variants to `older`.
    ///
    /// Every variant of `older` must appear at the same position with the same
    /// name and value. Returns a human-readable description of the first violation.
    pub fn check_extends(&self, older: &EnumDescriptor) -> Result<(), String> {
        for (position, old) in older.variants.iter().enumerate() {
            match self.variants.get(position) {
                Some(new) if new == old => {}
                Some(new) => {
                    return Err(format!(
                        "variant {} ({} = {}) became {} = {}",
                        position, old.name, old.value, new.name, new.value
                    ));
                }
                None => {
                    return Err(format!(
                        "variant {} ({} = {}) was removed",
                        position, old.name, old.value
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Variant value.
    pub value: i64,
}

impl EnumVariant {
    /// Create enum variant.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Type of one field of a schema version.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Fixed-width integer, bool or float.
    Primitive(PrimitiveKind),
    /// Enum stored as its underlying integer.
    Enum(Arc<EnumDescriptor>),
    /// String occupying exactly `width` bytes on the wire.
    FixedString { width: usize },
    /// Length-prefixed string.
    String { max_length: Option<usize> },
    /// Nested struct laid out with the referenced schema version.
    Struct(Arc<SchemaVersion>),
}

impl FieldType {
    /// Tag used for cross-version field matching.
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Primitive(kind) => TypeTag::Primitive(*kind),
            Self::Enum(desc) => TypeTag::Enum(desc.underlying),
            Self::FixedString { width } => TypeTag::FixedString(*width),
            Self::String { .. } => TypeTag::String,
            Self::Struct(schema) => TypeTag::Struct(Arc::clone(&schema.family)),
        }
    }

    /// Value a field of this type holds until something else is assigned.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Primitive(kind) => default_primitive(*kind),
            Self::Enum(desc) => Value::Enum(desc.variants.first().map_or(0, |v| v.value)),
            Self::FixedString { .. } | Self::String { .. } => Value::String(String::new()),
            Self::Struct(schema) => Value::Struct(VersionedValue::new(schema)),
        }
    }

    /// Size constraint of a dynamic string field.
    pub fn max_length(&self) -> Option<usize> {
        match self {
            Self::String { max_length } => *max_length,
            _ => None,
        }
    }
}

// @audit-ok: Simple pattern matching - default value dispatch table
fn default_primitive(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::Bool => Value::Bool(false),
        PrimitiveKind::U8 => Value::U8(0),
        PrimitiveKind::U16 => Value::U16(0),
        PrimitiveKind::U32 => Value::U32(0),
        PrimitiveKind::U64 => Value::U64(0),
        PrimitiveKind::I8 => Value::I8(0),
        PrimitiveKind::I16 => Value::I16(0),
        PrimitiveKind::I32 => Value::I32(0),
        PrimitiveKind::I64 => Value::I64(0),
        PrimitiveKind::F32 => Value::F32(0.0),
        PrimitiveKind::F64 => Value::F64(0.0),
    }
}

/// Comparable identity of a field type.
///
/// Two fields of different schema versions correspond only when both their
/// names and their tags are identical. Enum tags ignore the variant list and
/// struct tags name the nested type's family rather than one version of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Primitive(PrimitiveKind),
    Enum(PrimitiveKind),
    FixedString(usize),
    String,
    Struct(Arc<str>),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{}", kind),
            Self::Enum(kind) => write!(f, "enum({})", kind),
            Self::FixedString(width) => write!(f, "fixed_string[{}]", width),
            Self::String => f.write_str("string"),
            Self::Struct(family) => write!(f, "struct {}", family),
        }
    }
}

/// Field descriptor for struct members.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name, unique within its schema.
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
    /// Declared default, already checked against `field_type`.
    pub default: Value,
}

impl FieldDescriptor {
    /// Create a field whose default is the type's zero value.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let default = field_type.default_value();
        Self {
            name: name.into(),
            field_type,
            default,
        }
    }

    /// Set default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    pub fn tag(&self) -> TypeTag {
        self.field_type.tag()
    }
}

/// One point-in-time field layout of a named type.
///
/// Versions of the same type form a chain through `parent`, from the root
/// (index 0) to the latest. Built once by the registry and never mutated.
pub struct SchemaVersion {
    type_name: String,
    family: Arc<str>,
    index: u32,
    parent: Option<Arc<SchemaVersion>>,
    fields: Vec<FieldDescriptor>,
    fingerprint: u32,
}

impl SchemaVersion {
    pub(crate) fn new(
        type_name: impl Into<String>,
        parent: Option<Arc<SchemaVersion>>,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        let type_name = type_name.into();
        let (family, index) = match &parent {
            Some(p) => (Arc::clone(&p.family), p.index + 1),
            None => (Arc::from(type_name.as_str()), 0),
        };
        let fingerprint = compute_fnv1a_hash(&type_name);
        Self {
            type_name,
            family,
            index,
            parent,
            fields,
            fingerprint,
        }
    }

    /// Type name of this version.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Name of the root version; shared by every version of the chain.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Position in the chain (0 = root). Written as the blob header.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn parent(&self) -> Option<&Arc<SchemaVersion>> {
        self.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 32-bit FNV-1a hash of the type name.
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Iterate from the direct parent back to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Arc<SchemaVersion>> {
        std::iter::successors(self.parent.as_ref(), |s| s.parent.as_ref())
    }

    /// Same version of the same type.
    pub fn same_as(&self, other: &SchemaVersion) -> bool {
        std::ptr::eq(self, other)
            || (self.index == other.index && self.type_name == other.type_name)
    }

    /// Minimum payload size in bytes (empty dynamic strings).
    pub fn min_payload_size(&self) -> usize {
        self.fields
            .iter()
            .map(|f| match &f.field_type {
                FieldType::Primitive(kind) => kind.size(),
                FieldType::Enum(desc) => desc.underlying.size(),
                FieldType::FixedString { width } => *width,
                FieldType::String { .. } => 4,
                FieldType::Struct(nested) => nested.min_payload_size(),
            })
            .sum()
    }
}

impl fmt::Debug for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaVersion")
            .field("type_name", &self.type_name)
            .field("family", &self.family)
            .field("index", &self.index)
            .field("parent", &self.parent.as_ref().map(|p| p.type_name()))
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|f| (f.name.as_str(), f.tag()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

// Unlink long parent chains iteratively rather than one stack frame per version.
impl Drop for SchemaVersion {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(version) = parent {
            match Arc::try_unwrap(version) {
                Ok(mut owned) => parent = owned.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// Compute FNV-1a hash (32-bit) of a type name.
pub(crate) fn compute_fnv1a_hash(s: &str) -> u32 {
    let mut hash = 2_166_136_261_u32;
    for byte in s.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(variants: &[&str]) -> EnumDescriptor {
        let variants = variants
            .iter()
            .enumerate()
            .map(|(i, n)| EnumVariant::new(*n, i as i64))
            .collect();
        EnumDescriptor::new("Flag", variants).with_underlying(PrimitiveKind::U8)
    }

    #[test]
    fn test_primitive_size() {
        assert_eq!(PrimitiveKind::Bool.size(), 1);
        assert_eq!(PrimitiveKind::U32.size(), 4);
        assert_eq!(PrimitiveKind::F64.size(), 8);
        assert!(PrimitiveKind::I16.is_integer());
        assert!(!PrimitiveKind::F32.is_integer());
        assert!(!PrimitiveKind::Bool.is_integer());
    }

    #[test]
    fn test_enum_width_holds() {
        assert!(PrimitiveKind::U8.holds(255));
        assert!(!PrimitiveKind::U8.holds(256));
        assert!(!PrimitiveKind::U8.holds(-1));
        assert!(PrimitiveKind::I8.holds(-128));
        assert!(!PrimitiveKind::I8.holds(128));
        assert!(!PrimitiveKind::U32.holds(i64::from(u32::MAX) + 1));
        assert!(PrimitiveKind::U64.holds(-1));
        assert!(PrimitiveKind::I64.holds(i64::MIN));
        assert!(!PrimitiveKind::F32.holds(0));
    }

    #[test]
    fn test_enum_descriptor_lookup() {
        let desc = flag(&["HogeHoge", "Foo", "Piyo"]);
        assert_eq!(desc.variant("Foo").map(|v| v.value), Some(1));
        assert_eq!(
            desc.variant_by_value(2).map(|v| v.name.as_str()),
            Some("Piyo")
        );
        assert!(desc.variant_by_value(7).is_none());
    }

    #[test]
    fn test_enum_append_only() {
        let old = flag(&["HogeHoge", "Foo", "Piyo"]);
        assert!(flag(&["HogeHoge", "Foo", "Piyo", "Pool"])
            .check_extends(&old)
            .is_ok());

        let reordered = flag(&["Foo", "HogeHoge", "Piyo"]);
        assert!(reordered.check_extends(&old).is_err());

        let removed = flag(&["HogeHoge", "Foo"]);
        let err = removed.check_extends(&old).unwrap_err();
        assert!(err.contains("removed"));
    }

    #[test]
    fn test_type_tags() {
        let a = FieldType::String {
            max_length: Some(8),
        };
        let b = FieldType::String { max_length: None };
        assert_eq!(a.tag(), b.tag());

        assert_ne!(
            FieldType::FixedString { width: 8 }.tag(),
            FieldType::FixedString { width: 16 }.tag()
        );

        let e3 = FieldType::Enum(Arc::new(flag(&["A", "B", "C"])));
        let e4 = FieldType::Enum(Arc::new(flag(&["A", "B", "C", "D"])));
        assert_eq!(e3.tag(), e4.tag());
        assert_ne!(e3.tag(), FieldType::Primitive(PrimitiveKind::U8).tag());
    }

    #[test]
    fn test_schema_chain_links() {
        let root = Arc::new(SchemaVersion::new(
            "SaveV1",
            None,
            vec![FieldDescriptor::new(
                "count",
                FieldType::Primitive(PrimitiveKind::I32),
            )],
        ));
        let next = SchemaVersion::new("SaveV2", Some(Arc::clone(&root)), Vec::new());

        assert_eq!(root.index(), 0);
        assert!(root.is_root());
        assert_eq!(next.index(), 1);
        assert_eq!(next.family(), "SaveV1");
        assert_eq!(next.ancestors().count(), 1);
        assert!(!next.same_as(&root));
        assert_eq!(root.min_payload_size(), 4);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(compute_fnv1a_hash(""), 2_166_136_261);
        assert_eq!(compute_fnv1a_hash("a"), 0xe40c_292c);
        assert_ne!(compute_fnv1a_hash("SaveV1"), compute_fnv1a_hash("SaveV2"));
    }
}
