//! Type identifiers, the flat type table, and struct layout.

use std::collections::HashMap;
use tauc_util::index_vec::{Idx, IndexVec};
use thiserror::Error;

/// Opaque handle into a [`TypeRegistry`].
///
/// `TypeId(0)` is reserved and never assigned to a real type: it is the
/// value a lookup returns for an unresolved or unknown name, the same way
/// the emitter threads an unresolved field type through as a sentinel
/// rather than failing immediately. The high bit is reserved for a future
/// template-instantiation id space and is never set by [`TypeRegistry`]
/// today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u64);

impl TypeId {
    /// Sentinel for "no type" / "failed to resolve".
    pub const UNKNOWN: TypeId = TypeId(0);

    /// Reserved mask for a future template-instantiation id space.
    pub const TEMPLATE_INSTANTIATION_BIT: u64 = 0x1000000000000000;

    #[inline]
    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_template_instantiation(self) -> bool {
        self.0 & Self::TEMPLATE_INSTANTIATION_BIT != 0
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Default for TypeId {
    fn default() -> Self {
        TypeId::UNKNOWN
    }
}

impl Idx for TypeId {
    fn from_usize(idx: usize) -> Self {
        TypeId(idx as u64 + 1)
    }

    fn index(self) -> usize {
        debug_assert!(!self.is_unknown(), "TypeId::UNKNOWN has no table slot");
        (self.0 - 1) as usize
    }
}

/// One field of a struct type: its name, byte offset within the struct,
/// and the type it holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub offset: usize,
    pub type_id: TypeId,
}

/// Everything the registry knows about one type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub id: TypeId,
    /// Fully-qualified name, e.g. `i32` or `struct main.Point`.
    pub true_name: String,
    /// Size in bytes.
    pub size: usize,
    pub is_user_defined: bool,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("type '{0}' is already defined")]
    DuplicateDefinition(String),
    #[error("unknown type id")]
    UnknownTypeId,
    #[error("'{0}' is not a struct type")]
    NotAStruct(String),
    #[error("struct '{struct_name}' has no field '{field_name}'")]
    NoSuchField {
        struct_name: String,
        field_name: String,
    },
}

pub type TypeResult<T> = Result<T, TypeError>;

/// Flat table of every type known to one compilation, keyed both by
/// [`TypeId`] (for O(1) lookups during emission) and by name (for
/// resolving identifiers the parser produces).
///
/// Built fresh per compilation rather than kept as a process-wide
/// singleton: nothing about type resolution needs to outlive one source
/// file, and a fresh registry makes tests trivially independent of each
/// other.
pub struct TypeRegistry {
    types: IndexVec<TypeId, TypeDescriptor>,
    by_name: HashMap<String, TypeId>,
}

/// Primitive type names seeded into every registry, paired with their
/// size in bytes.
const PRIMITIVES: &[(&str, usize)] = &[
    ("void", 0),
    ("u8", 1),
    ("u16", 2),
    ("u32", 4),
    ("u64", 8),
    ("i8", 1),
    ("i16", 2),
    ("i32", 4),
    ("i64", 8),
    ("f32", 4),
    ("f64", 8),
    ("char", 1),
    ("bool", 1),
];

/// Names of the two placeholder types an untyped numeric literal carries
/// until operator resolution promotes it to a concrete type. Sized like
/// the widest type they could ever be promoted to, since the emitter
/// never looks at their size directly.
pub const UNTYPED_INTEGER_LITERAL: &str = "{integer literal}";
pub const UNTYPED_FLOAT_LITERAL: &str = "{float literal}";

impl TypeRegistry {
    /// A registry pre-seeded with the primitive types and the two untyped
    /// literal placeholder types.
    pub fn new() -> Self {
        let mut reg = Self {
            types: IndexVec::new(),
            by_name: HashMap::new(),
        };
        for &(name, size) in PRIMITIVES {
            reg.insert_builtin(name, size);
        }
        reg.insert_builtin(UNTYPED_INTEGER_LITERAL, 8);
        reg.insert_builtin(UNTYPED_FLOAT_LITERAL, 8);
        reg
    }

    fn insert_builtin(&mut self, name: &str, size: usize) -> TypeId {
        let id = self.types.push(TypeDescriptor {
            id: TypeId::UNKNOWN, // patched below
            true_name: name.to_string(),
            size,
            is_user_defined: false,
            fields: Vec::new(),
        });
        self.types[id].id = id;
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Look up a type by name, returning [`TypeId::UNKNOWN`] if absent.
    /// Kept alongside [`Self::try_lookup`] because unresolved-name
    /// threading is a real state the emitter relies on (see
    /// [`TypeId::UNKNOWN`]), not just an error to short-circuit on.
    pub fn lookup(&self, name: &str) -> TypeId {
        self.by_name.get(name).copied().unwrap_or(TypeId::UNKNOWN)
    }

    pub fn try_lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Define a struct type from its fields, computing offsets as a
    /// running sum. Each field's offset is the sum of the sizes of all
    /// preceding fields, and the struct's own size is the sum of all
    /// field sizes — a plain accumulator, unlike an earlier version of
    /// this calculation that shadowed the running total and left every
    /// offset at zero.
    pub fn define_struct(
        &mut self,
        name: &str,
        field_types: &[(String, TypeId)],
    ) -> TypeResult<TypeId> {
        if self.by_name.contains_key(name) {
            return Err(TypeError::DuplicateDefinition(name.to_string()));
        }

        let mut fields = Vec::with_capacity(field_types.len());
        let mut running_size = 0usize;
        for (field_name, field_type) in field_types {
            let field_size = self.size_of(*field_type);
            fields.push(FieldDef {
                name: field_name.clone(),
                offset: running_size,
                type_id: *field_type,
            });
            running_size += field_size;
        }

        let true_name = format!("struct {name}");
        let id = self.types.push(TypeDescriptor {
            id: TypeId::UNKNOWN,
            true_name,
            size: running_size,
            is_user_defined: true,
            fields,
        });
        self.types[id].id = id;
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn size_of(&self, id: TypeId) -> usize {
        if id.is_unknown() {
            return 0;
        }
        self.types.get(id).map(|d| d.size).unwrap_or(0)
    }

    pub fn name_of(&self, id: TypeId) -> Option<&str> {
        self.types.get(id).map(|d| d.true_name.as_str())
    }

    pub fn is_struct(&self, id: TypeId) -> bool {
        self.types.get(id).map(|d| d.is_user_defined).unwrap_or(false)
    }

    pub fn fields_of(&self, id: TypeId) -> &[FieldDef] {
        self.types.get(id).map(|d| d.fields.as_slice()).unwrap_or(&[])
    }

    pub fn offset_of(&self, id: TypeId, field_name: &str) -> Option<usize> {
        self.fields_of(id).iter().find(|f| f.name == field_name).map(|f| f.offset)
    }

    /// Type of a named field on a struct, or [`TypeId::UNKNOWN`] if the
    /// struct has no such field.
    pub fn struct_field_type(&self, id: TypeId, field_name: &str) -> TypeId {
        self.fields_of(id)
            .iter()
            .find(|f| f.name == field_name)
            .map(|f| f.type_id)
            .unwrap_or(TypeId::UNKNOWN)
    }

    pub fn is_untyped_literal(&self, id: TypeId) -> bool {
        matches!(
            self.name_of(id),
            Some(UNTYPED_INTEGER_LITERAL) | Some(UNTYPED_FLOAT_LITERAL)
        )
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
