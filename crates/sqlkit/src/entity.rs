//! Entity introspection capability.
//!
//! The builder never inspects live objects directly. Instead an entity type
//! implements [`Entity`], usually through `#[derive(Entity)]`, which exposes:
//!
//! - a static [`EntityDescriptor`] (fields, tags, overrides, parent),
//! - `value_of` to read a property of a live instance,
//! - optionally `changed_properties` for change-tracking entities.

use crate::value::Value;
use std::any::TypeId;
use std::fmt;

/// Coarse type classification of an entity field.
///
/// Only used to decide whether a field named `id` can serve as the implicit
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Long,
    Float,
    String,
    Date,
    Timestamp,
    Uuid,
    Json,
    Other,
}

impl FieldKind {
    /// Whether a field of this kind named `id` becomes the implicit identity.
    pub fn can_be_implicit_id(self) -> bool {
        matches!(
            self,
            FieldKind::Int | FieldKind::Long | FieldKind::String | FieldKind::Timestamp | FieldKind::Uuid
        )
    }
}

/// Static declaration of one entity field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Property name.
    pub name: &'static str,
    /// Explicit column name, overriding the naming policy.
    pub column: Option<&'static str>,
    pub kind: FieldKind,
    /// Explicit identity tag.
    pub id: bool,
    /// Excluded from INSERT and UPDATE.
    pub read_only: bool,
    /// Excluded from UPDATE.
    pub non_updatable: bool,
    /// Excluded from every property set.
    pub transient: bool,
    /// Whether the field can be read through `value_of`. Fields without an
    /// accessor are not properties.
    pub accessor: bool,
}

impl FieldDescriptor {
    /// A plain readable, writable field.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column: None,
            kind,
            id: false,
            read_only: false,
            non_updatable: false,
            transient: false,
            accessor: true,
        }
    }

    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    pub const fn id(mut self) -> Self {
        self.id = true;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub const fn non_updatable(mut self) -> Self {
        self.non_updatable = true;
        self
    }

    pub const fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub const fn no_accessor(mut self) -> Self {
        self.accessor = false;
        self
    }
}

/// Static declaration of an entity type.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    /// Simple type name, used to derive table names.
    pub name: &'static str,
    /// Explicit table name, used verbatim under every naming policy.
    pub table: Option<&'static str>,
    pub fields: &'static [FieldDescriptor],
    /// Parent entity whose fields precede this type's own fields.
    pub parent: Option<fn() -> &'static EntityDescriptor>,
}

/// Introspection capability implemented by entity types.
pub trait Entity: Send + Sync + 'static {
    /// The static declaration of this type.
    fn descriptor() -> &'static EntityDescriptor
    where
        Self: Sized;

    /// Read the current value of a property, `None` if the property is unknown.
    fn value_of(&self, prop: &str) -> Option<Value>;

    /// Properties changed since the entity was loaded, if the entity tracks
    /// changes. `None` means every property counts as changed.
    fn changed_properties(&self) -> Option<Vec<String>> {
        None
    }
}

/// A type-erased handle to an entity type, used as the metadata cache key.
#[derive(Clone, Copy)]
pub struct EntityType {
    id: TypeId,
    descriptor: fn() -> &'static EntityDescriptor,
}

impl EntityType {
    pub fn of<T: Entity>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            descriptor: T::descriptor,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        (self.descriptor)()
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityType {}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityType").field(&self.name()).finish()
    }
}

/// Records which properties of an entity were modified.
///
/// Place one in an entity with `#[orm(changes)]`; UPDATE statements built from
/// that entity then only set the marked properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    changed: Vec<String>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a property as changed. Marking twice is a no-op.
    pub fn mark(&mut self, prop: impl Into<String>) {
        let prop = prop.into();
        if !self.changed.contains(&prop) {
            self.changed.push(prop);
        }
    }

    pub fn is_changed(&self, prop: &str) -> bool {
        self.changed.iter().any(|p| p == prop)
    }

    pub fn clear(&mut self) {
        self.changed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Changed property names in marking order.
    pub fn changed(&self) -> Vec<String> {
        self.changed.clone()
    }
}
