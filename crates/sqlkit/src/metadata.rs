//! Process-wide entity metadata cache.
//!
//! Metadata is computed on first access from the type's static
//! [`EntityDescriptor`] and published with an atomic insert-if-absent into a
//! sharded concurrent map keyed by [`TypeId`]. Two threads racing on the same
//! unseen type may both compute; only the first published record is ever
//! observed afterwards. Records are immutable once published.

use crate::entity::{Entity, EntityDescriptor, EntityType, FieldDescriptor};
use crate::naming::{self, NamingPolicy};
use dashmap::DashMap;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Property categories cached per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyCategory {
    All,
    Selectable,
    Insertable,
    Updatable,
}

/// Cached facts about one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    entity_name: &'static str,
    table_names: [String; 3],
    column_overrides: HashMap<String, String>,
    all: Vec<String>,
    selectable: Vec<String>,
    insertable: Vec<String>,
    updatable: Vec<String>,
    id_properties: Vec<String>,
}

fn cache() -> &'static DashMap<TypeId, Arc<EntityMetadata>> {
    static CACHE: OnceLock<DashMap<TypeId, Arc<EntityMetadata>>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Look up (computing on first access) the metadata for an entity type.
pub fn metadata_for(entity: EntityType) -> Arc<EntityMetadata> {
    let key = entity.type_id();
    if let Some(found) = cache().get(&key) {
        return Arc::clone(found.value());
    }

    // Computed outside any shard lock; a racing thread may do the same work.
    let computed = Arc::new(EntityMetadata::compute(entity.descriptor()));
    cache()
        .entry(key)
        .or_insert_with(|| {
            tracing::debug!(
                entity = computed.entity_name,
                properties = computed.all.len(),
                "published entity metadata"
            );
            Arc::clone(&computed)
        })
        .value()
        .clone()
}

/// Number of entity types currently cached.
pub fn cached_entity_count() -> usize {
    cache().len()
}

impl EntityMetadata {
    /// Metadata for `T`, from the process-wide cache.
    pub fn of<T: Entity>() -> Arc<EntityMetadata> {
        metadata_for(EntityType::of::<T>())
    }

    /// Compute metadata from a static declaration. Pure: the same descriptor
    /// always yields an equal record.
    pub fn compute(descriptor: &'static EntityDescriptor) -> Self {
        let fields = collect_fields(descriptor);

        let table_names = match descriptor.table {
            Some(table) => [table.to_string(), table.to_string(), table.to_string()],
            None => NamingPolicy::ALL.map(|policy| policy.convert(descriptor.name)),
        };

        let column_overrides: HashMap<String, String> = fields
            .iter()
            .filter_map(|f| f.column.map(|c| (f.name.to_string(), c.to_string())))
            .collect();

        let names = |keep: fn(&FieldDescriptor) -> bool| -> Vec<String> {
            fields
                .iter()
                .filter(|f| !f.transient && keep(f))
                .map(|f| f.name.to_string())
                .collect()
        };

        let all = names(|_| true);
        let selectable = names(|_| true);
        let insertable = names(|f| !f.read_only);
        let updatable = names(|f| !f.read_only && !f.non_updatable);

        let mut id_properties: Vec<String> = fields
            .iter()
            .filter(|f| f.id)
            .map(|f| f.name.to_string())
            .collect();
        if id_properties.is_empty() {
            if let Some(implicit) = fields
                .iter()
                .find(|f| f.name == "id" && f.kind.can_be_implicit_id())
            {
                id_properties.push(implicit.name.to_string());
            }
        }

        Self {
            entity_name: descriptor.name,
            table_names,
            column_overrides,
            all,
            selectable,
            insertable,
            updatable,
            id_properties,
        }
    }

    pub fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    /// Table name under the given naming policy.
    pub fn table_name(&self, policy: NamingPolicy) -> &str {
        &self.table_names[policy.index()]
    }

    /// Explicit property → column overrides.
    pub fn column_overrides(&self) -> &HashMap<String, String> {
        &self.column_overrides
    }

    /// Resolve a property's column under `policy`, honoring overrides.
    pub fn column_name(&self, policy: NamingPolicy, prop: &str) -> String {
        naming::resolve(policy, &self.column_overrides, prop)
    }

    pub fn properties(&self, category: PropertyCategory) -> &[String] {
        match category {
            PropertyCategory::All => &self.all,
            PropertyCategory::Selectable => &self.selectable,
            PropertyCategory::Insertable => &self.insertable,
            PropertyCategory::Updatable => &self.updatable,
        }
    }

    /// Properties of a category, minus `excluded`, in declaration order.
    pub fn properties_excluding(&self, category: PropertyCategory, excluded: &[&str]) -> Vec<String> {
        self.properties(category)
            .iter()
            .filter(|p| !excluded.contains(&p.as_str()))
            .cloned()
            .collect()
    }

    pub fn all(&self) -> &[String] {
        &self.all
    }

    pub fn selectable(&self) -> &[String] {
        &self.selectable
    }

    pub fn insertable(&self) -> &[String] {
        &self.insertable
    }

    pub fn updatable(&self) -> &[String] {
        &self.updatable
    }

    /// Identity properties (explicit, or the implicit `id`).
    pub fn id_properties(&self) -> &[String] {
        &self.id_properties
    }
}

/// Walk the parent chain root-first and merge fields by name.
///
/// A redeclared name keeps the position of its first declaration but takes the
/// most derived declaration's tags.
fn collect_fields(descriptor: &'static EntityDescriptor) -> Vec<FieldDescriptor> {
    let mut chain: Vec<&'static EntityDescriptor> = vec![descriptor];
    let mut current = descriptor;
    while let Some(parent) = current.parent {
        let parent = parent();
        if chain.iter().any(|d| std::ptr::eq(*d, parent)) {
            break;
        }
        chain.push(parent);
        current = parent;
    }

    let mut fields: Vec<FieldDescriptor> = Vec::new();
    for desc in chain.iter().rev() {
        for field in desc.fields.iter().filter(|f| f.accessor) {
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = *field,
                None => fields.push(*field),
            }
        }
    }
    fields
}
