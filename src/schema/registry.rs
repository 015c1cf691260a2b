use super::descriptor::SchemaDescriptor;
use super::metadata::{EntityMetadata, MetadataSet};
use crate::config::CodecConfig;
use crate::error::SchemaError;
use crate::visitor::WireEntity;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::debug;

/// Owns every registered [`SchemaDescriptor`] and resolves entity references by name.
///
/// Registration needs `&mut self`; encoding and decoding only borrow the
/// registry, so once registration is done it can be shared freely across threads.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    config: CodecConfig,
    schemas: HashMap<String, Arc<SchemaDescriptor>>,
}

impl SchemaRegistry {
    /// An empty registry with the given limits.
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            schemas: HashMap::new(),
        }
    }

    /// Limits in force for this registry.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Validates and registers one entity type.
    ///
    /// Registering metadata identical to an existing entry returns the existing
    /// descriptor. Entity references must name the type itself or a type that is
    /// already registered; use [`register_all`](Self::register_all) for mutual recursion.
    pub fn register(&mut self, metadata: EntityMetadata) -> Result<Arc<SchemaDescriptor>, SchemaError> {
        let name = metadata.name.clone();
        self.register_all([metadata])?
            .pop()
            .ok_or(SchemaError::UnknownEntity(name))
    }

    /// Registers a batch of entity types atomically.
    ///
    /// References may point anywhere inside the batch. On error nothing is registered.
    /// Descriptors are returned in batch order.
    pub fn register_all(
        &mut self,
        batch: impl IntoIterator<Item = EntityMetadata>,
    ) -> Result<Vec<Arc<SchemaDescriptor>>, SchemaError> {
        let batch: Vec<EntityMetadata> = batch.into_iter().collect();

        let mut staged: HashMap<&str, Arc<SchemaDescriptor>> = HashMap::new();
        let mut ordered = Vec::with_capacity(batch.len());
        for metadata in &batch {
            let built = SchemaDescriptor::build(metadata, self.config.max_index)?;
            let existing = self
                .schemas
                .get(&metadata.name)
                .or_else(|| staged.get(metadata.name.as_str()));
            let descriptor = match existing {
                Some(current) if current.fingerprint() == built.fingerprint() => Arc::clone(current),
                Some(_) => {
                    return Err(SchemaError::ConflictingDefinition {
                        entity: metadata.name.clone(),
                    });
                }
                None => Arc::new(built),
            };
            staged.insert(metadata.name.as_str(), Arc::clone(&descriptor));
            ordered.push(descriptor);
        }

        for metadata in &batch {
            for target in metadata.references() {
                if !staged.contains_key(target) && !self.schemas.contains_key(target) {
                    return Err(SchemaError::UnresolvedReference {
                        entity: metadata.name.clone(),
                        target: target.to_owned(),
                    });
                }
            }
        }

        for (name, descriptor) in staged {
            if let Entry::Vacant(slot) = self.schemas.entry(name.to_owned()) {
                debug!(
                    entity = name,
                    fields = descriptor.len(),
                    fingerprint = descriptor.fingerprint(),
                    "registered schema"
                );
                slot.insert(descriptor);
            }
        }
        Ok(ordered)
    }

    /// Registers `T` and every entity type reachable from its fields.
    pub fn register_entity<T: WireEntity>(&mut self) -> Result<Arc<SchemaDescriptor>, SchemaError> {
        let mut set = MetadataSet::new();
        T::collect_metadata(&mut set);
        self.register_all(set.into_vec())?;
        self.resolve(T::entity_name()).cloned()
    }

    /// Looks up a registered entity.
    pub fn get(&self, name: &str) -> Option<&Arc<SchemaDescriptor>> {
        self.schemas.get(name)
    }

    /// Like [`get`](Self::get), failing with [`SchemaError::UnknownEntity`].
    pub fn resolve(&self, name: &str) -> Result<&Arc<SchemaDescriptor>, SchemaError> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_owned()))
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Names of all registered entities, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}
