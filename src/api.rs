//! The Tagcode facade.
//!
//! [`Tagcode`] owns a [`SchemaRegistry`] and exposes registration, encoding,
//! decoding and inspection through one type. Registration takes `&mut self`;
//! everything else takes `&self`, so a fully registered codec can be shared by
//! reference (or in an `Arc`) across threads with no locking.

use crate::config::CodecConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::inspector::{DebugReport, WireInspector};
use crate::schema::{EntityMetadata, SchemaDescriptor, SchemaRegistry};
use crate::value::EntityInstance;
use crate::visitor::WireEntity;
use rayon::prelude::*;
use std::sync::Arc;

/// The main entry point.
#[derive(Debug, Default)]
pub struct Tagcode {
    registry: SchemaRegistry,
}

impl Tagcode {
    /// A codec with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec with the given limits.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            registry: SchemaRegistry::new(config),
        }
    }

    /// Starts configuring a codec.
    ///
    /// ```rust
    /// let codec = tagcode::Tagcode::builder().max_depth(8).build();
    /// assert_eq!(codec.config().max_depth, 8);
    /// ```
    pub fn builder() -> TagcodeOptions {
        TagcodeOptions::default()
    }

    /// Limits in force.
    pub fn config(&self) -> &CodecConfig {
        self.registry.config()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    // --- REGISTRATION ---

    /// Validates and registers one entity type.
    pub fn register_schema(&mut self, metadata: EntityMetadata) -> Result<Arc<SchemaDescriptor>> {
        Ok(self.registry.register(metadata)?)
    }

    /// Registers several entity types at once; they may reference each other.
    pub fn register_all(
        &mut self,
        batch: impl IntoIterator<Item = EntityMetadata>,
    ) -> Result<Vec<Arc<SchemaDescriptor>>> {
        Ok(self.registry.register_all(batch)?)
    }

    /// Registers `T` and every entity type its fields reach.
    pub fn register<T: WireEntity>(&mut self) -> Result<Arc<SchemaDescriptor>> {
        Ok(self.registry.register_entity::<T>()?)
    }

    /// Looks up a registered schema by entity name.
    pub fn schema(&self, name: &str) -> Result<&Arc<SchemaDescriptor>> {
        Ok(self.registry.resolve(name)?)
    }

    // --- DYNAMIC INSTANCES ---

    /// Encodes `instance` against `schema`.
    pub fn encode(&self, instance: &EntityInstance, schema: &SchemaDescriptor) -> Result<Vec<u8>> {
        Ok(Encoder::new(&self.registry).encode(instance, schema)?)
    }

    /// Decodes `bytes` against `schema`.
    pub fn decode(&self, bytes: &[u8], schema: &SchemaDescriptor) -> Result<EntityInstance> {
        Ok(Decoder::new(&self.registry).decode(bytes, schema)?)
    }

    /// Encodes many instances of one schema in parallel.
    ///
    /// Results are in input order; each item fails or succeeds on its own.
    pub fn encode_batch(&self, instances: &[EntityInstance], schema: &SchemaDescriptor) -> Vec<Result<Vec<u8>>> {
        let encoder = Encoder::new(&self.registry);
        instances
            .par_iter()
            .map(|instance| -> Result<Vec<u8>> { Ok(encoder.encode(instance, schema)?) })
            .collect()
    }

    /// Decodes many streams of one schema in parallel.
    pub fn decode_batch<B>(&self, streams: &[B], schema: &SchemaDescriptor) -> Vec<Result<EntityInstance>>
    where
        B: AsRef<[u8]> + Sync,
    {
        let decoder = Decoder::new(&self.registry);
        streams
            .par_iter()
            .map(|bytes| -> Result<EntityInstance> { Ok(decoder.decode(bytes.as_ref(), schema)?) })
            .collect()
    }

    /// Produces a structural report of `bytes` read as `schema`.
    pub fn inspect(&self, bytes: &[u8], schema: &SchemaDescriptor) -> Result<DebugReport> {
        Ok(WireInspector::new(&self.registry).inspect(bytes, schema)?)
    }

    // --- TYPED ENTITIES ---

    /// Encodes a typed entity. `T` must already be registered.
    pub fn to_bytes<T: WireEntity>(&self, value: &T) -> Result<Vec<u8>> {
        let schema = self.registry.resolve(T::entity_name())?;
        self.encode(&value.to_instance(), schema)
    }

    /// Decodes a typed entity. `T` must already be registered.
    pub fn from_bytes<T: WireEntity>(&self, bytes: &[u8]) -> Result<T> {
        let schema = self.registry.resolve(T::entity_name())?;
        let instance = self.decode(bytes, schema)?;
        Ok(T::from_instance(instance)?)
    }

    /// Parallel [`to_bytes`](Self::to_bytes).
    pub fn to_bytes_batch<T: WireEntity + Sync>(&self, values: &[T]) -> Result<Vec<Vec<u8>>> {
        let schema = self.registry.resolve(T::entity_name())?;
        let encoder = Encoder::new(&self.registry);
        values
            .par_iter()
            .map(|value| -> Result<Vec<u8>> { Ok(encoder.encode(&value.to_instance(), schema)?) })
            .collect()
    }

    /// Parallel [`from_bytes`](Self::from_bytes).
    pub fn from_bytes_batch<T, B>(&self, streams: &[B]) -> Result<Vec<T>>
    where
        T: WireEntity + Send,
        B: AsRef<[u8]> + Sync,
    {
        let schema = self.registry.resolve(T::entity_name())?;
        let decoder = Decoder::new(&self.registry);
        streams
            .par_iter()
            .map(|bytes| -> Result<T> { Ok(T::from_instance(decoder.decode(bytes.as_ref(), schema)?)?) })
            .collect()
    }
}

/// Configuration builder for [`Tagcode`].
#[derive(Debug, Clone, Default)]
pub struct TagcodeOptions {
    config: CodecConfig,
}

impl TagcodeOptions {
    /// Highest wire index a schema may declare.
    pub fn max_index(mut self, max_index: u32) -> Self {
        self.config.max_index = max_index;
        self
    }

    /// Deepest entity nesting accepted.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Largest element count a decoded sequence may declare.
    pub fn max_sequence_len(mut self, max_sequence_len: u64) -> Self {
        self.config.max_sequence_len = max_sequence_len;
        self
    }

    /// Replaces every limit at once, e.g. with a config loaded from a file.
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds an empty codec.
    pub fn build(self) -> Tagcode {
        Tagcode::with_config(self.config)
    }
}
