//! Per-repository cache of described query methods.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::analyzer::QueryMethodAnalyzer;
use crate::descriptor::QueryMethodDescriptor;
use crate::error::ValidationError;
use crate::metadata::RepositoryMetadata;
use crate::signature::{MethodKey, MethodSignature};

/// The described query methods of one repository.
///
/// Descriptors are built once per method and shared afterwards. Lookups
/// take a read lock only; building a missing descriptor happens outside the
/// lock, and when two threads race on the same method the first published
/// descriptor wins.
pub struct RepositoryMethods {
    metadata: Arc<dyn RepositoryMetadata>,
    analyzer: QueryMethodAnalyzer,
    descriptors: RwLock<IndexMap<MethodKey, Arc<QueryMethodDescriptor>>>,
}

impl RepositoryMethods {
    /// An empty cache for the repository described by `metadata`.
    pub fn new(metadata: Arc<dyn RepositoryMetadata>, analyzer: QueryMethodAnalyzer) -> Self {
        Self {
            metadata,
            analyzer,
            descriptors: RwLock::new(IndexMap::new()),
        }
    }

    /// Describe every method of a repository, failing on the first invalid one.
    pub fn bootstrap<I>(
        metadata: Arc<dyn RepositoryMetadata>,
        analyzer: QueryMethodAnalyzer,
        methods: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = MethodSignature>,
    {
        let repository = Self::new(metadata, analyzer);
        for method in methods {
            repository.describe(method)?;
        }
        tracing::debug!(
            repository = repository.metadata.repository_name().unwrap_or("<unnamed>"),
            methods = repository.len(),
            "bootstrapped repository query methods"
        );
        Ok(repository)
    }

    /// The repository metadata shared by all descriptors.
    pub fn metadata(&self) -> &Arc<dyn RepositoryMetadata> {
        &self.metadata
    }

    /// The descriptor for `signature`, building it on first use.
    pub fn describe(
        &self,
        signature: MethodSignature,
    ) -> Result<Arc<QueryMethodDescriptor>, ValidationError> {
        let key = signature.key();
        if let Some(existing) = self.get(&key) {
            tracing::trace!(method = %key, "query method cache hit");
            self.analyzer.tracer().on_cache_hit(&key);
            return Ok(existing);
        }

        let descriptor = Arc::new(self.analyzer.describe(signature, self.metadata.clone())?);
        let mut descriptors = self.descriptors.write();
        Ok(descriptors.entry(key).or_insert(descriptor).clone())
    }

    /// The descriptor for `key`, if already described.
    pub fn get(&self, key: &MethodKey) -> Option<Arc<QueryMethodDescriptor>> {
        self.descriptors.read().get(key).cloned()
    }

    /// Descriptors of all methods named `name`, in declaration order.
    pub fn by_name(&self, name: &str) -> Vec<Arc<QueryMethodDescriptor>> {
        self.descriptors
            .read()
            .values()
            .filter(|d| d.name() == name)
            .cloned()
            .collect()
    }

    /// All descriptors, in declaration order.
    pub fn descriptors(&self) -> Vec<Arc<QueryMethodDescriptor>> {
        self.descriptors.read().values().cloned().collect()
    }

    /// Number of described methods.
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// Returns true if no method has been described yet.
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }
}

impl std::fmt::Debug for RepositoryMethods {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryMethods")
            .field("metadata", &self.metadata)
            .field("methods", &self.descriptors.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[test]
fn test_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<RepositoryMethods>();
    assert_sync::<RepositoryMethods>();
    assert_send::<QueryMethodDescriptor>();
    assert_sync::<QueryMethodDescriptor>();
}
