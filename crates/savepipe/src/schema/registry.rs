// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::extract::Extractor;
use super::reflect::ReflectionProvider;
use super::types::SchemaVersion;
use crate::codec::{self, ByteSink, ByteSource, Decoded, SliceSource};
use crate::config::RegistryConfig;
use crate::error::{ReadError, RegistryError, WriteError};
use crate::versioned::VersionedValue;

// ---------------------------------------------------------------------------
// SchemaChain
// ---------------------------------------------------------------------------

/// Every version of one type, root first.
///
/// Chains along one line of versions share a single root-to-latest slice;
/// each chain sees the prefix that ends at its own type.
#[derive(Debug, Clone)]
pub struct SchemaChain {
    /// Index `i` holds the version whose header value is `i`.
    versions: Arc<[Arc<SchemaVersion>]>,
    len: usize,
}

impl SchemaChain {
    /// Every version from the root up to and including `latest`.
    fn lineage(latest: &Arc<SchemaVersion>) -> Arc<[Arc<SchemaVersion>]> {
        let mut versions: Vec<Arc<SchemaVersion>> = latest.ancestors().cloned().collect();
        versions.reverse();
        versions.push(Arc::clone(latest));
        versions.into()
    }

    /// Name of the latest version.
    pub fn type_name(&self) -> &str {
        self.latest().type_name()
    }

    pub fn latest(&self) -> &Arc<SchemaVersion> {
        &self.versions[self.len - 1]
    }

    pub fn root(&self) -> &Arc<SchemaVersion> {
        &self.versions[0]
    }

    /// Version at a header index.
    pub fn get(&self, index: u32) -> Option<&Arc<SchemaVersion>> {
        self.versions[..self.len].get(index as usize)
    }

    /// Number of versions (at least 1).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate root to latest.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SchemaVersion>> {
        self.versions[..self.len].iter()
    }
}

// ---------------------------------------------------------------------------
// SchemaRegistry
// ---------------------------------------------------------------------------

/// Immutable store of version chains keyed by type name.
///
/// Built once from a [`ReflectionProvider`]; every registered type name,
/// including names of older versions, resolves to the chain ending at it.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    chains: HashMap<String, SchemaChain>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Build every chain the provider describes with the default configuration.
    pub fn build<P: ReflectionProvider + ?Sized>(provider: &P) -> Result<Self, RegistryError> {
        Self::build_with_config(provider, RegistryConfig::default())
    }

    /// Build every chain the provider describes.
    ///
    /// Base references are validated before any field is extracted, so a
    /// missing or cyclic base is reported as such rather than as a field error.
    pub fn build_with_config<P: ReflectionProvider + ?Sized>(
        provider: &P,
        config: RegistryConfig,
    ) -> Result<Self, RegistryError> {
        config.validate()?;

        let mut names = provider.type_names();
        names.sort();
        names.dedup();

        let lengths = Self::validate_bases(provider, &names, config.max_versions)?;

        let mut chains = HashMap::with_capacity(names.len());
        {
            let mut extractor = Extractor::new(provider, &config);
            // longest chains first, so shorter ones reuse their lineage
            let mut order: Vec<&String> = names.iter().collect();
            order.sort_by_key(|name| std::cmp::Reverse(lengths.get(*name).copied().unwrap_or(0)));

            for name in order {
                if chains.contains_key(name) {
                    continue;
                }
                let latest = extractor.extract(name)?;
                let lineage = SchemaChain::lineage(&latest);
                for (position, version) in lineage.iter().enumerate() {
                    if chains.contains_key(version.type_name()) {
                        continue;
                    }
                    chains.insert(
                        version.type_name().to_string(),
                        SchemaChain {
                            versions: Arc::clone(&lineage),
                            len: position + 1,
                        },
                    );
                }
                log::trace!(
                    "[savepipe] {} -> {} version(s), {} field(s)",
                    name,
                    lineage.len(),
                    latest.fields().len()
                );
            }
        }

        log::debug!("[savepipe] registry built: {} type(s)", chains.len());
        Ok(Self { chains, config })
    }

    /// Check every base link once and return each type's chain length.
    ///
    /// A walk stops at the first type already measured, so the total work is
    /// linear in the number of types.
    fn validate_bases<P: ReflectionProvider + ?Sized>(
        provider: &P,
        names: &[String],
        max_versions: u32,
    ) -> Result<HashMap<String, usize>, RegistryError> {
        let limit = max_versions as usize;
        let mut lengths: HashMap<String, usize> = HashMap::with_capacity(names.len());

        for name in names {
            let mut path: Vec<String> = Vec::new();
            let mut on_path = HashSet::new();
            let mut current = name.clone();
            let below = loop {
                if let Some(known) = lengths.get(&current) {
                    break *known;
                }
                if !on_path.insert(current.clone()) {
                    return Err(RegistryError::SchemaCycle {
                        type_name: name.clone(),
                    });
                }
                if path.len() >= limit {
                    return Err(RegistryError::ChainTooLong {
                        type_name: name.clone(),
                        length: path.len() + 1,
                        limit: max_versions,
                    });
                }
                let base = provider.resolve_base(&current);
                path.push(current);
                let Some(base) = base else {
                    break 0;
                };
                if !provider.contains(&base) {
                    let type_name = path.pop().unwrap_or_default();
                    return Err(RegistryError::DanglingBase { type_name, base });
                }
                current = base;
            };

            let length = below + path.len();
            if length > limit {
                return Err(RegistryError::ChainTooLong {
                    type_name: name.clone(),
                    length,
                    limit: max_versions,
                });
            }
            for (depth, type_name) in path.into_iter().rev().enumerate() {
                lengths.insert(type_name, below + depth + 1);
            }
        }
        Ok(lengths)
    }

    /// Chain ending at `type_name`.
    pub fn resolve(&self, type_name: &str) -> Result<&SchemaChain, RegistryError> {
        self.chains
            .get(type_name)
            .ok_or_else(|| RegistryError::SchemaNotFound(type_name.to_string()))
    }

    /// Schema version named `type_name`.
    pub fn schema(&self, type_name: &str) -> Result<&Arc<SchemaVersion>, RegistryError> {
        self.resolve(type_name).map(SchemaChain::latest)
    }

    /// Fresh value of `type_name` holding every field's default.
    pub fn new_value(&self, type_name: &str) -> Result<VersionedValue, RegistryError> {
        self.schema(type_name).map(VersionedValue::new)
    }

    /// List all registered type names (sorted for determinism).
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.chains.keys().cloned().collect();
        names.sort();
        names
    }

    /// Total number of registered type names.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Codec entry points
    // -----------------------------------------------------------------------

    /// Encode a value with its own schema's version header.
    pub fn write(&self, value: &VersionedValue) -> Result<Vec<u8>, WriteError> {
        codec::encode(value)
    }

    /// Encode a value into a sink; returns the number of bytes written.
    pub fn write_to<S: ByteSink + ?Sized>(
        &self,
        value: &VersionedValue,
        sink: &mut S,
    ) -> Result<usize, WriteError> {
        codec::encode_into(value, sink)
    }

    /// Decode a blob written by any version of `type_name` and promote it.
    ///
    /// Bytes after the payload are left unread.
    pub fn read(&self, type_name: &str, bytes: &[u8]) -> Result<VersionedValue, ReadError> {
        Ok(self.read_detailed(type_name, bytes)?.value)
    }

    /// Like [`read`](Self::read), also reporting the version found in the header.
    pub fn read_detailed(&self, type_name: &str, bytes: &[u8]) -> Result<Decoded, ReadError> {
        let mut source = SliceSource::new(bytes);
        self.read_from_detailed(type_name, &mut source)
    }

    /// Decode one blob from a source.
    pub fn read_from<S: ByteSource + ?Sized>(
        &self,
        type_name: &str,
        source: &mut S,
    ) -> Result<VersionedValue, ReadError> {
        Ok(self.read_from_detailed(type_name, source)?.value)
    }

    pub fn read_from_detailed<S: ByteSource + ?Sized>(
        &self,
        type_name: &str,
        source: &mut S,
    ) -> Result<Decoded, ReadError> {
        let chain = self
            .chains
            .get(type_name)
            .ok_or_else(|| ReadError::SchemaNotFound(type_name.to_string()))?;
        codec::decode_from(chain, source, self.config.max_versions)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
