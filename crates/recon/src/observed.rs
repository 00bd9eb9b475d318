//! Observed-state resolution.
//!
//! A scan may record a standard either as a flattened property on the tenant
//! snapshot (`"standards.AuditLog": true`) or as an entry in its
//! `standardsResults` list. Each storage shape is one [`ObservedResolver`];
//! a [`ResolverChain`] asks them in order and returns the first hit.

use crate::model::{Observed, ObservedSource, StandardId, TenantSnapshot};
use crate::value::Value;

pub trait ObservedResolver {
    fn resolve(&self, id: &StandardId) -> Option<Observed>;
}

/// Flattened property keyed exactly by the standard id. JSON `null` is
/// treated as absent; every other value, including `true`, is a hit.
pub struct DirectProperty<'a> {
    snapshot: &'a TenantSnapshot,
}

impl<'a> DirectProperty<'a> {
    pub fn new(snapshot: &'a TenantSnapshot) -> Self {
        Self { snapshot }
    }
}

impl ObservedResolver for DirectProperty<'_> {
    fn resolve(&self, id: &StandardId) -> Option<Observed> {
        let raw = self.snapshot.properties.get(id.as_str())?;
        if raw.is_null() {
            return None;
        }
        Some(Observed {
            value: Value::from(raw.clone()),
            source: ObservedSource::Direct,
        })
    }
}

/// First `standardsResults` entry whose `standardId` matches.
pub struct ResultsList<'a> {
    snapshot: &'a TenantSnapshot,
}

impl<'a> ResultsList<'a> {
    pub fn new(snapshot: &'a TenantSnapshot) -> Self {
        Self { snapshot }
    }
}

impl ObservedResolver for ResultsList<'_> {
    fn resolve(&self, id: &StandardId) -> Option<Observed> {
        let entry = self
            .snapshot
            .standards_results
            .as_ref()?
            .iter()
            .find(|r| r.standard_id == id.as_str())?;
        let value = entry.value.clone()?;
        Some(Observed {
            value,
            source: ObservedSource::ResultsList,
        })
    }
}

/// The tenant has no snapshot; nothing was observed.
pub struct NoSnapshot;

impl ObservedResolver for NoSnapshot {
    fn resolve(&self, _id: &StandardId) -> Option<Observed> {
        None
    }
}

#[derive(Default)]
pub struct ResolverChain<'a> {
    links: Vec<Box<dyn ObservedResolver + 'a>>,
}

impl<'a> ResolverChain<'a> {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    pub fn with(mut self, resolver: impl ObservedResolver + 'a) -> Self {
        self.links.push(Box::new(resolver));
        self
    }

    /// Direct property first, then the results list.
    pub fn for_snapshot(snapshot: &'a TenantSnapshot) -> Self {
        Self::new()
            .with(DirectProperty::new(snapshot))
            .with(ResultsList::new(snapshot))
    }
}

impl ObservedResolver for ResolverChain<'_> {
    fn resolve(&self, id: &StandardId) -> Option<Observed> {
        self.links.iter().find_map(|link| link.resolve(id))
    }
}

/// Most recent observed value for `id` on `snapshot`, if any.
pub fn extract_observed(snapshot: &TenantSnapshot, id: &StandardId) -> Option<Observed> {
    ResolverChain::for_snapshot(snapshot).resolve(id)
}
