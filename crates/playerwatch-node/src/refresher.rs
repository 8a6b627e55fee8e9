//! Background profile resolution.
//!
//! Registries hand their profile slots to a [`ProfileRefresher`], which
//! resolves the canonical name, identifier and portrait through a
//! [`ProfileService`] on the tokio runtime. A semaphore bounds the number of
//! lookups in flight; the service itself is called on the blocking pool.

use crate::error::{Error, Result};
use playerwatch_registry::{Portrait, ProfileId, ProfileSlot, RefreshScheduler, ResolvedProfile};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Result of looking up an account by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLookup {
    /// Canonical spelling of the name
    pub name: String,
    pub id: ProfileId,
}

/// Remote profile directory. Calls may block.
pub trait ProfileService: Send + Sync + 'static {
    /// Find the account called `name`.
    fn lookup(&self, name: &str) -> Option<ProfileLookup>;

    /// Fetch the portrait of account `id`.
    fn fetch_portrait(&self, id: &ProfileId) -> Option<Portrait>;
}

/// Service used when no profile directory is reachable. Every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProfiles;

impl ProfileService for OfflineProfiles {
    fn lookup(&self, _name: &str) -> Option<ProfileLookup> {
        None
    }

    fn fetch_portrait(&self, _id: &ProfileId) -> Option<Portrait> {
        None
    }
}

/// Bounded background resolver for profile slots.
#[derive(Clone)]
pub struct ProfileRefresher {
    service: Arc<dyn ProfileService>,
    permits: Arc<Semaphore>,
    runtime: Handle,
}

impl ProfileRefresher {
    /// Create a refresher running at most `max_lookups` lookups at once.
    pub fn new(service: Arc<dyn ProfileService>, max_lookups: usize, runtime: Handle) -> Self {
        Self {
            service,
            permits: Arc::new(Semaphore::new(max_lookups.max(1))),
            runtime,
        }
    }

    /// Create a refresher on the runtime of the calling task.
    pub fn current(service: Arc<dyn ProfileService>, max_lookups: usize) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;
        Ok(Self::new(service, max_lookups, runtime))
    }

    /// Start resolving `name` into `slot`.
    ///
    /// Returns `None` without doing anything when the slot already has a
    /// resolution in flight.
    pub fn spawn(&self, slot: Arc<ProfileSlot>, name: &str) -> Option<JoinHandle<()>> {
        if !slot.begin_update() {
            tracing::trace!("Profile of {} already updating", name);
            return None;
        }

        let service = Arc::clone(&self.service);
        let permits = Arc::clone(&self.permits);
        let name = name.to_string();

        Some(self.runtime.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                slot.abandon();
                return;
            };

            let lookup_name = name.clone();
            let resolved =
                tokio::task::spawn_blocking(move || resolve(service.as_ref(), &lookup_name)).await;

            match resolved {
                Ok(Some(profile)) => {
                    tracing::debug!("Resolved profile of {} as {}", name, profile.id);
                    slot.apply(profile);
                }
                Ok(None) => {
                    tracing::warn!("Could not resolve profile of {}", name);
                    slot.abandon();
                }
                Err(e) => {
                    tracing::warn!("Profile lookup for {} failed: {}", name, e);
                    slot.abandon();
                }
            }
        }))
    }
}

impl RefreshScheduler for ProfileRefresher {
    fn schedule(&self, slot: Arc<ProfileSlot>, name: &str) {
        self.spawn(slot, name);
    }
}

fn resolve(service: &dyn ProfileService, name: &str) -> Option<ResolvedProfile> {
    let lookup = service.lookup(name)?;
    let portrait = service.fetch_portrait(&lookup.id);
    if portrait.is_none() {
        tracing::debug!("No portrait for {}", lookup.name);
    }
    Some(ResolvedProfile {
        name: lookup.name,
        id: lookup.id,
        portrait,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use playerwatch_registry::{FlagKind, FlagRegistry, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Knows "notch" and "jeb_", records every lookup.
    #[derive(Default)]
    struct MockService {
        lookups: Mutex<Vec<String>>,
        active: AtomicUsize,
        peak: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ProfileService for MockService {
        fn lookup(&self, name: &str) -> Option<ProfileLookup> {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(active, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.lookups.lock().push(name.to_string());
            self.active.fetch_sub(1, Ordering::SeqCst);

            let canonical = match name.to_ascii_lowercase().as_str() {
                "notch" => "Notch",
                "jeb_" => "jeb_",
                _ => return None,
            };
            Some(ProfileLookup {
                name: canonical.to_string(),
                id: ProfileId::new(format!("id-{}", canonical))?,
            })
        }

        fn fetch_portrait(&self, id: &ProfileId) -> Option<Portrait> {
            (id.as_str() == "id-Notch").then(|| Portrait::new(vec![7u8; 4]))
        }
    }

    fn refresher(service: Arc<MockService>, max: usize) -> ProfileRefresher {
        ProfileRefresher::current(service, max).unwrap()
    }

    #[tokio::test]
    async fn resolves_into_slot() {
        let service = Arc::new(MockService::default());
        let refresher = refresher(service.clone(), 2);
        let slot = Arc::new(ProfileSlot::new());

        refresher.spawn(slot.clone(), "notch").unwrap().await.unwrap();

        let profile = slot.snapshot();
        assert_eq!(profile.canonical_name.as_deref(), Some("Notch"));
        assert_eq!(profile.id.unwrap().as_str(), "id-Notch");
        assert_eq!(profile.portrait.unwrap().bytes(), &[7, 7, 7, 7]);
        assert!(!profile.updating);
    }

    #[tokio::test]
    async fn missing_portrait_still_resolves() {
        let refresher = refresher(Arc::new(MockService::default()), 2);
        let slot = Arc::new(ProfileSlot::new());

        refresher.spawn(slot.clone(), "jeb_").unwrap().await.unwrap();

        assert_eq!(slot.id().unwrap().as_str(), "id-jeb_");
        assert!(slot.portrait().is_none());
        assert!(slot.needs_refresh());
    }

    #[tokio::test]
    async fn failed_lookup_clears_updating() {
        let refresher = refresher(Arc::new(MockService::default()), 2);
        let slot = Arc::new(ProfileSlot::new());

        refresher.spawn(slot.clone(), "Nobody").unwrap().await.unwrap();

        let profile = slot.snapshot();
        assert!(!profile.updating);
        assert!(profile.canonical_name.is_none());
        assert!(profile.id.is_none());
    }

    #[tokio::test]
    async fn in_flight_slot_is_not_rescheduled() {
        let service = Arc::new(MockService::default());
        let refresher = refresher(service.clone(), 2);
        let slot = Arc::new(ProfileSlot::new());

        assert!(slot.begin_update());
        assert!(refresher.spawn(slot.clone(), "notch").is_none());
        assert!(service.lookups.lock().is_empty());
    }

    #[tokio::test]
    async fn lookups_are_bounded() {
        let service = Arc::new(MockService {
            delay: Some(Duration::from_millis(20)),
            ..MockService::default()
        });
        let refresher = refresher(service.clone(), 1);

        let handles: Vec<_> = ["notch", "jeb_", "Dinnerbone", "Grumm"]
            .iter()
            .filter_map(|name| refresher.spawn(Arc::new(ProfileSlot::new()), name))
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(service.lookups.lock().len(), 4);
        assert_eq!(service.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn registry_schedules_through_refresher() {
        let service = Arc::new(MockService::default());
        let scheduler: Arc<dyn RefreshScheduler> = Arc::new(refresher(service.clone(), 2));
        let mut registry = FlagRegistry::new(FlagKind::Scary, Arc::new(MemoryStore::new()))
            .with_refresher(scheduler);

        assert!(registry.add("notch"));
        let record = registry.get("notch").unwrap().clone();
        for _ in 0..200 {
            if !record.profile().is_updating() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(record.name(), "notch");
        assert_eq!(record.display_name(), "Notch");
        assert!(record.portrait().is_some());
    }
}
