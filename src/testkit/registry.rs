use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{self, Result};
use crate::registry::{RegistryStore, ServiceInstance};

#[derive(Debug, Clone)]
struct Registration {
    service: String,
    tags: Vec<String>,
    instance: ServiceInstance,
}

/// In-memory [`RegistryStore`]
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    services: Mutex<Vec<Registration>>,
    unavailable: AtomicBool,
    gets: AtomicUsize,
    puts: AtomicUsize,
    lists: AtomicUsize,
    lookups: AtomicUsize,
}

impl MemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a healthy instance of `service`
    pub fn register_service(&self, service: &str, tags: &[&str], instance: ServiceInstance) {
        self.services.lock().expect("services lock").push(Registration {
            service: service.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            instance,
        });
    }

    /// Make every call fail as if the store were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current contents
    pub fn entries(&self) -> BTreeMap<String, Vec<u8>> {
        self.entries.lock().expect("entries lock").clone()
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Zero all call counters
    pub fn reset_counts(&self) {
        for counter in [&self.gets, &self.puts, &self.lists, &self.lookups] {
            counter.store(0, Ordering::SeqCst);
        }
    }

    fn check(&self, counter: &AtomicUsize) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(error::registry::unavailable("connection refused"));
        }
        Ok(())
    }
}

impl RegistryStore for MemoryRegistry {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.check(&self.gets)?;
        Ok(self.entries.lock().expect("entries lock").get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.check(&self.puts)?;
        self.entries
            .lock()
            .expect("entries lock")
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.check(&self.lists)?;
        Ok(self
            .entries
            .lock()
            .expect("entries lock")
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn catalog_lookup(&self, service: &str, tag: Option<&str>) -> Result<Vec<ServiceInstance>> {
        self.check(&self.lookups)?;
        Ok(self
            .services
            .lock()
            .expect("services lock")
            .iter()
            .filter(|r| r.service == service)
            .filter(|r| tag.is_none_or(|t| r.tags.iter().any(|rt| rt == t)))
            .map(|r| r.instance.clone())
            .collect())
    }
}
