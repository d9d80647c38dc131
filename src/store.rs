//! Persistent key/value storage for finished plans.

use fnv::FnvHashMap;

pub trait PlanStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn delete(&mut self, key: &str);

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory store, for offline planning and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryPlanStore {
    entries: FnvHashMap<String, String>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for MemoryPlanStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
