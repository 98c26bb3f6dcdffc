/// In-memory wizard session store
///
/// Drafts live only for the life of the process: created when a wizard
/// starts, destroyed on finalize or abandonment. A restart silently drops
/// in-flight sessions, which callers see as `SessionExpired`. The store is
/// injected into the wizard manager rather than living as a module-level
/// singleton so tests control its lifetime.
use crate::submission::wizard::Draft;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct SessionStore {
    drafts: Mutex<HashMap<String, Draft>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the draft for a user
    pub fn insert(&self, user_id: &str, draft: Draft) {
        let mut drafts = self.drafts.lock().expect("session store lock poisoned");
        drafts.insert(user_id.to_string(), draft);
    }

    /// Cloned snapshot of a user's draft
    pub fn get(&self, user_id: &str) -> Option<Draft> {
        let drafts = self.drafts.lock().expect("session store lock poisoned");
        drafts.get(user_id).cloned()
    }

    pub fn remove(&self, user_id: &str) -> Option<Draft> {
        let mut drafts = self.drafts.lock().expect("session store lock poisoned");
        drafts.remove(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        let drafts = self.drafts.lock().expect("session store lock poisoned");
        drafts.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        let drafts = self.drafts.lock().expect("session store lock poisoned");
        drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
