//! Per-session conversation contexts.
//!
//! Session subjects come from unsigned tokens, so the store is bounded: once it holds
//! `capacity` conversations, starting a new one evicts the least recently used.

use discharge_core::ConversationContext;
use std::collections::HashMap;

/// Conversations kept by the REST server before eviction starts.
pub const MAX_CONVERSATIONS: usize = 1024;

struct Entry {
    context: ConversationContext,
    last_used: u64,
}

pub struct ConversationStore {
    entries: HashMap<String, Entry>,
    capacity: usize,
    tick: u64,
}

impl ConversationStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    /// Context for `subject`, created on first use.
    pub fn context_mut(&mut self, subject: &str) -> &mut ConversationContext {
        self.tick += 1;
        let tick = self.tick;

        if !self.entries.contains_key(subject) && self.entries.len() >= self.capacity {
            self.evict_least_recent();
        }

        let entry = self
            .entries
            .entry(subject.to_owned())
            .or_insert_with(|| Entry {
                context: ConversationContext::default(),
                last_used: tick,
            });
        entry.last_used = tick;
        &mut entry.context
    }

    pub fn get(&self, subject: &str) -> Option<&ConversationContext> {
        self.entries.get(subject).map(|e| &e.context)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(subject, _)| subject.clone());
        if let Some(subject) = oldest {
            tracing::debug!(%subject, "evicting conversation context");
            self.entries.remove(&subject);
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(MAX_CONVERSATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discharge_core::IntentKind;

    #[test]
    fn creates_context_on_first_use() {
        let mut store = ConversationStore::new(4);
        assert!(store.is_empty());
        store.context_mut("nurse@hospital.com").last_intent = Some(IntentKind::Help);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("nurse@hospital.com").unwrap().last_intent,
            Some(IntentKind::Help)
        );
    }

    #[test]
    fn stays_bounded_under_many_subjects() {
        let mut store = ConversationStore::new(3);
        for i in 0..100 {
            store.context_mut(&format!("forged-{i}"));
        }
        assert_eq!(store.len(), 3);
        assert!(store.get("forged-0").is_none());
        assert!(store.get("forged-99").is_some());
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut store = ConversationStore::new(2);
        store.context_mut("a");
        store.context_mut("b");
        store.context_mut("a");
        store.context_mut("c");
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert!(store.get("c").is_some());
    }
}
