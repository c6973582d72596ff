use crate::NodeIndex;
use std::collections::HashMap;

/// Index from trigger id to the nodes currently waiting on it
///
/// Owned by a single runner. Nested runners keep their own registry, so a
/// signal never crosses a SubFlow boundary.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    waiting: HashMap<String, Vec<NodeIndex>>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Append a waiter. Registering the same node twice yields two entries.
    pub fn register_wait(&mut self, node: NodeIndex, trigger_id: &str) {
        tracing::trace!("Node {} waiting on trigger '{}'", node, trigger_id);
        self.waiting
            .entry(trigger_id.to_string())
            .or_default()
            .push(node);
    }
    
    /// Remove one registration of `node`; no-op if absent
    pub fn unregister_wait(&mut self, node: NodeIndex, trigger_id: &str) {
        if let Some(list) = self.waiting.get_mut(trigger_id) {
            if let Some(pos) = list.iter().position(|n| *n == node) {
                list.remove(pos);
            }
            if list.is_empty() {
                self.waiting.remove(trigger_id);
            }
        }
    }
    
    /// Nodes waiting on `trigger_id`, in registration order
    pub fn waiting(&self, trigger_id: &str) -> &[NodeIndex] {
        self.waiting
            .get(trigger_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
    
    pub fn is_waiting(&self, trigger_id: &str) -> bool {
        !self.waiting(trigger_id).is_empty()
    }
    
    /// Trigger ids with at least one waiter
    pub fn trigger_ids(&self) -> impl Iterator<Item = &str> {
        self.waiting.keys().map(|k| k.as_str())
    }
    
    pub fn len(&self) -> usize {
        self.waiting.values().map(Vec::len).sum()
    }
    
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
    
    pub fn clear(&mut self) {
        self.waiting.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let mut registry = TriggerRegistry::new();
        registry.register_wait(NodeIndex(1), "door");
        registry.register_wait(NodeIndex(2), "door");
        registry.register_wait(NodeIndex(1), "door");

        assert_eq!(registry.waiting("door"), &[NodeIndex(1), NodeIndex(2), NodeIndex(1)]);
        assert_eq!(registry.len(), 3);

        // One registration removed per call
        registry.unregister_wait(NodeIndex(1), "door");
        assert_eq!(registry.waiting("door"), &[NodeIndex(2), NodeIndex(1)]);

        registry.unregister_wait(NodeIndex(2), "door");
        registry.unregister_wait(NodeIndex(1), "door");
        assert!(!registry.is_waiting("door"));
        assert!(registry.is_empty());
        assert_eq!(registry.trigger_ids().count(), 0);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let mut registry = TriggerRegistry::new();
        registry.register_wait(NodeIndex(0), "lever");

        registry.unregister_wait(NodeIndex(3), "lever");
        registry.unregister_wait(NodeIndex(0), "missing");

        assert_eq!(registry.waiting("lever"), &[NodeIndex(0)]);
        assert!(registry.waiting("missing").is_empty());
    }
}
