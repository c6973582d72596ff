use crate::NodeIndex;

/// LIFO of resume points for nodes that delegated to a sub-chain
#[derive(Debug, Default)]
pub struct ReturnStack {
    entries: Vec<NodeIndex>,
}

impl ReturnStack {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn push(&mut self, node: NodeIndex) {
        self.entries.push(node);
    }
    
    /// Pop the most recent entry accepted by `is_valid`, discarding any
    /// rejected entries above it.
    pub fn pop_valid(&mut self, is_valid: impl Fn(NodeIndex) -> bool) -> Option<NodeIndex> {
        while let Some(node) = self.entries.pop() {
            if is_valid(node) {
                return Some(node);
            }
            tracing::debug!("Discarding stale return entry {}", node);
        }
        None
    }
    
    /// Scrub every occurrence of `node`, keeping the others in order
    pub fn remove_all(&mut self, node: NodeIndex) {
        self.entries.retain(|n| *n != node);
    }
    
    pub fn contains(&self, node: NodeIndex) -> bool {
        self.entries.contains(&node)
    }
    
    pub fn peek(&self) -> Option<NodeIndex> {
        self.entries.last().copied()
    }
    
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_is_lifo() {
        let mut stack = ReturnStack::new();
        stack.push(NodeIndex(1));
        stack.push(NodeIndex(2));

        assert_eq!(stack.peek(), Some(NodeIndex(2)));
        assert_eq!(stack.pop_valid(|_| true), Some(NodeIndex(2)));
        assert_eq!(stack.pop_valid(|_| true), Some(NodeIndex(1)));
        assert_eq!(stack.pop_valid(|_| true), None);
    }

    #[test]
    fn test_pop_valid_discards_stale_entries() {
        let mut stack = ReturnStack::new();
        stack.push(NodeIndex(0));
        stack.push(NodeIndex(7));
        stack.push(NodeIndex(9));

        assert_eq!(stack.pop_valid(|n| n.index() < 5), Some(NodeIndex(0)));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_remove_all_keeps_order() {
        let mut stack = ReturnStack::new();
        for i in [1, 2, 1, 3, 1] {
            stack.push(NodeIndex(i));
        }

        stack.remove_all(NodeIndex(1));

        assert!(!stack.contains(NodeIndex(1)));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop_valid(|_| true), Some(NodeIndex(3)));
        assert_eq!(stack.pop_valid(|_| true), Some(NodeIndex(2)));
    }
}
