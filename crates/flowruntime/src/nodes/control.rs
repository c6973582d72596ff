use super::NodeCx;

/// Picks the first option whose condition the world reports true
///
/// The decision is taken on enter; tick is instantaneous.
#[derive(Debug, Clone)]
pub struct BranchNode {
    condition_ids: Vec<String>,
    next_ids: Vec<String>,
    chosen: Option<usize>,
}

impl BranchNode {
    pub fn new(condition_ids: Vec<String>, next_ids: Vec<String>) -> Self {
        Self {
            condition_ids,
            next_ids,
            chosen: None,
        }
    }
    
    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }
    
    pub(crate) fn enter(&mut self, cx: &mut NodeCx<'_>) {
        self.chosen = None;
        
        let Some(world) = cx.world else {
            return;
        };
        
        // Options beyond the shorter of the two arrays are ignored
        self.chosen = self
            .condition_ids
            .iter()
            .zip(&self.next_ids)
            .position(|(condition, _)| !condition.is_empty() && world.is_condition_true(condition));
    }
    
    /// Chosen option's target; `None` falls back to the static successor
    pub(crate) fn successor_id(&self) -> Option<&str> {
        self.chosen
            .and_then(|i| self.next_ids.get(i))
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
    
    pub(crate) fn status(&self) -> String {
        match self.chosen {
            Some(i) => format!(
                "chose option {} ('{}' -> '{}')",
                i,
                self.condition_ids.get(i).map(String::as_str).unwrap_or(""),
                self.next_ids.get(i).map(String::as_str).unwrap_or(""),
            ),
            None => format!("no option taken of {}", self.condition_ids.len().min(self.next_ids.len())),
        }
    }
}

/// Runs each step's sub-chain in turn, regaining control through the
/// return stack when a step dead-ends
#[derive(Debug, Clone)]
pub struct SequenceNode {
    step_ids: Vec<String>,
    /// `None` until first entered
    step: Option<usize>,
}

impl SequenceNode {
    pub fn new(step_ids: Vec<String>) -> Self {
        Self {
            step_ids,
            step: None,
        }
    }
    
    pub fn step(&self) -> Option<usize> {
        self.step
    }
    
    pub fn is_complete(&self) -> bool {
        self.step.is_some_and(|s| s >= self.step_ids.len())
    }
    
    fn in_range(&self) -> bool {
        self.step.is_some_and(|s| s < self.step_ids.len())
    }
    
    pub(crate) fn enter(&mut self, cx: &mut NodeCx<'_>) {
        if self.step_ids.is_empty() {
            return;
        }
        
        // At most one pending resume point per sequence
        cx.returns.remove_all(cx.this);
        
        let next = match self.step {
            None => 0,
            Some(s) => s + 1,
        };
        self.step = Some(next.min(self.step_ids.len()));
    }
    
    /// Current step head; `None` once every step has run
    pub(crate) fn successor_id(&self) -> Option<&str> {
        if !self.in_range() {
            return None;
        }
        
        self.step
            .and_then(|s| self.step_ids.get(s))
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
    
    pub(crate) fn exit(&mut self, cx: &mut NodeCx<'_>) {
        if self.in_range() {
            cx.returns.push(cx.this);
        }
    }
    
    pub(crate) fn status(&self) -> String {
        let total = self.step_ids.len();
        if total == 0 {
            return "(no steps configured)".to_string();
        }
        
        match self.step {
            _ if self.is_complete() => format!("complete ({} steps)", total),
            Some(s) => format!("step {}/{}", s, total),
            None => format!("not started ({} steps)", total),
        }
    }
}

/// Re-enters its body until the iteration limit is exceeded
///
/// The body chain must route back to this node's id itself; loops do not
/// use the return stack.
#[derive(Debug, Clone)]
pub struct LoopNode {
    body_id: Option<String>,
    /// 0 = unbounded
    iteration_limit: u32,
    iteration: u32,
    finished: bool,
}

impl LoopNode {
    pub fn new(body_id: Option<String>, iteration_limit: u32) -> Self {
        Self {
            body_id,
            iteration_limit,
            iteration: 0,
            finished: false,
        }
    }
    
    pub fn iteration(&self) -> u32 {
        self.iteration
    }
    
    pub fn is_finished(&self) -> bool {
        self.finished
    }
    
    pub(crate) fn enter(&mut self) {
        self.iteration = self.iteration.saturating_add(1);
        self.finished = self.iteration_limit > 0 && self.iteration > self.iteration_limit;
    }
    
    /// Body head while iterating; `None` falls back to the static successor
    pub(crate) fn successor_id(&self) -> Option<&str> {
        if self.finished {
            return None;
        }
        self.body_id.as_deref().filter(|id| !id.is_empty())
    }
    
    pub(crate) fn status(&self) -> String {
        let mode = if self.iteration_limit == 0 {
            "infinite".to_string()
        } else {
            format!("{}/{}", self.iteration, self.iteration_limit)
        };
        format!("iteration={}, mode={}, finished={}", self.iteration, mode, self.finished)
    }
}
