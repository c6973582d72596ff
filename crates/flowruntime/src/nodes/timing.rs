use super::NodeCx;

/// Waits for a fixed number of seconds of accumulated tick time
#[derive(Debug, Clone)]
pub struct DelayNode {
    seconds: f32,
    remaining: f32,
}

impl DelayNode {
    pub fn new(seconds: f32) -> Self {
        Self {
            seconds,
            remaining: seconds,
        }
    }
    
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
    
    pub(crate) fn enter(&mut self) {
        self.remaining = self.seconds;
    }
    
    pub(crate) fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
    
    pub(crate) fn status(&self) -> String {
        format!("{:.2} / {:.2} seconds remaining", self.remaining, self.seconds)
    }
}

/// Blocks until its trigger is signalled on the owning runner
#[derive(Debug, Clone)]
pub struct WaitForTriggerNode {
    trigger_id: String,
    fired: bool,
}

impl WaitForTriggerNode {
    pub fn new(trigger_id: String) -> Self {
        Self {
            trigger_id,
            fired: false,
        }
    }
    
    pub fn trigger_id(&self) -> &str {
        &self.trigger_id
    }
    
    pub fn fired(&self) -> bool {
        self.fired
    }
    
    pub(crate) fn enter(&mut self, cx: &mut NodeCx<'_>) {
        self.fired = false;
        
        // No id means nothing can ever wake us; stay blocked unregistered
        if !self.trigger_id.is_empty() {
            cx.triggers.register_wait(cx.this, &self.trigger_id);
        }
    }
    
    pub(crate) fn tick(&self) -> bool {
        self.fired
    }
    
    pub(crate) fn exit(&mut self, cx: &mut NodeCx<'_>) {
        if !self.trigger_id.is_empty() {
            cx.triggers.unregister_wait(cx.this, &self.trigger_id);
        }
    }
    
    pub(crate) fn signal(&mut self) {
        self.fired = true;
    }
    
    pub(crate) fn status(&self) -> String {
        format!("Trigger='{}', Fired={}", self.trigger_id, self.fired)
    }
}
