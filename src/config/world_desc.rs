use crate::container::SearchOptions;

/// Configuration descriptor for an AudioNest world
#[derive(Debug, Clone)]
pub struct AudioNestDesc {
    /// Search flags used by name-addressed operations that don't pass their own
    pub default_search: SearchOptions,
    /// Whether position-based audibility queries evaluate each child from its own position
    pub attention_to_child_position: bool,
    /// Events kept until [`poll_events`](crate::AudioNestWorld::poll_events) drains them;
    /// newer events are dropped while the queue is full, and 0 disables events
    pub event_capacity: usize,
}

impl Default for AudioNestDesc {
    fn default() -> Self {
        Self {
            default_search: SearchOptions::default(),
            attention_to_child_position: true,
            event_capacity: 1024,
        }
    }
}

impl AudioNestDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_search(mut self, search: SearchOptions) -> Self {
        self.default_search = search;
        self
    }

    pub fn attention_to_child_position(mut self, enable: bool) -> Self {
        self.attention_to_child_position = enable;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}
