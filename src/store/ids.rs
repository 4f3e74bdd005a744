use chrono::Utc;

/// Hands out list and item ids.
///
/// Ids follow the wall clock in milliseconds, so they sort by creation time
/// and stay compatible with ids already on disk, but never repeat: when two
/// ids are requested within the same millisecond (or the clock steps back)
/// the next id is the previous one plus one.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    last: i64,
    clock: fn() -> i64,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl IdGenerator {
    pub fn new() -> Self {
        IdGenerator {
            last: 0,
            clock: now_millis,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_clock(clock: fn() -> i64) -> Self {
        IdGenerator { last: 0, clock }
    }

    /// Make sure no future id is `<= id`
    pub fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }

    pub fn next_id(&mut self) -> i64 {
        let id = (self.clock)().max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
