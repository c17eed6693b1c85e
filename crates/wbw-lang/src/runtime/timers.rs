#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    pub id: String,
    pub label: String,
    /// Seconds until the next firing.
    pub remaining: f64,
    pub interval: f64,
    pub repeat: bool,
}

impl Timer {
    /// Key used when a script gives no explicit id, so re-issuing the same
    /// `after`/`every` line replaces the timer instead of stacking another.
    pub fn derived_id(repeat: bool, seconds: f64, label: &str) -> String {
        let kind = if repeat { "every" } else { "after" };
        format!("{kind}:{seconds}:{label}")
    }
}

/// Timers in installation order, unique by id.
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    timers: Vec<Timer>,
}

impl TimerRegistry {
    /// Install, replacing any timer with the same id in place.
    pub fn install(&mut self, timer: Timer) {
        match self.timers.iter_mut().find(|t| t.id == timer.id) {
            Some(slot) => *slot = timer,
            None => self.timers.push(timer),
        }
    }

    /// Remove timers whose id or target label matches. Returns how many went.
    pub fn cancel(&mut self, key: &str) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != key && t.label != key);
        before - self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Count every timer down by `dt` and return the labels that are due, in
    /// installation order. A repeating timer fires at most once per call.
    pub fn advance(&mut self, dt: f64) -> Vec<String> {
        let mut due = Vec::new();
        self.timers.retain_mut(|t| {
            t.remaining -= dt;
            if t.remaining > 1e-9 {
                return true;
            }
            due.push(t.label.clone());
            if t.repeat {
                t.remaining += t.interval.max(dt);
                if t.remaining <= 1e-9 { t.remaining = t.interval.max(dt); }
                true
            } else {
                false
            }
        });
        due
    }

    pub fn get(&self, id: &str) -> Option<&Timer> {
        self.timers.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timer> {
        self.timers.iter()
    }

    pub fn len(&self) -> usize { self.timers.len() }

    pub fn is_empty(&self) -> bool { self.timers.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(id: &str, label: &str, secs: f64, repeat: bool) -> Timer {
        Timer { id: id.into(), label: label.into(), remaining: secs, interval: secs, repeat }
    }

    #[test]
    fn derived_ids() {
        assert_eq!(Timer::derived_id(true, 1.0, "spawn"), "every:1:spawn");
        assert_eq!(Timer::derived_id(false, 0.5, "boom"), "after:0.5:boom");
    }

    #[test]
    fn close_durations_keep_distinct_ids() {
        assert_ne!(Timer::derived_id(true, 0.5, "a"), Timer::derived_id(true, 0.501, "a"));
        assert_ne!(Timer::derived_id(true, 0.001, "a"), Timer::derived_id(true, 0.002, "a"));
    }

    #[test]
    fn same_id_replaces() {
        let mut r = TimerRegistry::default();
        r.install(timer("every:1:a", "a", 1.0, true));
        r.install(timer("every:1:a", "a", 1.0, true));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn one_shot_fires_once() {
        let mut r = TimerRegistry::default();
        r.install(timer("t", "boom", 0.1, false));
        assert!(r.advance(0.05).is_empty());
        assert_eq!(r.advance(0.05), vec!["boom".to_string()]);
        assert!(r.is_empty());
    }

    #[test]
    fn repeating_reschedules() {
        let mut r = TimerRegistry::default();
        r.install(timer("t", "tick2", 0.5, true));
        let mut fired = 0;
        for _ in 0..20 {
            fired += r.advance(0.1).len();
        }
        assert_eq!(fired, 4);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn cancel_by_id_or_label() {
        let mut r = TimerRegistry::default();
        r.install(timer("a", "x", 1.0, false));
        r.install(timer("b", "y", 1.0, false));
        r.install(timer("c", "y", 1.0, true));
        assert_eq!(r.cancel("y"), 2);
        assert_eq!(r.cancel("a"), 1);
        assert!(r.is_empty());
    }
}
