//! Deadline-based debouncing of typed search input.
//!
//! The buffer never sleeps itself. Callers feed it input with the current
//! time and poll it; whoever drives the view waits until
//! [`DebouncedInput::deadline`] and polls again.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct DebouncedInput {
    value: String,
    interval: Duration,
    deadline: Option<Instant>,
}

impl DebouncedInput {
    pub fn new(interval: Duration) -> Self {
        Self {
            value: String::new(),
            interval,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Latest raw value, committed or not
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Record new input and push the commit deadline out by one interval
    pub fn on_input(&mut self, value: &str, now: Instant) {
        self.value = value.to_string();
        self.deadline = Some(now + self.interval);
    }

    /// Take the pending value once its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                Some(self.value.clone())
            }
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop any pending commit
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(500);

    #[test]
    fn test_commit_after_interval() {
        let start = Instant::now();
        let mut input = DebouncedInput::new(INTERVAL);
        input.on_input("jo", start);

        assert_eq!(input.poll(start + Duration::from_millis(499)), None);
        assert_eq!(input.poll(start + INTERVAL), Some("jo".to_string()));
        assert!(!input.is_pending());
    }

    #[test]
    fn test_rapid_inputs_coalesce_into_last_value() {
        let start = Instant::now();
        let mut input = DebouncedInput::new(INTERVAL);
        let mut commits = Vec::new();

        for (i, value) in ["j", "jo", "joh", "john"].iter().enumerate() {
            let now = start + Duration::from_millis(100 * i as u64);
            commits.extend(input.poll(now));
            input.on_input(value, now);
        }

        let end = start + Duration::from_secs(5);
        commits.extend(input.poll(end));
        commits.extend(input.poll(end));
        assert_eq!(commits, vec!["john".to_string()]);
    }

    #[test]
    fn test_new_input_restarts_the_interval() {
        let start = Instant::now();
        let mut input = DebouncedInput::new(INTERVAL);
        input.on_input("a", start);
        input.on_input("ab", start + Duration::from_millis(400));

        assert_eq!(input.poll(start + Duration::from_millis(600)), None);
        assert_eq!(
            input.deadline(),
            Some(start + Duration::from_millis(900))
        );
    }

    #[test]
    fn test_cancel_drops_pending_commit() {
        let start = Instant::now();
        let mut input = DebouncedInput::new(INTERVAL);
        input.on_input("abc", start);
        input.cancel();
        assert_eq!(input.poll(start + Duration::from_secs(1)), None);
        assert_eq!(input.value(), "abc");
    }
}
