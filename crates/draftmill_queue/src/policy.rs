//! Queue policy: retry ceiling, rejection budget, lease TTL.

use chrono::Duration;

/// Tunable limits for the topic queue.
///
/// The ceilings are deliberately configuration, not constants baked into
/// the transition logic: generation failures (`max_retries`) and quality
/// rejections (`max_rejections`) are different failure classes with
/// separate budgets.
#[derive(Debug, Clone)]
pub struct QueuePolicy {
    /// Generation failures before a topic is abandoned.
    pub max_retries: u32,
    /// Quality-gate rejections before a topic is abandoned.
    pub max_rejections: u32,
    /// Lease age past which `reclaim_stuck` returns a topic to pending.
    pub lease_ttl: Duration,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_rejections: 2,
            lease_ttl: Duration::hours(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_has_separate_budgets() {
        let policy = QueuePolicy::default();
        assert!(policy.max_retries > 0);
        assert!(policy.max_rejections > 0);
        assert!(policy.lease_ttl > Duration::zero());
    }
}
