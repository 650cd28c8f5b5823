//! Human-like pacing between page interactions

use crate::config::PacingSettings;
use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// What the pause comes before / after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceStep {
    /// Page load after a navigation
    AfterNavigation,
    /// Between a search page and the first job
    AfterSearch,
    BetweenJobs,
    BeforeClick,
    BetweenFields,
}

/// Decides how long to wait at each step
#[async_trait]
pub trait DelayPolicy: Send + Sync {
    async fn pause(&self, step: PaceStep);
}

/// Random delays drawn from the configured ranges
#[derive(Debug, Clone)]
pub struct RandomPacing {
    short_ms: (u64, u64),
    long_ms: (u64, u64),
}

impl RandomPacing {
    pub fn new(settings: &PacingSettings) -> Self {
        Self {
            short_ms: ordered(settings.short_ms),
            long_ms: ordered(settings.long_ms),
        }
    }

    /// Range in milliseconds for a step
    pub fn range(&self, step: PaceStep) -> (u64, u64) {
        match step {
            PaceStep::AfterNavigation | PaceStep::AfterSearch | PaceStep::BetweenJobs => {
                self.long_ms
            }
            PaceStep::BeforeClick | PaceStep::BetweenFields => self.short_ms,
        }
    }
}

fn ordered([a, b]: [u64; 2]) -> (u64, u64) {
    (a.min(b), a.max(b))
}

#[async_trait]
impl DelayPolicy for RandomPacing {
    async fn pause(&self, step: PaceStep) {
        let (min, max) = self.range(step);
        let ms = OsRng.gen_range(min..=max);
        sleep(Duration::from_millis(ms)).await;
    }
}

/// No waiting at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl DelayPolicy for NoDelay {
    async fn pause(&self, _step: PaceStep) {}
}

/// Policy selected by config
pub fn from_settings(settings: &PacingSettings) -> Box<dyn DelayPolicy> {
    if settings.enabled {
        Box::new(RandomPacing::new(settings))
    } else {
        Box::new(NoDelay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_follow_step_kind() {
        let pacing = RandomPacing::new(&PacingSettings {
            enabled: true,
            short_ms: [900, 300],
            long_ms: [1500, 2900],
        });

        assert_eq!(pacing.range(PaceStep::BetweenFields), (300, 900));
        assert_eq!(pacing.range(PaceStep::AfterNavigation), (1500, 2900));
        assert_eq!(pacing.range(PaceStep::BetweenJobs), (1500, 2900));
    }

    #[tokio::test]
    async fn zero_width_range_does_not_panic() {
        let pacing = RandomPacing::new(&PacingSettings {
            enabled: true,
            short_ms: [0, 0],
            long_ms: [0, 0],
        });
        pacing.pause(PaceStep::BeforeClick).await;
    }
}
