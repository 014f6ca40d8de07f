use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::ROTATION_INTERVAL;

/// The single currently valid access code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCode {
    pub value: String,
    pub created_at: Instant,
}

impl AccessCode {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

/// Owns the rotating two-digit code that authorizes requests.
///
/// Rotation is a hard cutover: the previous code stops matching the moment a
/// new one is drawn.
pub struct AccessCodeManager {
    current: AccessCode,
    interval: Duration,
    rng: StdRng,
}

impl AccessCodeManager {
    /// Create a manager and draw the first code.
    pub fn new(now: Instant) -> Self {
        Self::with_rng(StdRng::from_entropy(), now)
    }

    pub fn with_rng(rng: StdRng, now: Instant) -> Self {
        let mut manager = Self {
            current: AccessCode {
                value: String::new(),
                created_at: now,
            },
            interval: ROTATION_INTERVAL,
            rng,
        };
        manager.force_init(now);
        manager
    }

    /// Start from a known code instead of a random one.
    pub fn with_code(code: impl Into<String>, now: Instant) -> Self {
        let manager = Self {
            current: AccessCode {
                value: code.into(),
                created_at: now,
            },
            interval: ROTATION_INTERVAL,
            rng: StdRng::from_entropy(),
        };
        manager.announce();
        manager
    }

    pub fn current(&self) -> &AccessCode {
        &self.current
    }

    /// Exact string comparison against the active code.
    pub fn matches(&self, candidate: &str) -> bool {
        self.current.value == candidate
    }

    /// Draw a new code unconditionally and announce it.
    pub fn force_init(&mut self, now: Instant) {
        let code: u8 = self.rng.gen_range(10..=99);
        self.current = AccessCode {
            value: code.to_string(),
            created_at: now,
        };
        self.announce();
    }

    /// The operator has no other way to learn the code.
    fn announce(&self) {
        info!("*** ACCESS CODE IS NOW {} ***", self.current.value);
    }

    /// Rotate once the current code is at least one interval old.
    pub fn rotate_if_expired(&mut self, now: Instant) -> bool {
        if self.current.age(now) < self.interval {
            return false;
        }
        self.force_init(now);
        true
    }
}
