//! Points and levels granted for reporting.

use std::fmt;

/// Reward for every successful report.
pub const POINTS_PER_REPORT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    RookieCitizen,
    CivicGuardian,
    UdaipurHero,
}

impl Level {
    /// `< 100` rookie, `< 300` guardian, hero after that.
    pub fn for_points(points: u32) -> Self {
        match points {
            0..=99 => Level::RookieCitizen,
            100..=299 => Level::CivicGuardian,
            _ => Level::UdaipurHero,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::RookieCitizen => "🌱 Rookie Citizen",
            Level::CivicGuardian => "🛡️ Civic Guardian",
            Level::UdaipurHero => "🦸 Udaipur Hero",
        }
    }

    /// Points still needed for the next tier, if any.
    pub fn points_to_next(points: u32) -> Option<u32> {
        match Level::for_points(points) {
            Level::RookieCitizen => Some(100 - points),
            Level::CivicGuardian => Some(300 - points),
            Level::UdaipurHero => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
