// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Return the current UNIX timestamp in seconds.
pub fn current_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Countdown {
    pub fn from_secs(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    /// Time left until `target`, saturating at zero once it has passed.
    pub fn until(target: u64, now: u64) -> Self {
        Self::from_secs(target.saturating_sub(now))
    }

    pub fn total_secs(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }

    pub fn is_elapsed(&self) -> bool {
        self.total_secs() == 0
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_elapsed() {
            return f.write_str("ready");
        }
        if self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        write!(
            f,
            "{:02}h {:02}m {:02}s",
            self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_components() {
        let c = Countdown::until(1_000 + 2 * 86_400 + 3 * 3_600 + 4 * 60 + 5, 1_000);
        assert_eq!(
            c,
            Countdown {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
        assert_eq!(c.to_string(), "2d 03h 04m 05s");
    }

    #[test]
    fn past_targets_are_ready() {
        let c = Countdown::until(10, 20);
        assert!(c.is_elapsed());
        assert_eq!(c.to_string(), "ready");
        assert_eq!(Countdown::from_secs(59).to_string(), "00h 00m 59s");
    }
}
