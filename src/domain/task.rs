// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::domain::constants::BIT_DECIMALS;
use crate::domain::countdown::Countdown;
use crate::domain::units::format_token;
use alloy::primitives::U256;
use serde::Serialize;

/// Global task definition as returned by the tasks contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub reward: U256,
    pub category: String,
    pub activation_date: u64,
    pub active: bool,
}

/// Per-user progress on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserTaskInfo {
    pub completed: bool,
    pub unlock_time: u64,
    pub link_visited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub reward: U256,
    pub completed: bool,
    pub category: String,
    pub activation_date: Option<u64>,
    pub unlock_time: Option<u64>,
    pub link_visited: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    /// Not yet active for anyone.
    Upcoming { from: u64 },
    /// Active, but this user is still cooling down.
    Locked { until: u64 },
    Available,
}

fn non_zero(ts: u64) -> Option<u64> {
    (ts != 0).then_some(ts)
}

impl Task {
    /// Merge the global definition with the user's progress. `user` is `None`
    /// when no wallet is connected.
    pub fn merge(info: TaskInfo, user: Option<UserTaskInfo>) -> Self {
        let user_info = user.unwrap_or_default();
        Self {
            id: info.id,
            title: info.title,
            description: info.description,
            reward: info.reward,
            completed: user_info.completed,
            category: info.category,
            activation_date: non_zero(info.activation_date),
            unlock_time: user.and_then(|u| non_zero(u.unlock_time)),
            link_visited: user.map(|u| u.link_visited),
        }
    }

    pub fn status(&self, now: u64) -> TaskStatus {
        if self.completed {
            return TaskStatus::Completed;
        }
        if let Some(from) = self.activation_date
            && from > now
        {
            return TaskStatus::Upcoming { from };
        }
        if let Some(until) = self.unlock_time
            && until > now
        {
            return TaskStatus::Locked { until };
        }
        TaskStatus::Available
    }

    pub fn countdown(&self, now: u64) -> Option<Countdown> {
        match self.status(now) {
            TaskStatus::Upcoming { from } => Some(Countdown::until(from, now)),
            TaskStatus::Locked { until } => Some(Countdown::until(until, now)),
            _ => None,
        }
    }

    pub fn display_reward(&self) -> String {
        format!("{} BIT", format_token(self.reward, BIT_DECIMALS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::whole_tokens;

    fn info(activation_date: u64) -> TaskInfo {
        TaskInfo {
            id: 7,
            title: "Follow on X".into(),
            description: "Follow the official account".into(),
            reward: whole_tokens(50, BIT_DECIMALS),
            category: "social".into(),
            activation_date,
            active: true,
        }
    }

    #[test]
    fn merge_without_wallet_leaves_user_fields_empty() {
        let task = Task::merge(info(0), None);
        assert!(!task.completed);
        assert_eq!(task.activation_date, None);
        assert_eq!(task.unlock_time, None);
        assert_eq!(task.link_visited, None);
        assert_eq!(task.status(100), TaskStatus::Available);
        assert_eq!(task.display_reward(), "50 BIT");
    }

    #[test]
    fn status_orders_completed_upcoming_locked() {
        let user = UserTaskInfo {
            completed: false,
            unlock_time: 500,
            link_visited: true,
        };
        let task = Task::merge(info(200), Some(user));
        assert_eq!(task.status(100), TaskStatus::Upcoming { from: 200 });
        assert_eq!(task.status(300), TaskStatus::Locked { until: 500 });
        assert_eq!(task.countdown(300).unwrap().total_secs(), 200);
        assert_eq!(task.status(600), TaskStatus::Available);

        let done = Task::merge(
            info(0),
            Some(UserTaskInfo {
                completed: true,
                ..user
            }),
        );
        assert_eq!(done.status(0), TaskStatus::Completed);
    }
}
