// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use crate::common::retry::retry_read;
use crate::domain::task::{Task, TaskInfo, UserTaskInfo};
use crate::infrastructure::contracts::abi::ICommunityTasks;
use crate::infrastructure::contracts::{TxOutcome, confirm};
use crate::network::provider::ChainProvider;
use alloy::primitives::{Address, U256};
use futures::stream::{self, StreamExt};
use std::future::Future;

/// Task ids read per poll; the count comes from the contract.
pub const MAX_TASKS: u64 = 256;
/// Task loads in flight at once, each costing up to two RPC reads.
pub const TASK_READ_CONCURRENCY: usize = 8;

fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[derive(Clone)]
pub struct TasksClient {
    provider: ChainProvider,
    address: Address,
}

impl TasksClient {
    pub fn new(provider: ChainProvider, address: Address) -> Self {
        Self { provider, address }
    }

    fn contract(&self) -> ICommunityTasks::ICommunityTasksInstance<ChainProvider> {
        ICommunityTasks::new(self.address, self.provider.clone())
    }

    pub async fn task_count(&self) -> Result<u64, AppError> {
        let contract = self.contract();
        retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.taskCount().call().await }
        })
        .await
        .map(to_u64)
        .map_err(|e| AppError::Connection(format!("Task count read failed: {}", e)))
    }

    pub async fn task_info(&self, id: u64) -> Result<TaskInfo, AppError> {
        let contract = self.contract();
        let info = retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.getTaskInfo(U256::from(id)).call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("Task {} read failed: {}", id, e)))?;

        Ok(TaskInfo {
            id,
            title: info.title,
            description: info.description,
            reward: info.reward,
            category: info.category,
            activation_date: to_u64(info.activationDate),
            active: info.active,
        })
    }

    pub async fn user_task_info(&self, user: Address, id: u64) -> Result<UserTaskInfo, AppError> {
        let contract = self.contract();
        let info = retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.getUserTaskInfo(user, U256::from(id)).call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("Task {} progress read failed: {}", id, e)))?;

        Ok(UserTaskInfo {
            completed: info.completed,
            unlock_time: to_u64(info.unlockTime),
            link_visited: info.linkVisited,
        })
    }

    async fn load_task(&self, id: u64, user: Option<Address>) -> Result<Option<Task>, AppError> {
        let info = self.task_info(id).await?;
        if !info.active {
            return Ok(None);
        }
        let progress = match user {
            Some(user) => Some(self.user_task_info(user, id).await?),
            None => None,
        };
        Ok(Some(Task::merge(info, progress)))
    }

    /// All active tasks merged with the user's progress. A task that fails to
    /// load is skipped so the rest of the list still renders.
    pub async fn tasks(&self, user: Option<Address>) -> Result<Vec<Task>, AppError> {
        let count = self.task_count().await?;
        Ok(load_bounded(count, |id| self.load_task(id, user)).await)
    }

    pub async fn visit_link(&self, id: u64) -> Result<TxOutcome, AppError> {
        let contract = self.contract();
        confirm("visitLink", contract.visitLink(U256::from(id)).send().await).await
    }

    pub async fn complete_task(&self, id: u64) -> Result<TxOutcome, AppError> {
        let contract = self.contract();
        confirm(
            "completeTask",
            contract.completeTask(U256::from(id)).send().await,
        )
        .await
    }
}

/// Load ids `0..count` (capped at `MAX_TASKS`) with at most
/// `TASK_READ_CONCURRENCY` loads running, keeping id order.
async fn load_bounded<F, Fut>(count: u64, load: F) -> Vec<Task>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<Option<Task>, AppError>>,
{
    if count > MAX_TASKS {
        tracing::warn!(target: "tasks", count, max = MAX_TASKS, "Task count capped");
    }
    let results: Vec<(u64, Result<Option<Task>, AppError>)> = stream::iter(0..count.min(MAX_TASKS))
        .map(|id| {
            let fut = load(id);
            async move { (id, fut.await) }
        })
        .buffered(TASK_READ_CONCURRENCY)
        .collect()
        .await;

    let mut tasks = Vec::with_capacity(results.len());
    for (id, result) in results {
        match result {
            Ok(Some(task)) => tasks.push(task),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(target: "tasks", task_id = id, error = %e, "Skipping task");
            }
        }
    }
    tasks
}
