use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Task;

/// Client-side view over an already loaded task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Open,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task filter: {0}")]
pub struct UnknownFilter(pub String);

impl TaskFilter {
    /// Selector order.
    pub const ALL: [TaskFilter; 4] = [
        TaskFilter::All,
        TaskFilter::Open,
        TaskFilter::Completed,
        TaskFilter::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Completed => "completed",
            TaskFilter::Open => "open",
            TaskFilter::Overdue => "overdue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskFilter::All => "All Tasks",
            TaskFilter::Completed => "Completed Tasks",
            TaskFilter::Open => "Open Tasks",
            TaskFilter::Overdue => "Overdue Tasks",
        }
    }

    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Completed => task.completed,
            TaskFilter::Open => !task.completed,
            TaskFilter::Overdue => task.is_overdue(now),
        }
    }

    /// Keeps the server order of `tasks`.
    pub fn apply<'a>(&self, tasks: &'a [Task], now: DateTime<Utc>) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task, now)).collect()
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TaskFilter::All),
            "completed" => Ok(TaskFilter::Completed),
            "open" => Ok(TaskFilter::Open),
            "overdue" => Ok(TaskFilter::Overdue),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}
