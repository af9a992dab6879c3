use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use shared::ErrorResponse;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Task {0} not found")]
    TaskNotFound(Uuid),

    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error("Task {task_id} deadline ({task_deadline}) cannot be after project {project_id} deadline ({project_deadline})")]
    DeadlineAfterProject {
        task_id: Uuid,
        project_id: Uuid,
        task_deadline: DateTime<Utc>,
        project_deadline: DateTime<Utc>,
    },

    #[error("Project {project_id} cannot be completed. {open_tasks} tasks are still incomplete.")]
    ProjectHasOpenTasks { project_id: Uuid, open_tasks: usize },

    #[error("Task {task_id} is already linked to project {project_id}")]
    AlreadyLinked { task_id: Uuid, project_id: Uuid },

    #[error("Task {0} is not linked to any project")]
    NotLinked(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::TaskNotFound(_) | ServiceError::ProjectNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::DeadlineAfterProject { .. }
            | ServiceError::ProjectHasOpenTasks { .. }
            | ServiceError::AlreadyLinked { .. }
            | ServiceError::NotLinked(_) => StatusCode::BAD_REQUEST,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            ErrorResponse {
                error: "internal error".to_string(),
                detail: None,
            }
        } else {
            ErrorResponse {
                error: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                detail: Some(self.to_string()),
            }
        };
        (status, Json(body)).into_response()
    }
}
