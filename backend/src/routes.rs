use std::{path::Path as FsPath, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::{json, Value};
use shared::{
    CreateProjectRequest, CreateTaskRequest, Project, Task, UpdateProjectRequest,
    UpdateTaskRequest,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::service::Service;

type AppState = Arc<Service>;
type ApiResult<T> = Result<T, ServiceError>;

/// The REST surface without static files.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:task_id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/:task_id/complete", patch(complete_task))
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:project_id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/:project_id/complete", patch(complete_project))
        .route("/projects/:project_id/tasks", get(project_tasks))
        .route("/projects/:project_id/tasks/:task_id/link", post(link_task))
        .route(
            "/projects/:project_id/tasks/:task_id/unlink",
            delete(unlink_task),
        )
        .with_state(service)
}

/// Full application: API routes, the built frontend as fallback, CORS and
/// request tracing.
pub fn app(service: Arc<Service>, static_dir: &FsPath) -> Router {
    router(service)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_tasks(State(service): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(service.list_tasks().await?))
}

async fn get_task(
    Path(task_id): Path<Uuid>,
    State(service): State<AppState>,
) -> ApiResult<Json<Task>> {
    Ok(Json(service.get_task(task_id).await?))
}

async fn create_task(
    State(service): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = service.create_task(payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    Path(task_id): Path<Uuid>,
    State(service): State<AppState>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    Ok(Json(service.update_task(task_id, payload).await?))
}

async fn complete_task(
    Path(task_id): Path<Uuid>,
    State(service): State<AppState>,
) -> ApiResult<Json<Task>> {
    Ok(Json(service.complete_task(task_id).await?))
}

async fn delete_task(
    Path(task_id): Path<Uuid>,
    State(service): State<AppState>,
) -> ApiResult<StatusCode> {
    service.delete_task(task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn link_task(
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    State(service): State<AppState>,
) -> ApiResult<Json<Task>> {
    Ok(Json(service.link_task(task_id, project_id).await?))
}

// The project segment is not interpreted; clients send a placeholder.
async fn unlink_task(
    Path((_project, task_id)): Path<(String, Uuid)>,
    State(service): State<AppState>,
) -> ApiResult<Json<Task>> {
    Ok(Json(service.unlink_task(task_id).await?))
}

async fn list_projects(State(service): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(service.list_projects().await?))
}

async fn get_project(
    Path(project_id): Path<Uuid>,
    State(service): State<AppState>,
) -> ApiResult<Json<Project>> {
    Ok(Json(service.get_project(project_id).await?))
}

async fn create_project(
    State(service): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = service.create_project(payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn update_project(
    Path(project_id): Path<Uuid>,
    State(service): State<AppState>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    Ok(Json(service.update_project(project_id, payload).await?))
}

async fn complete_project(
    Path(project_id): Path<Uuid>,
    State(service): State<AppState>,
) -> ApiResult<Json<Project>> {
    Ok(Json(service.complete_project(project_id).await?))
}

async fn delete_project(
    Path(project_id): Path<Uuid>,
    State(service): State<AppState>,
) -> ApiResult<StatusCode> {
    service.delete_project(project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn project_tasks(
    Path(project_id): Path<Uuid>,
    State(service): State<AppState>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(service.project_tasks(project_id).await?))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::store::memory::MemoryStore;

    fn test_router() -> Router {
        router(Arc::new(Service::new(Arc::new(MemoryStore::default()))))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_router();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn task_lifecycle_over_http() {
        let app = test_router();
        let (status, created) = send(
            &app,
            "POST",
            "/tasks",
            Some(json!({ "title": "Buy milk", "description": "2 litres" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["completed"], false);

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/tasks/{id}"),
            Some(json!({ "title": "Buy oat milk" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Buy oat milk");
        assert_eq!(updated["description"], "2 litres");

        let (status, completed) = send(&app, "PATCH", &format!("/tasks/{id}/complete"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(completed["completed"], true);

        let (status, list) = send(&app, "GET", "/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "DELETE", &format!("/tasks/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, "GET", &format!("/tasks/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].as_str().unwrap().contains(&id));
    }

    #[tokio::test]
    async fn blank_title_is_unprocessable() {
        let app = test_router();
        let (status, body) = send(&app, "POST", "/projects", Some(json!({ "title": "" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Unprocessable Entity");
    }

    #[tokio::test]
    async fn link_then_unlink_through_placeholder_path() {
        let app = test_router();
        let (_, project) = send(&app, "POST", "/projects", Some(json!({ "title": "Home" }))).await;
        let (_, task) = send(&app, "POST", "/tasks", Some(json!({ "title": "Paint" }))).await;
        let project_id = project["id"].as_str().unwrap();
        let task_id = task["id"].as_str().unwrap();

        let (status, linked) = send(
            &app,
            "POST",
            &format!("/projects/{project_id}/tasks/{task_id}/link"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(linked["project_id"], project_id);

        let (status, scoped) =
            send(&app, "GET", &format!("/projects/{project_id}/tasks"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(scoped.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/projects/dummy/tasks/{task_id}/unlink"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/projects/dummy/tasks/{task_id}/unlink"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn project_with_open_task_cannot_complete() {
        let app = test_router();
        let (_, project) = send(&app, "POST", "/projects", Some(json!({ "title": "Yard" }))).await;
        let project_id = project["id"].as_str().unwrap();
        send(
            &app,
            "POST",
            "/tasks",
            Some(json!({ "title": "Mow", "project_id": project_id })),
        )
        .await;

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/projects/{project_id}/complete"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("1 tasks"));
    }

    #[tokio::test]
    async fn unknown_project_listing_is_not_found() {
        let app = test_router();
        let (status, _) = send(
            &app,
            "GET",
            &format!("/projects/{}/tasks", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
