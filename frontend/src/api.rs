use std::{fmt, rc::Rc};

use serde::de::DeserializeOwned;
use shared::{
    CreateProjectRequest, CreateTaskRequest, Project, Task, UpdateProjectRequest,
    UpdateTaskRequest,
};
use uuid::Uuid;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::config;

/// Path segment sent in place of the owning project when unlinking. The server
/// resolves the owner from the task itself.
pub const UNLINK_PROJECT_PLACEHOLDER: &str = "dummy";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build request: {0}")]
    Request(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply {
    Tasks(Vec<Task>),
    Task(Task),
    Projects(Vec<Project>),
    Project(Project),
    Empty,
}

pub type ApiResult = Result<ApiReply, ApiError>;

/// One call against the task API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListTasks,
    ListProjectTasks(Uuid),
    CreateTask(CreateTaskRequest),
    UpdateTask(Uuid, UpdateTaskRequest),
    CompleteTask(Uuid),
    DeleteTask(Uuid),
    LinkTask { task_id: Uuid, project_id: Uuid },
    UnlinkTask { task_id: Uuid },
    ListProjects,
    CreateProject(CreateProjectRequest),
    UpdateProject(Uuid, UpdateProjectRequest),
    CompleteProject(Uuid),
    DeleteProject(Uuid),
}

enum Expect {
    Tasks,
    Task,
    Projects,
    Project,
    Nothing,
}

/// An API call paired with the message that receives its outcome. The reply
/// may capture request context, such as the scope a listing was issued for.
pub struct Dispatch<M> {
    pub call: ApiCall,
    pub reply: Rc<dyn Fn(ApiResult) -> M>,
}

impl<M> Dispatch<M> {
    pub fn new(call: ApiCall, reply: impl Fn(ApiResult) -> M + 'static) -> Self {
        Self {
            call,
            reply: Rc::new(reply),
        }
    }
}

impl<M> Clone for Dispatch<M> {
    fn clone(&self) -> Self {
        Self {
            call: self.call.clone(),
            reply: Rc::clone(&self.reply),
        }
    }
}

impl<M> fmt::Debug for Dispatch<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch").field("call", &self.call).finish_non_exhaustive()
    }
}

impl ApiReply {
    pub fn into_tasks(self) -> Option<Vec<Task>> {
        match self {
            ApiReply::Tasks(tasks) => Some(tasks),
            _ => None,
        }
    }

    pub fn into_projects(self) -> Option<Vec<Project>> {
        match self {
            ApiReply::Projects(projects) => Some(projects),
            _ => None,
        }
    }
}

impl ApiCall {
    pub fn method(&self) -> &'static str {
        match self {
            ApiCall::ListTasks | ApiCall::ListProjectTasks(_) | ApiCall::ListProjects => "GET",
            ApiCall::CreateTask(_) | ApiCall::CreateProject(_) | ApiCall::LinkTask { .. } => {
                "POST"
            }
            ApiCall::UpdateTask(..) | ApiCall::UpdateProject(..) => "PUT",
            ApiCall::CompleteTask(_) | ApiCall::CompleteProject(_) => "PATCH",
            ApiCall::DeleteTask(_) | ApiCall::DeleteProject(_) | ApiCall::UnlinkTask { .. } => {
                "DELETE"
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            ApiCall::ListTasks | ApiCall::CreateTask(_) => "/tasks".to_string(),
            ApiCall::ListProjectTasks(project_id) => format!("/projects/{project_id}/tasks"),
            ApiCall::UpdateTask(id, _) | ApiCall::DeleteTask(id) => format!("/tasks/{id}"),
            ApiCall::CompleteTask(id) => format!("/tasks/{id}/complete"),
            ApiCall::LinkTask {
                task_id,
                project_id,
            } => format!("/projects/{project_id}/tasks/{task_id}/link"),
            ApiCall::UnlinkTask { task_id } => {
                format!("/projects/{UNLINK_PROJECT_PLACEHOLDER}/tasks/{task_id}/unlink")
            }
            ApiCall::ListProjects | ApiCall::CreateProject(_) => "/projects".to_string(),
            ApiCall::UpdateProject(id, _) | ApiCall::DeleteProject(id) => {
                format!("/projects/{id}")
            }
            ApiCall::CompleteProject(id) => format!("/projects/{id}/complete"),
        }
    }

    pub fn body(&self) -> Result<Option<String>, ApiError> {
        let encoded = match self {
            ApiCall::CreateTask(request) => serde_json::to_string(request),
            ApiCall::UpdateTask(_, request) => serde_json::to_string(request),
            ApiCall::CreateProject(request) => serde_json::to_string(request),
            ApiCall::UpdateProject(_, request) => serde_json::to_string(request),
            _ => return Ok(None),
        };
        encoded
            .map(Some)
            .map_err(|e| ApiError::Request(format!("failed to serialize body: {e}")))
    }

    fn expect(&self) -> Expect {
        match self {
            ApiCall::ListTasks | ApiCall::ListProjectTasks(_) => Expect::Tasks,
            ApiCall::CreateTask(_) | ApiCall::UpdateTask(..) | ApiCall::CompleteTask(_) => {
                Expect::Task
            }
            ApiCall::ListProjects => Expect::Projects,
            ApiCall::CreateProject(_)
            | ApiCall::UpdateProject(..)
            | ApiCall::CompleteProject(_) => Expect::Project,
            ApiCall::DeleteTask(_)
            | ApiCall::DeleteProject(_)
            | ApiCall::LinkTask { .. }
            | ApiCall::UnlinkTask { .. } => Expect::Nothing,
        }
    }

    /// Decodes a successful response body for this call.
    pub fn decode(&self, text: &str) -> ApiResult {
        Ok(match self.expect() {
            Expect::Tasks => ApiReply::Tasks(parse(text)?),
            Expect::Task => ApiReply::Task(parse(text)?),
            Expect::Projects => ApiReply::Projects(parse(text)?),
            Expect::Project => ApiReply::Project(parse(text)?),
            Expect::Nothing => ApiReply::Empty,
        })
    }

    pub async fn send(self, base_url: &str) -> ApiResult {
        let url = config::endpoint(base_url, &self.path());
        let body = self.body()?;

        let opts = RequestInit::new();
        opts.set_method(self.method());
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&url, &opts)
            .map_err(|e| ApiError::Request(js_message(&e)))?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|e| ApiError::Request(js_message(&e)))?;
        }

        let window = web_sys::window()
            .ok_or_else(|| ApiError::Request("no window available".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ApiError::Network(js_message(&e)))?
            .into();

        let text = read_text(&response).await?;
        if !response.ok() {
            return Err(ApiError::Status {
                status: response.status(),
                body: text,
            });
        }

        tracing::debug!(method = self.method(), %url, status = response.status(), "api call finished");
        self.decode(&text)
    }
}

async fn read_text(response: &Response) -> Result<String, ApiError> {
    let promise = response
        .text()
        .map_err(|e| ApiError::Decode(js_message(&e)))?;
    JsFuture::from(promise)
        .await
        .map_err(|e| ApiError::Network(js_message(&e)))?
        .as_string()
        .ok_or_else(|| ApiError::Decode("response body is not text".to_string()))
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn calls_map_onto_the_rest_surface() {
        let task = id(1);
        let project = id(2);
        let cases = [
            (ApiCall::ListTasks, "GET", "/tasks".to_string()),
            (
                ApiCall::ListProjectTasks(project),
                "GET",
                format!("/projects/{project}/tasks"),
            ),
            (
                ApiCall::UpdateTask(task, UpdateTaskRequest::default()),
                "PUT",
                format!("/tasks/{task}"),
            ),
            (ApiCall::CompleteTask(task), "PATCH", format!("/tasks/{task}/complete")),
            (ApiCall::DeleteTask(task), "DELETE", format!("/tasks/{task}")),
            (
                ApiCall::LinkTask {
                    task_id: task,
                    project_id: project,
                },
                "POST",
                format!("/projects/{project}/tasks/{task}/link"),
            ),
            (ApiCall::ListProjects, "GET", "/projects".to_string()),
            (
                ApiCall::UpdateProject(project, UpdateProjectRequest::default()),
                "PUT",
                format!("/projects/{project}"),
            ),
            (
                ApiCall::CompleteProject(project),
                "PATCH",
                format!("/projects/{project}/complete"),
            ),
            (ApiCall::DeleteProject(project), "DELETE", format!("/projects/{project}")),
        ];

        for (call, method, path) in cases {
            assert_eq!(call.method(), method, "{call:?}");
            assert_eq!(call.path(), path, "{call:?}");
        }
    }

    #[test]
    fn unlink_uses_the_placeholder_project_segment() {
        let call = ApiCall::UnlinkTask { task_id: id(7) };
        assert_eq!(call.method(), "DELETE");
        assert_eq!(
            call.path(),
            format!("/projects/dummy/tasks/{}/unlink", id(7))
        );
    }

    #[test]
    fn only_writes_carry_a_body() {
        assert_eq!(ApiCall::ListTasks.body(), Ok(None));
        assert_eq!(ApiCall::CompleteTask(id(3)).body(), Ok(None));

        let create = ApiCall::CreateProject(CreateProjectRequest {
            title: "Launch".to_string(),
            deadline: None,
        });
        assert_eq!(create.body(), Ok(Some(r#"{"title":"Launch"}"#.to_string())));
    }

    #[test]
    fn decode_follows_the_call_kind() {
        assert_eq!(ApiCall::ListTasks.decode("[]"), Ok(ApiReply::Tasks(vec![])));
        assert_eq!(ApiCall::ListProjects.decode("[]"), Ok(ApiReply::Projects(vec![])));
        assert_eq!(ApiCall::DeleteTask(id(1)).decode(""), Ok(ApiReply::Empty));
        assert_eq!(
            ApiCall::LinkTask {
                task_id: id(1),
                project_id: id(2)
            }
            .decode(r#"{"ignored": true}"#),
            Ok(ApiReply::Empty)
        );
        assert!(matches!(
            ApiCall::ListTasks.decode("not json"),
            Err(ApiError::Decode(_))
        ));
    }
}
