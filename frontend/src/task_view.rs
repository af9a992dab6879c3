use chrono::{DateTime, Utc};
use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use shared::{datetime, Project, Task, TaskFilter};
use uuid::Uuid;

use crate::api::{ApiCall, ApiReply, ApiResult, Dispatch};
use crate::form::{FormMode, TaskDraft};

pub const UNKNOWN_PROJECT_LABEL: &str = "Unknown Project";

#[derive(Debug, Clone)]
pub enum TaskMsg {
    Load,
    /// Listing reply tagged with the scope it was requested for.
    TasksLoaded(Option<Uuid>, ApiResult),
    ProjectsLoaded(ApiResult),
    SetFilter(String),
    ToggleForm,
    CancelForm,
    SetTitle(String),
    SetDescription(String),
    SetDeadline(String),
    Submit,
    Created(ApiResult),
    Updated(ApiResult),
    StartEdit(Uuid),
    Complete(Uuid),
    Completed(ApiResult),
    Delete(Uuid),
    Deleted(ApiResult),
    /// Raw value of the link selector; empty means the prompt entry.
    Link(Uuid, String),
    Linked(ApiResult),
    Unlink(Uuid),
    Unlinked(ApiResult),
}

/// Controls offered on a task row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskActions {
    pub complete: bool,
    pub edit: bool,
    pub link: bool,
    pub unlink: bool,
    pub delete: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TaskView {
    scope: Option<Uuid>,
    tasks: Vec<Task>,
    projects: Vec<Project>,
    loading: bool,
    form: FormMode,
    draft: TaskDraft,
    filter: TaskFilter,
}

impl TaskView {
    /// `scope` limits the view to one project's tasks.
    pub fn new(scope: Option<Uuid>) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn scope(&self) -> Option<Uuid> {
        self.scope
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn form(&self) -> FormMode {
        self.form
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn find(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Fetches tasks, plus projects for labels and linking when unscoped.
    pub fn load(&mut self) -> Vec<Dispatch<TaskMsg>> {
        let mut dispatches = self.reload_tasks();
        if self.scope.is_none() {
            dispatches.push(Dispatch::new(ApiCall::ListProjects, TaskMsg::ProjectsLoaded));
        }
        dispatches
    }

    fn reload_tasks(&mut self) -> Vec<Dispatch<TaskMsg>> {
        self.loading = true;
        let call = match self.scope {
            Some(project_id) => ApiCall::ListProjectTasks(project_id),
            None => ApiCall::ListTasks,
        };
        let scope = self.scope;
        vec![Dispatch::new(call, move |outcome| {
            TaskMsg::TasksLoaded(scope, outcome)
        })]
    }

    /// Points the view at another project (or none) and reloads. A no-op when
    /// the scope is unchanged.
    pub fn rescope(&mut self, scope: Option<Uuid>) -> Vec<Dispatch<TaskMsg>> {
        if self.scope == scope {
            return vec![];
        }
        *self = TaskView::new(scope);
        self.load()
    }

    /// Tasks passing the active filter, in server order. Scoped views are
    /// never filtered.
    pub fn visible_tasks(&self, now: DateTime<Utc>) -> Vec<&Task> {
        let filter = if self.scope.is_some() {
            TaskFilter::All
        } else {
            self.filter
        };
        filter.apply(&self.tasks, now)
    }

    pub fn shows_filter(&self) -> bool {
        self.scope.is_none()
    }

    /// `None` for unlinked tasks; a fallback label when the project is not
    /// among the loaded ones.
    pub fn project_label(&self, task: &Task) -> Option<String> {
        let project_id = task.project_id?;
        Some(
            self.projects
                .iter()
                .find(|p| p.id == project_id)
                .map(|p| p.title.clone())
                .unwrap_or_else(|| UNKNOWN_PROJECT_LABEL.to_string()),
        )
    }

    pub fn actions(&self, task: &Task) -> TaskActions {
        let unscoped = self.scope.is_none();
        TaskActions {
            complete: !task.completed,
            edit: true,
            link: unscoped && task.project_id.is_none(),
            unlink: unscoped && task.project_id.is_some(),
            delete: true,
        }
    }

    pub fn update(&mut self, msg: TaskMsg) -> Vec<Dispatch<TaskMsg>> {
        match msg {
            TaskMsg::Load => self.load(),
            TaskMsg::TasksLoaded(scope, outcome) => {
                if scope != self.scope {
                    tracing::debug!(requested = ?scope, current = ?self.scope, "dropping task listing for a previous scope");
                    return vec![];
                }
                self.loading = false;
                match outcome.map(ApiReply::into_tasks) {
                    Ok(Some(tasks)) => {
                        tracing::debug!(count = tasks.len(), scope = ?self.scope, "tasks loaded");
                        self.tasks = tasks;
                    }
                    Ok(None) => tracing::warn!("task listing returned an unexpected reply"),
                    Err(err) => tracing::error!(error = %err, "failed to load tasks"),
                }
                vec![]
            }
            TaskMsg::ProjectsLoaded(outcome) => {
                match outcome.map(ApiReply::into_projects) {
                    Ok(Some(projects)) => self.projects = projects,
                    Ok(None) => tracing::warn!("project listing returned an unexpected reply"),
                    Err(err) => tracing::error!(error = %err, "failed to load projects"),
                }
                vec![]
            }
            TaskMsg::SetFilter(value) => {
                match value.parse::<TaskFilter>() {
                    Ok(filter) => self.filter = filter,
                    Err(err) => tracing::warn!(error = %err, "ignoring filter selection"),
                }
                vec![]
            }
            TaskMsg::ToggleForm => {
                self.draft = TaskDraft::default();
                self.form = self.form.toggled();
                vec![]
            }
            TaskMsg::CancelForm => {
                self.reset_form();
                vec![]
            }
            TaskMsg::SetTitle(title) => {
                self.draft.title = title;
                vec![]
            }
            TaskMsg::SetDescription(description) => {
                self.draft.description = description;
                vec![]
            }
            TaskMsg::SetDeadline(deadline) => {
                self.draft.deadline = deadline;
                vec![]
            }
            TaskMsg::Submit => self.submit(),
            TaskMsg::Created(outcome) => self.after_save("create", outcome),
            TaskMsg::Updated(outcome) => self.after_save("update", outcome),
            TaskMsg::StartEdit(id) => {
                match self.find(id) {
                    Some(task) => {
                        self.draft = TaskDraft::from_task(task);
                        self.form = FormMode::Editing(id);
                    }
                    None => tracing::warn!(%id, "cannot edit a task that is not loaded"),
                }
                vec![]
            }
            TaskMsg::Complete(id) => {
                vec![Dispatch::new(ApiCall::CompleteTask(id), TaskMsg::Completed)]
            }
            TaskMsg::Completed(outcome) => self.reload_after("complete", outcome),
            TaskMsg::Delete(id) => vec![Dispatch::new(ApiCall::DeleteTask(id), TaskMsg::Deleted)],
            TaskMsg::Deleted(outcome) => self.reload_after("delete", outcome),
            TaskMsg::Link(task_id, value) => self.link(task_id, &value),
            TaskMsg::Linked(outcome) => self.reload_after("link", outcome),
            TaskMsg::Unlink(task_id) => {
                if self.scope.is_some() {
                    tracing::warn!(%task_id, "unlinking is not offered in a project view");
                    return vec![];
                }
                vec![Dispatch::new(ApiCall::UnlinkTask { task_id }, TaskMsg::Unlinked)]
            }
            TaskMsg::Unlinked(outcome) => self.reload_after("unlink", outcome),
        }
    }

    fn link(&mut self, task_id: Uuid, value: &str) -> Vec<Dispatch<TaskMsg>> {
        if value.is_empty() {
            return vec![];
        }
        if self.scope.is_some() {
            tracing::warn!(%task_id, "linking is not offered in a project view");
            return vec![];
        }
        match value.parse::<Uuid>() {
            Ok(project_id) => vec![Dispatch::new(
                ApiCall::LinkTask {
                    task_id,
                    project_id,
                },
                TaskMsg::Linked,
            )],
            Err(err) => {
                tracing::warn!(error = %err, value, "ignoring malformed project id");
                vec![]
            }
        }
    }

    fn submit(&mut self) -> Vec<Dispatch<TaskMsg>> {
        if !self.draft.has_title() {
            tracing::debug!("ignoring task submit without a title");
            return vec![];
        }
        match self.form {
            FormMode::Closed => vec![],
            FormMode::Creating => vec![Dispatch::new(
                ApiCall::CreateTask(self.draft.create_request(self.scope)),
                TaskMsg::Created,
            )],
            FormMode::Editing(id) => vec![Dispatch::new(
                ApiCall::UpdateTask(id, self.draft.update_request()),
                TaskMsg::Updated,
            )],
        }
    }

    fn reset_form(&mut self) {
        self.form = FormMode::Closed;
        self.draft = TaskDraft::default();
    }

    fn after_save(&mut self, op: &str, outcome: ApiResult) -> Vec<Dispatch<TaskMsg>> {
        match outcome {
            Ok(_) => {
                self.reset_form();
                self.reload_tasks()
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to {op} task");
                vec![]
            }
        }
    }

    fn reload_after(&mut self, op: &str, outcome: ApiResult) -> Vec<Dispatch<TaskMsg>> {
        match outcome {
            Ok(_) => self.reload_tasks(),
            Err(err) => {
                tracing::error!(error = %err, "failed to {op} task");
                vec![]
            }
        }
    }

    pub fn view(&self) -> Node<TaskMsg> {
        div([class("space-y-4")], [
            div([class("flex justify-between items-center")], [
                h2([class("text-xl font-semibold text-ctp-text")], [
                    text(if self.scope.is_some() { "Project Tasks" } else { "All Tasks" }),
                ]),
                div([class("flex space-x-2")], [
                    if self.shows_filter() {
                        self.view_filter()
                    } else {
                        span([], [])
                    },
                    button([
                        on_click(|_| TaskMsg::ToggleForm),
                        class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base px-4 py-2 rounded-md"),
                        r#type("button"),
                    ], [text(if self.form.is_open() { "Cancel" } else { "Add Task" })]),
                ]),
            ]),
            if self.form.is_open() {
                self.view_form()
            } else {
                span([], [])
            },
            if self.loading {
                div([class("text-center py-4 text-ctp-subtext0 italic")], [text("Loading tasks...")])
            } else {
                self.view_list()
            },
        ])
    }

    fn view_filter(&self) -> Node<TaskMsg> {
        select([
            value(self.filter.as_str()),
            on_change(|event| TaskMsg::SetFilter(event.value())),
            class("bg-ctp-surface0 border border-ctp-surface2 rounded px-3 py-2 text-ctp-text"),
        ], TaskFilter::ALL.iter().map(|filter| {
            option([value(filter.as_str())], [text(filter.label())])
        }).collect::<Vec<_>>())
    }

    fn view_form(&self) -> Node<TaskMsg> {
        div([class("bg-ctp-surface1 p-4 rounded-lg space-y-4 border border-ctp-surface2")], [
            div([], [
                p([class("block text-sm font-medium text-ctp-subtext1")], [text("Title")]),
                input([
                    r#type("text"),
                    value(&self.draft.title),
                    on_input(|event| TaskMsg::SetTitle(event.value())),
                    class("mt-1 block w-full bg-ctp-surface0 border border-ctp-surface2 rounded-md px-3 py-2 text-ctp-text"),
                ], []),
            ]),
            div([], [
                p([class("block text-sm font-medium text-ctp-subtext1")], [text("Description")]),
                textarea([
                    value(&self.draft.description),
                    on_input(|event| TaskMsg::SetDescription(event.value())),
                    class("mt-1 block w-full bg-ctp-surface0 border border-ctp-surface2 rounded-md px-3 py-2 text-ctp-text h-20 resize-y"),
                ], []),
            ]),
            div([], [
                p([class("block text-sm font-medium text-ctp-subtext1")], [text("Deadline")]),
                input([
                    r#type("datetime-local"),
                    value(&self.draft.deadline),
                    on_input(|event| TaskMsg::SetDeadline(event.value())),
                    class("mt-1 block w-full bg-ctp-surface0 border border-ctp-surface2 rounded-md px-3 py-2 text-ctp-text"),
                ], []),
            ]),
            div([class("flex space-x-2")], [
                button([
                    on_click(|_| TaskMsg::Submit),
                    class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base px-4 py-2 rounded-md"),
                    r#type("button"),
                ], [text(self.form.submit_label("Task"))]),
                button([
                    on_click(|_| TaskMsg::CancelForm),
                    class("bg-ctp-overlay0 hover:bg-ctp-overlay1 text-ctp-base px-4 py-2 rounded-md"),
                    r#type("button"),
                ], [text("Cancel")]),
            ]),
        ])
    }

    fn view_list(&self) -> Node<TaskMsg> {
        let visible = self.visible_tasks(Utc::now());
        if visible.is_empty() {
            return p([class("text-ctp-subtext0 text-center py-4")], [text("No tasks found")]);
        }
        div([class("space-y-2")], visible.iter().map(|task| self.view_row(task)).collect::<Vec<_>>())
    }

    fn view_row(&self, task: &Task) -> Node<TaskMsg> {
        let id = task.id;
        let actions = self.actions(task);
        div([
            class(&format!(
                "border rounded-lg p-4 {}",
                if task.completed {
                    "bg-ctp-green/10 border-ctp-green/40"
                } else {
                    "bg-ctp-surface0 border-ctp-surface1"
                }
            )),
        ], [
            div([class("flex justify-between items-start")], [
                div([class("flex-1")], [
                    h3([class(&format!(
                        "font-medium {}",
                        if task.completed { "line-through text-ctp-overlay1" } else { "text-ctp-text" }
                    ))], [text(&task.title)]),
                    match task.description.as_deref() {
                        Some(description) if !description.is_empty() => {
                            p([class("text-ctp-subtext1 text-sm mt-1")], [text(description)])
                        }
                        _ => span([], []),
                    },
                    match &task.deadline {
                        Some(deadline) => p([class("text-sm text-ctp-subtext0 mt-1")], [
                            text(format!("Deadline: {}", datetime::to_local_display(deadline))),
                        ]),
                        None => span([], []),
                    },
                    match self.project_label(task) {
                        Some(label) => p([class("text-sm text-ctp-blue mt-1")], [
                            text(format!("Project: {label}")),
                        ]),
                        None => span([], []),
                    },
                    p([class("text-xs text-ctp-overlay0 mt-1")], [
                        text(format!("Created: {}", datetime::to_local_display(&task.created_at))),
                    ]),
                ]),
                div([class("flex space-x-2 ml-4")], [
                    if actions.complete {
                        button([
                            on_click(move |_| TaskMsg::Complete(id)),
                            class("bg-ctp-green text-ctp-base px-3 py-1 rounded text-sm"),
                            r#type("button"),
                        ], [text("Complete")])
                    } else {
                        span([], [])
                    },
                    button([
                        on_click(move |_| TaskMsg::StartEdit(id)),
                        class("bg-ctp-blue text-ctp-base px-3 py-1 rounded text-sm"),
                        r#type("button"),
                    ], [text("Edit")]),
                    if actions.link {
                        self.view_link_picker(id)
                    } else if actions.unlink {
                        button([
                            on_click(move |_| TaskMsg::Unlink(id)),
                            class("bg-ctp-blue text-ctp-base px-3 py-1 rounded text-sm"),
                            r#type("button"),
                        ], [text("Unlink")])
                    } else {
                        span([], [])
                    },
                    button([
                        on_click(move |_| TaskMsg::Delete(id)),
                        class("bg-ctp-red text-ctp-base px-3 py-1 rounded text-sm"),
                        r#type("button"),
                    ], [text("Delete")]),
                ]),
            ]),
        ])
    }

    fn view_link_picker(&self, task_id: Uuid) -> Node<TaskMsg> {
        let mut choices = vec![option([value("")], [text("Link to Project")])];
        choices.extend(self.projects.iter().map(|project| {
            option([value(project.id.to_string())], [text(&project.title)])
        }));
        select([
            value(""),
            on_change(move |event| TaskMsg::Link(task_id, event.value())),
            class("bg-ctp-surface0 border border-ctp-surface2 rounded px-2 py-1 text-sm text-ctp-text"),
        ], choices)
    }
}
