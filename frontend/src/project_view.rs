use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use shared::{datetime, Project};
use uuid::Uuid;

use crate::api::{ApiCall, ApiReply, ApiResult, Dispatch};
use crate::form::{FormMode, ProjectDraft};

#[derive(Debug, Clone)]
pub enum ProjectMsg {
    Load,
    Loaded(ApiResult),
    ToggleForm,
    CancelForm,
    SetTitle(String),
    SetDeadline(String),
    Submit,
    Created(ApiResult),
    Updated(ApiResult),
    StartEdit(Uuid),
    Complete(Uuid),
    Completed(ApiResult),
    Delete(Uuid),
    Deleted(ApiResult),
    /// Drill into a project. Handled by the shell.
    Select(Uuid),
}

/// Controls offered on a project row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectActions {
    pub view_tasks: bool,
    pub complete: bool,
    pub edit: bool,
    pub delete: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectView {
    projects: Vec<Project>,
    loading: bool,
    form: FormMode,
    draft: ProjectDraft,
    selectable: bool,
}

impl ProjectView {
    /// `selectable` controls whether rows offer "View Tasks".
    pub fn new(selectable: bool) -> Self {
        Self {
            selectable,
            ..Self::default()
        }
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

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    pub fn find(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn load(&mut self) -> Vec<Dispatch<ProjectMsg>> {
        self.loading = true;
        vec![Dispatch::new(ApiCall::ListProjects, ProjectMsg::Loaded)]
    }

    pub fn actions(&self, project: &Project) -> ProjectActions {
        ProjectActions {
            view_tasks: self.selectable,
            complete: !project.completed,
            edit: true,
            delete: true,
        }
    }

    pub fn update(&mut self, msg: ProjectMsg) -> Vec<Dispatch<ProjectMsg>> {
        match msg {
            ProjectMsg::Load => self.load(),
            ProjectMsg::Loaded(outcome) => {
                self.loading = false;
                match outcome.map(ApiReply::into_projects) {
                    Ok(Some(projects)) => {
                        tracing::debug!(count = projects.len(), "projects loaded");
                        self.projects = projects;
                    }
                    Ok(None) => tracing::warn!("project listing returned an unexpected reply"),
                    Err(err) => tracing::error!(error = %err, "failed to load projects"),
                }
                vec![]
            }
            ProjectMsg::ToggleForm => {
                self.draft = ProjectDraft::default();
                self.form = self.form.toggled();
                vec![]
            }
            ProjectMsg::CancelForm => {
                self.reset_form();
                vec![]
            }
            ProjectMsg::SetTitle(title) => {
                self.draft.title = title;
                vec![]
            }
            ProjectMsg::SetDeadline(deadline) => {
                self.draft.deadline = deadline;
                vec![]
            }
            ProjectMsg::Submit => self.submit(),
            ProjectMsg::Created(outcome) => self.after_save("create", outcome),
            ProjectMsg::Updated(outcome) => self.after_save("update", outcome),
            ProjectMsg::StartEdit(id) => {
                match self.find(id) {
                    Some(project) => {
                        self.draft = ProjectDraft::from_project(project);
                        self.form = FormMode::Editing(id);
                    }
                    None => tracing::warn!(%id, "cannot edit a project that is not loaded"),
                }
                vec![]
            }
            ProjectMsg::Complete(id) => {
                vec![Dispatch::new(ApiCall::CompleteProject(id), ProjectMsg::Completed)]
            }
            ProjectMsg::Completed(outcome) => self.reload_after("complete", outcome),
            ProjectMsg::Delete(id) => {
                vec![Dispatch::new(ApiCall::DeleteProject(id), ProjectMsg::Deleted)]
            }
            ProjectMsg::Deleted(outcome) => self.reload_after("delete", outcome),
            ProjectMsg::Select(_) => vec![],
        }
    }

    fn submit(&mut self) -> Vec<Dispatch<ProjectMsg>> {
        if !self.draft.has_title() {
            tracing::debug!("ignoring project submit without a title");
            return vec![];
        }
        match self.form {
            FormMode::Closed => vec![],
            FormMode::Creating => vec![Dispatch::new(
                ApiCall::CreateProject(self.draft.create_request()),
                ProjectMsg::Created,
            )],
            FormMode::Editing(id) => vec![Dispatch::new(
                ApiCall::UpdateProject(id, self.draft.update_request()),
                ProjectMsg::Updated,
            )],
        }
    }

    fn reset_form(&mut self) {
        self.form = FormMode::Closed;
        self.draft = ProjectDraft::default();
    }

    // A failed save leaves the form open and populated for another try.
    fn after_save(&mut self, op: &str, outcome: ApiResult) -> Vec<Dispatch<ProjectMsg>> {
        match outcome {
            Ok(_) => {
                self.reset_form();
                self.load()
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to {op} project");
                vec![]
            }
        }
    }

    fn reload_after(&mut self, op: &str, outcome: ApiResult) -> Vec<Dispatch<ProjectMsg>> {
        match outcome {
            Ok(_) => self.load(),
            Err(err) => {
                tracing::error!(error = %err, "failed to {op} project");
                vec![]
            }
        }
    }

    pub fn view(&self) -> Node<ProjectMsg> {
        div([class("space-y-4")], [
            div([class("flex justify-between items-center")], [
                h2([class("text-xl font-semibold text-ctp-text")], [text("Projects")]),
                button([
                    on_click(|_| ProjectMsg::ToggleForm),
                    class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base px-4 py-2 rounded-md"),
                    r#type("button"),
                ], [text(if self.form.is_open() { "Cancel" } else { "Add Project" })]),
            ]),
            if self.form.is_open() {
                self.view_form()
            } else {
                span([], [])
            },
            if self.loading {
                div([class("text-center py-4 text-ctp-subtext0 italic")], [text("Loading projects...")])
            } else {
                self.view_list()
            },
        ])
    }

    fn view_form(&self) -> Node<ProjectMsg> {
        div([class("bg-ctp-surface1 p-4 rounded-lg space-y-4 border border-ctp-surface2")], [
            div([], [
                p([class("block text-sm font-medium text-ctp-subtext1")], [text("Title")]),
                input([
                    r#type("text"),
                    value(&self.draft.title),
                    on_input(|event| ProjectMsg::SetTitle(event.value())),
                    class("mt-1 block w-full bg-ctp-surface0 border border-ctp-surface2 rounded-md px-3 py-2 text-ctp-text"),
                ], []),
            ]),
            div([], [
                p([class("block text-sm font-medium text-ctp-subtext1")], [text("Deadline")]),
                input([
                    r#type("datetime-local"),
                    value(&self.draft.deadline),
                    on_input(|event| ProjectMsg::SetDeadline(event.value())),
                    class("mt-1 block w-full bg-ctp-surface0 border border-ctp-surface2 rounded-md px-3 py-2 text-ctp-text"),
                ], []),
            ]),
            div([class("flex space-x-2")], [
                button([
                    on_click(|_| ProjectMsg::Submit),
                    class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base px-4 py-2 rounded-md"),
                    r#type("button"),
                ], [text(self.form.submit_label("Project"))]),
                button([
                    on_click(|_| ProjectMsg::CancelForm),
                    class("bg-ctp-overlay0 hover:bg-ctp-overlay1 text-ctp-base px-4 py-2 rounded-md"),
                    r#type("button"),
                ], [text("Cancel")]),
            ]),
        ])
    }

    fn view_list(&self) -> Node<ProjectMsg> {
        if self.projects.is_empty() {
            return p([class("text-ctp-subtext0 text-center py-4")], [text("No projects found")]);
        }
        div([class("space-y-2")], self.projects.iter().map(|project| self.view_row(project)).collect::<Vec<_>>())
    }

    fn view_row(&self, project: &Project) -> Node<ProjectMsg> {
        let id = project.id;
        let actions = self.actions(project);
        div([
            class(&format!(
                "border rounded-lg p-4 {}",
                if project.completed {
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
                        if project.completed { "line-through text-ctp-overlay1" } else { "text-ctp-text" }
                    ))], [text(&project.title)]),
                    match &project.deadline {
                        Some(deadline) => p([class("text-sm text-ctp-subtext0 mt-1")], [
                            text(format!("Deadline: {}", datetime::to_local_display(deadline))),
                        ]),
                        None => span([], []),
                    },
                    p([class("text-xs text-ctp-overlay0 mt-1")], [
                        text(format!("Created: {}", datetime::to_local_display(&project.created_at))),
                    ]),
                ]),
                div([class("flex space-x-2 ml-4")], [
                    if actions.view_tasks {
                        button([
                            on_click(move |_| ProjectMsg::Select(id)),
                            class("bg-ctp-blue text-ctp-base px-3 py-1 rounded text-sm"),
                            r#type("button"),
                        ], [text("View Tasks")])
                    } else {
                        span([], [])
                    },
                    if actions.complete {
                        button([
                            on_click(move |_| ProjectMsg::Complete(id)),
                            class("bg-ctp-green text-ctp-base px-3 py-1 rounded text-sm"),
                            r#type("button"),
                        ], [text("Complete")])
                    } else {
                        span([], [])
                    },
                    button([
                        on_click(move |_| ProjectMsg::StartEdit(id)),
                        class("bg-ctp-blue text-ctp-base px-3 py-1 rounded text-sm"),
                        r#type("button"),
                    ], [text("Edit")]),
                    button([
                        on_click(move |_| ProjectMsg::Delete(id)),
                        class("bg-ctp-red text-ctp-base px-3 py-1 rounded text-sm"),
                        r#type("button"),
                    ], [text("Delete")]),
                ]),
            ]),
        ])
    }
}
