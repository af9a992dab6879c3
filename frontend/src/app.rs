use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use shared::Project;

use crate::api::Dispatch;
use crate::project_view::{ProjectMsg, ProjectView};
use crate::task_view::{TaskMsg, TaskView};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Tasks,
    Projects,
}

impl Tab {
    fn label(&self) -> &'static str {
        match self {
            Tab::Tasks => "Tasks",
            Tab::Projects => "Projects",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Msg {
    SelectTab(Tab),
    BackToProjects,
    Projects(ProjectMsg),
    Tasks(TaskMsg),
}

/// Calls produced by one shell step, grouped by the view awaiting them.
#[derive(Debug, Default)]
pub struct Pending {
    pub projects: Vec<Dispatch<ProjectMsg>>,
    pub tasks: Vec<Dispatch<TaskMsg>>,
}

pub struct App {
    base_url: &'static str,
    tab: Tab,
    selected: Option<Project>,
    projects: ProjectView,
    tasks: TaskView,
}

impl App {
    pub fn new(base_url: &'static str) -> Self {
        Self {
            base_url,
            tab: Tab::default(),
            selected: None,
            projects: ProjectView::new(true),
            tasks: TaskView::new(None),
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn selected(&self) -> Option<&Project> {
        self.selected.as_ref()
    }

    pub fn projects(&self) -> &ProjectView {
        &self.projects
    }

    pub fn tasks(&self) -> &TaskView {
        &self.tasks
    }

    /// Only the default tab is mounted at start-up.
    pub fn start(&mut self) -> Pending {
        Pending {
            tasks: self.tasks.load(),
            ..Pending::default()
        }
    }

    pub fn step(&mut self, msg: Msg) -> Pending {
        match msg {
            Msg::SelectTab(tab) => {
                self.tab = tab;
                self.selected = None;
                match tab {
                    Tab::Tasks => {
                        let mut tasks = self.tasks.rescope(None);
                        if tasks.is_empty() {
                            tasks = self.tasks.load();
                        }
                        Pending {
                            tasks,
                            ..Pending::default()
                        }
                    }
                    Tab::Projects => Pending {
                        projects: self.projects.load(),
                        ..Pending::default()
                    },
                }
            }
            Msg::BackToProjects => {
                self.selected = None;
                self.tab = Tab::Projects;
                Pending {
                    projects: self.projects.load(),
                    ..Pending::default()
                }
            }
            Msg::Projects(ProjectMsg::Select(id)) => match self.projects.find(id).cloned() {
                Some(project) => {
                    tracing::info!(project = %project.id, title = %project.title, "viewing project tasks");
                    self.selected = Some(project);
                    Pending {
                        tasks: self.tasks.rescope(Some(id)),
                        ..Pending::default()
                    }
                }
                None => {
                    tracing::warn!(%id, "selected project is not loaded");
                    Pending::default()
                }
            },
            Msg::Projects(msg) => Pending {
                projects: self.projects.update(msg),
                ..Pending::default()
            },
            Msg::Tasks(msg) => Pending {
                tasks: self.tasks.update(msg),
                ..Pending::default()
            },
        }
    }

    fn commands(&self, pending: Pending) -> Cmd<Msg> {
        let mut cmds = Vec::new();
        cmds.extend(pending.projects.into_iter().map(|d| self.command(d, Msg::Projects)));
        cmds.extend(pending.tasks.into_iter().map(|d| self.command(d, Msg::Tasks)));
        Cmd::batch(cmds)
    }

    fn command<M: 'static>(&self, dispatch: Dispatch<M>, wrap: fn(M) -> Msg) -> Cmd<Msg> {
        let base_url = self.base_url;
        let Dispatch { call, reply } = dispatch;
        Cmd::new(async move { wrap((*reply)(call.send(base_url).await)) })
    }

    fn view_tab(&self, tab: Tab) -> Node<Msg> {
        let is_active = self.tab == tab && self.selected.is_none();
        button([
            on_click(move |_| Msg::SelectTab(tab)),
            r#type("button"),
            class(&format!(
                "py-4 px-1 border-b-2 font-medium text-sm {}",
                if is_active {
                    "border-ctp-blue text-ctp-blue"
                } else {
                    "border-transparent text-ctp-subtext0 hover:text-ctp-text hover:border-ctp-surface2"
                }
            )),
        ], [text(tab.label())])
    }

    fn view_content(&self) -> Node<Msg> {
        if let Some(project) = &self.selected {
            return div([class("space-y-4")], [
                div([class("flex items-center space-x-4")], [
                    button([
                        on_click(|_| Msg::BackToProjects),
                        r#type("button"),
                        class("text-ctp-blue hover:text-ctp-sapphire"),
                    ], [text("← Back to Projects")]),
                    h2([class("text-xl font-semibold text-ctp-text")], [
                        text(format!("Tasks for: {}", project.title)),
                    ]),
                ]),
                self.tasks.view().map_msg(Msg::Tasks),
            ]);
        }
        match self.tab {
            Tab::Tasks => self.tasks.view().map_msg(Msg::Tasks),
            Tab::Projects => self.projects.view().map_msg(Msg::Projects),
        }
    }
}

impl Application for App {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        let pending = self.start();
        self.commands(pending)
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        let pending = self.step(msg);
        self.commands(pending)
    }

    fn view(&self) -> Node<Msg> {
        div([class("min-h-screen bg-ctp-base text-ctp-text")], [
            div([class("max-w-6xl mx-auto px-4 py-8")], [
                header([class("mb-8")], [
                    h1([class("text-3xl font-bold text-ctp-text mb-2")], [text("Task Manager")]),
                ]),
                div([class("bg-ctp-mantle rounded-lg shadow-sm border border-ctp-surface0")], [
                    div([class("border-b border-ctp-surface0")], [
                        nav([class("flex space-x-8 px-6")], [
                            self.view_tab(Tab::Tasks),
                            self.view_tab(Tab::Projects),
                        ]),
                    ]),
                    div([class("p-6")], [self.view_content()]),
                ]),
            ]),
        ])
    }
}
