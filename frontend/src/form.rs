use shared::{
    datetime, CreateProjectRequest, CreateTaskRequest, Project, Task, UpdateProjectRequest,
    UpdateTaskRequest,
};
use uuid::Uuid;

/// State of a view's create/edit form. Submission dispatches on the variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Closed,
    Creating,
    Editing(Uuid),
}

impl FormMode {
    pub fn is_open(&self) -> bool {
        !matches!(self, FormMode::Closed)
    }

    /// Header button: opens a blank create form, or closes whatever is open.
    pub fn toggled(self) -> Self {
        if self.is_open() {
            FormMode::Closed
        } else {
            FormMode::Creating
        }
    }

    pub fn submit_label(&self, noun: &str) -> String {
        match self {
            FormMode::Editing(_) => format!("Update {noun}"),
            _ => format!("Create {noun}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub deadline: String,
}

impl ProjectDraft {
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            deadline: project
                .deadline
                .as_ref()
                .map(datetime::to_local_input_value)
                .unwrap_or_default(),
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn create_request(&self) -> CreateProjectRequest {
        CreateProjectRequest {
            title: self.title.trim().to_string(),
            deadline: datetime::parse_local_input_value(&self.deadline),
        }
    }

    pub fn update_request(&self) -> UpdateProjectRequest {
        UpdateProjectRequest {
            title: Some(self.title.trim().to_string()),
            deadline: datetime::parse_local_input_value(&self.deadline),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub deadline: String,
}

impl TaskDraft {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            deadline: task
                .deadline
                .as_ref()
                .map(datetime::to_local_input_value)
                .unwrap_or_default(),
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn create_request(&self, project_id: Option<Uuid>) -> CreateTaskRequest {
        CreateTaskRequest {
            title: self.title.trim().to_string(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            deadline: datetime::parse_local_input_value(&self.deadline),
            project_id,
        }
    }

    /// Description is always sent so that clearing it sticks.
    pub fn update_request(&self) -> UpdateTaskRequest {
        UpdateTaskRequest {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.clone()),
            deadline: datetime::parse_local_input_value(&self.deadline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn toggle_opens_create_and_closes_anything() {
        assert_eq!(FormMode::Closed.toggled(), FormMode::Creating);
        assert_eq!(FormMode::Creating.toggled(), FormMode::Closed);
        assert_eq!(FormMode::Editing(Uuid::nil()).toggled(), FormMode::Closed);
    }

    #[test]
    fn submit_label_follows_mode() {
        assert_eq!(FormMode::Creating.submit_label("Task"), "Create Task");
        assert_eq!(
            FormMode::Editing(Uuid::nil()).submit_label("Project"),
            "Update Project"
        );
    }

    #[test]
    fn empty_deadline_and_description_are_unset_on_create() {
        let draft = TaskDraft {
            title: "Buy milk".to_string(),
            description: String::new(),
            deadline: String::new(),
        };
        let project = Uuid::from_u128(9);
        let request = draft.create_request(Some(project));
        assert_eq!(request.title, "Buy milk");
        assert_eq!(request.description, None);
        assert_eq!(request.deadline, None);
        assert_eq!(request.project_id, Some(project));
    }

    #[test]
    fn edit_draft_round_trips_the_deadline_to_the_minute() {
        let deadline = Utc.with_ymd_and_hms(2025, 2, 14, 18, 30, 0).unwrap();
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let project = Project {
            id: Uuid::from_u128(1),
            title: "Launch".to_string(),
            deadline: Some(deadline),
            completed: false,
            created_at: created,
            updated_at: created,
        };
        let draft = ProjectDraft::from_project(&project);
        assert!(!draft.deadline.is_empty());

        let request = draft.update_request();
        assert_eq!(request.title.as_deref(), Some("Launch"));
        assert_eq!(request.deadline, Some(deadline));
    }

    #[test]
    fn blank_title_is_not_submittable() {
        let draft = ProjectDraft {
            title: "   ".to_string(),
            deadline: String::new(),
        };
        assert!(!draft.has_title());
    }
}
