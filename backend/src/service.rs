//! Task and project rules behind the REST routes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    CreateProjectRequest, CreateTaskRequest, Project, Task, UpdateProjectRequest,
    UpdateTaskRequest, MAX_TITLE_LEN,
};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::store::Store;

pub type Result<T> = std::result::Result<T, ServiceError>;

pub struct Service {
    store: Arc<dyn Store>,
}

impl Service {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut tasks = self.store.list_tasks().await?;
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Task> {
        self.store
            .get_task(id)
            .await?
            .ok_or(ServiceError::TaskNotFound(id))
    }

    pub async fn create_task(&self, request: CreateTaskRequest) -> Result<Task> {
        validate_title(&request.title)?;
        let task = Task::new(request);
        if let Some(project_id) = task.project_id {
            let project = self.get_project(project_id).await?;
            check_deadline(&task, &project)?;
        }
        self.store.save_task(&task).await?;
        tracing::debug!(task = %task.id, "task created");
        Ok(task)
    }

    pub async fn update_task(&self, id: Uuid, request: UpdateTaskRequest) -> Result<Task> {
        let mut task = self.get_task(id).await?;
        if let Some(title) = request.title {
            validate_title(&title)?;
            task.title = title;
        }
        if let Some(description) = request.description {
            task.description = Some(description);
        }
        if let Some(deadline) = request.deadline {
            task.deadline = Some(deadline);
            if let Some(project_id) = task.project_id {
                if let Some(project) = self.store.get_project(project_id).await? {
                    check_deadline(&task, &project)?;
                }
            }
        }
        task.updated_at = Utc::now();
        self.store.save_task(&task).await?;
        Ok(task)
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<()> {
        if self.store.delete_task(id).await? {
            Ok(())
        } else {
            Err(ServiceError::TaskNotFound(id))
        }
    }

    /// Completing the last open task of a project completes the project too.
    pub async fn complete_task(&self, id: Uuid) -> Result<Task> {
        let mut task = self.get_task(id).await?;
        if task.completed {
            return Ok(task);
        }
        task.completed = true;
        task.updated_at = Utc::now();
        self.store.save_task(&task).await?;
        tracing::info!(task = %task.id, project = ?task.project_id, "task completed");

        if let Some(project_id) = task.project_id {
            self.complete_project_if_done(project_id).await?;
        }
        Ok(task)
    }

    async fn complete_project_if_done(&self, project_id: Uuid) -> Result<()> {
        let Some(mut project) = self.store.get_project(project_id).await? else {
            return Ok(());
        };
        if project.completed {
            return Ok(());
        }
        let tasks = self.tasks_of(project_id).await?;
        if tasks.iter().all(|t| t.completed) {
            project.completed = true;
            project.updated_at = Utc::now();
            self.store.save_project(&project).await?;
            tracing::info!(project = %project_id, "project completed with its last task");
        }
        Ok(())
    }

    pub async fn link_task(&self, task_id: Uuid, project_id: Uuid) -> Result<Task> {
        let mut task = self.get_task(task_id).await?;
        let project = self.get_project(project_id).await?;
        if let Some(current) = task.project_id {
            return Err(ServiceError::AlreadyLinked {
                task_id,
                project_id: current,
            });
        }
        check_deadline(&task, &project)?;

        task.project_id = Some(project_id);
        task.updated_at = Utc::now();
        self.store.save_task(&task).await?;
        Ok(task)
    }

    pub async fn unlink_task(&self, task_id: Uuid) -> Result<Task> {
        let mut task = self.get_task(task_id).await?;
        if task.project_id.is_none() {
            return Err(ServiceError::NotLinked(task_id));
        }
        task.project_id = None;
        task.updated_at = Utc::now();
        self.store.save_task(&task).await?;
        Ok(task)
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let mut projects = self.store.list_projects().await?;
        projects.sort_by_key(|p| p.created_at);
        Ok(projects)
    }

    pub async fn get_project(&self, id: Uuid) -> Result<Project> {
        self.store
            .get_project(id)
            .await?
            .ok_or(ServiceError::ProjectNotFound(id))
    }

    pub async fn create_project(&self, request: CreateProjectRequest) -> Result<Project> {
        validate_title(&request.title)?;
        let project = Project::new(request);
        self.store.save_project(&project).await?;
        tracing::debug!(project = %project.id, "project created");
        Ok(project)
    }

    /// A new deadline pulls in any task deadline that lies after it.
    pub async fn update_project(&self, id: Uuid, request: UpdateProjectRequest) -> Result<Project> {
        let mut project = self.get_project(id).await?;
        if let Some(title) = request.title {
            validate_title(&title)?;
            project.title = title;
        }
        if let Some(deadline) = request.deadline {
            project.deadline = Some(deadline);
            for mut task in self.tasks_of(id).await? {
                if task.deadline.is_some_and(|d| d > deadline) {
                    task.deadline = Some(deadline);
                    task.updated_at = Utc::now();
                    self.store.save_task(&task).await?;
                }
            }
        }
        project.updated_at = Utc::now();
        self.store.save_project(&project).await?;
        Ok(project)
    }

    /// Tasks keep their reference to a deleted project.
    pub async fn delete_project(&self, id: Uuid) -> Result<()> {
        if self.store.delete_project(id).await? {
            Ok(())
        } else {
            Err(ServiceError::ProjectNotFound(id))
        }
    }

    pub async fn project_tasks(&self, id: Uuid) -> Result<Vec<Task>> {
        self.get_project(id).await?;
        self.tasks_of(id).await
    }

    pub async fn complete_project(&self, id: Uuid) -> Result<Project> {
        let mut project = self.get_project(id).await?;
        if project.completed {
            return Ok(project);
        }
        let open_tasks = self
            .tasks_of(id)
            .await?
            .iter()
            .filter(|t| !t.completed)
            .count();
        if open_tasks > 0 {
            return Err(ServiceError::ProjectHasOpenTasks {
                project_id: id,
                open_tasks,
            });
        }
        project.completed = true;
        project.updated_at = Utc::now();
        self.store.save_project(&project).await?;
        tracing::info!(project = %id, "project completed");
        Ok(project)
    }

    async fn tasks_of(&self, project_id: Uuid) -> Result<Vec<Task>> {
        Ok(self
            .list_tasks()
            .await?
            .into_iter()
            .filter(|t| t.project_id == Some(project_id))
            .collect())
    }
}

fn validate_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_LEN {
        return Err(ServiceError::Validation(format!(
            "title must be between 1 and {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn check_deadline(task: &Task, project: &Project) -> Result<()> {
    let (Some(task_deadline), Some(project_deadline)) = (task.deadline, project.deadline) else {
        return Ok(());
    };
    if task_deadline > project_deadline {
        return Err(deadline_error(task, project, task_deadline, project_deadline));
    }
    Ok(())
}

fn deadline_error(
    task: &Task,
    project: &Project,
    task_deadline: DateTime<Utc>,
    project_deadline: DateTime<Utc>,
) -> ServiceError {
    ServiceError::DeadlineAfterProject {
        task_id: task.id,
        project_id: project.id,
        task_deadline,
        project_deadline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use chrono::Duration;

    fn service() -> Service {
        Service::new(Arc::new(MemoryStore::default()))
    }

    fn new_task(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            description: None,
            deadline: None,
            project_id: None,
        }
    }

    fn new_project(title: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            title: title.to_string(),
            deadline: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_blank_and_overlong_titles() {
        let service = service();
        assert!(matches!(
            service.create_task(new_task("")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.create_project(new_project(&"x".repeat(MAX_TITLE_LEN + 1))).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn creating_a_task_for_a_missing_project_fails() {
        let service = service();
        let mut request = new_task("orphan");
        request.project_id = Some(Uuid::new_v4());
        assert!(matches!(
            service.create_task(request).await,
            Err(ServiceError::ProjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn task_deadline_cannot_pass_project_deadline() {
        let service = service();
        let deadline = Utc::now() + Duration::days(7);
        let project = service
            .create_project(CreateProjectRequest {
                title: "Release".to_string(),
                deadline: Some(deadline),
            })
            .await
            .unwrap();

        let mut request = new_task("late");
        request.project_id = Some(project.id);
        request.deadline = Some(deadline + Duration::days(1));
        assert!(matches!(
            service.create_task(request).await,
            Err(ServiceError::DeadlineAfterProject { .. })
        ));

        let mut free = new_task("free");
        free.deadline = Some(deadline + Duration::days(1));
        let free = service.create_task(free).await.unwrap();
        assert!(matches!(
            service.link_task(free.id, project.id).await,
            Err(ServiceError::DeadlineAfterProject { .. })
        ));
    }

    #[tokio::test]
    async fn update_only_touches_provided_fields() {
        let service = service();
        let mut request = new_task("Write");
        request.description = Some("draft".to_string());
        let task = service.create_task(request).await.unwrap();

        let updated = service
            .update_task(
                task.id,
                UpdateTaskRequest {
                    title: Some("Rewrite".to_string()),
                    ..UpdateTaskRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Rewrite");
        assert_eq!(updated.description.as_deref(), Some("draft"));
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn completing_the_last_task_completes_the_project() {
        let service = service();
        let project = service.create_project(new_project("Move")).await.unwrap();
        let mut first = new_task("pack");
        first.project_id = Some(project.id);
        let first = service.create_task(first).await.unwrap();
        let mut second = new_task("ship");
        second.project_id = Some(project.id);
        let second = service.create_task(second).await.unwrap();

        service.complete_task(first.id).await.unwrap();
        assert!(!service.get_project(project.id).await.unwrap().completed);

        service.complete_task(second.id).await.unwrap();
        assert!(service.get_project(project.id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn complete_task_is_idempotent() {
        let service = service();
        let task = service.create_task(new_task("once")).await.unwrap();
        let first = service.complete_task(task.id).await.unwrap();
        let second = service.complete_task(task.id).await.unwrap();
        assert!(second.completed);
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn project_with_open_tasks_cannot_complete() {
        let service = service();
        let project = service.create_project(new_project("Garden")).await.unwrap();
        let mut request = new_task("weed");
        request.project_id = Some(project.id);
        service.create_task(request).await.unwrap();

        assert!(matches!(
            service.complete_project(project.id).await,
            Err(ServiceError::ProjectHasOpenTasks { open_tasks: 1, .. })
        ));

        let empty = service.create_project(new_project("Empty")).await.unwrap();
        assert!(service.complete_project(empty.id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn earlier_project_deadline_pulls_in_task_deadlines() {
        let service = service();
        let start = Utc::now();
        let project = service.create_project(new_project("Trip")).await.unwrap();
        let mut request = new_task("book");
        request.project_id = Some(project.id);
        request.deadline = Some(start + Duration::days(10));
        let task = service.create_task(request).await.unwrap();

        let new_deadline = start + Duration::days(3);
        service
            .update_project(
                project.id,
                UpdateProjectRequest {
                    title: None,
                    deadline: Some(new_deadline),
                },
            )
            .await
            .unwrap();
        assert_eq!(service.get_task(task.id).await.unwrap().deadline, Some(new_deadline));
    }

    #[tokio::test]
    async fn link_and_unlink_rules() {
        let service = service();
        let project = service.create_project(new_project("Home")).await.unwrap();
        let task = service.create_task(new_task("fix sink")).await.unwrap();

        assert!(matches!(
            service.unlink_task(task.id).await,
            Err(ServiceError::NotLinked(_))
        ));

        let linked = service.link_task(task.id, project.id).await.unwrap();
        assert_eq!(linked.project_id, Some(project.id));
        assert!(matches!(
            service.link_task(task.id, project.id).await,
            Err(ServiceError::AlreadyLinked { .. })
        ));
        assert_eq!(service.project_tasks(project.id).await.unwrap().len(), 1);

        let unlinked = service.unlink_task(task.id).await.unwrap();
        assert_eq!(unlinked.project_id, None);
        assert!(service.project_tasks(project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listings_are_ordered_by_creation() {
        let store = Arc::new(MemoryStore::default());
        let start = Utc::now();
        for (offset, title) in [(2, "three"), (0, "one"), (1, "two")] {
            let mut task = Task::new(new_task(title));
            task.created_at = start + Duration::seconds(offset);
            store.save_task(&task).await.unwrap();
        }
        let service = Service::new(store);
        let titles: Vec<_> = service
            .list_tasks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn deleting_twice_reports_not_found() {
        let service = service();
        let project = service.create_project(new_project("Gone")).await.unwrap();
        service.delete_project(project.id).await.unwrap();
        assert!(matches!(
            service.delete_project(project.id).await,
            Err(ServiceError::ProjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleted_project_leaves_task_reference_behind() {
        let service = service();
        let project = service.create_project(new_project("Old")).await.unwrap();
        let mut request = new_task("leftover");
        request.project_id = Some(project.id);
        let task = service.create_task(request).await.unwrap();

        service.delete_project(project.id).await.unwrap();
        assert_eq!(service.get_task(task.id).await.unwrap().project_id, Some(project.id));
    }
}
