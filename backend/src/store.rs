use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use shared::{Project, Task};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for tasks and projects. Listings come back in no particular
/// order.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;
    async fn save_task(&self, task: &Task) -> Result<(), StoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;
    async fn save_project(&self, project: &Project) -> Result<(), StoreError>;
    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Records live as JSON strings under `task:{id}` and `project:{id}`.
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub fn open(url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::open(url)?,
        })
    }

    async fn load_all<T: DeserializeOwned + Send>(&self, pattern: &str) -> Result<Vec<T>, StoreError> {
        let mut conn = self.client.get_async_connection().await?;
        let keys: Vec<String> = conn.keys(pattern).await?;

        let mut items = Vec::with_capacity(keys.len());
        for key in keys {
            let json: Option<String> = conn.get(&key).await?;
            let Some(json) = json else { continue };
            match serde_json::from_str(&json) {
                Ok(item) => items.push(item),
                Err(err) => tracing::warn!(%key, error = %err, "skipping undecodable record"),
            }
        }
        Ok(items)
    }

    async fn load_one<T: DeserializeOwned + Send>(&self, key: String) -> Result<Option<T>, StoreError> {
        let mut conn = self.client.get_async_connection().await?;
        let json: Option<String> = conn.get(&key).await?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put<T: Serialize + Sync>(&self, key: String, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.client.get_async_connection().await?;
        let _: () = conn.set(&key, json).await?;
        Ok(())
    }

    async fn remove(&self, key: String) -> Result<bool, StoreError> {
        let mut conn = self.client.get_async_connection().await?;
        let deleted: usize = conn.del(&key).await?;
        Ok(deleted > 0)
    }
}

fn task_key(id: Uuid) -> String {
    format!("task:{id}")
}

fn project_key(id: Uuid) -> String {
    format!("project:{id}")
}

#[async_trait]
impl Store for RedisStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.load_all("task:*").await
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        self.load_one(task_key(id)).await
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        self.put(task_key(task.id), task).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        self.remove(task_key(id)).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.load_all("project:*").await
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        self.load_one(project_key(id)).await
    }

    async fn save_project(&self, project: &Project) -> Result<(), StoreError> {
        self.put(project_key(project.id), project).await
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        self.remove(project_key(id)).await
    }
}
