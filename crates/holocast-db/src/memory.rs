//! In-memory project store: a RwLock'd map with the same claim semantics
//! as the Postgres backend. Backs tests and database-less deployments.

use async_trait::async_trait;
use chrono::Utc;
use holocast_core::models::{HologramSettings, OverlayKind, Project, ProjectStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::traits::{ClaimOutcome, ProjectStore, StoreError, StoreResult};

#[derive(Clone, Default)]
pub struct InMemoryProjectStore {
    projects: Arc<RwLock<HashMap<Uuid, Project>>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn mutate<F>(&self, id: Uuid, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Project),
    {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        f(project);
        project.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn insert(&self, project: &Project) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects.get(&id).cloned())
    }

    async fn list(&self, limit: i64) -> StoreResult<Vec<Project>> {
        let projects = self.projects.read().await;
        let mut all: Vec<Project> = projects.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit.max(0) as usize);
        Ok(all)
    }

    async fn count(&self) -> StoreResult<i64> {
        let projects = self.projects.read().await;
        Ok(projects.len() as i64)
    }

    async fn set_base_video(
        &self,
        id: Uuid,
        path: &str,
        filename: &str,
        size: i64,
    ) -> StoreResult<()> {
        self.mutate(id, |project| {
            project.base_video_path = Some(path.to_string());
            project.base_video_filename = Some(filename.to_string());
            project.base_video_size = Some(size);
        })
        .await
    }

    async fn set_overlay_media(
        &self,
        id: Uuid,
        path: &str,
        filename: &str,
        size: i64,
        kind: OverlayKind,
    ) -> StoreResult<()> {
        self.mutate(id, |project| {
            project.overlay_media_path = Some(path.to_string());
            project.overlay_media_filename = Some(filename.to_string());
            project.overlay_media_size = Some(size);
            project.overlay_media_kind = Some(kind);
        })
        .await
    }

    async fn begin_processing(
        &self,
        id: Uuid,
        settings: &HologramSettings,
    ) -> StoreResult<ClaimOutcome> {
        let mut projects = self.projects.write().await;
        let Some(project) = projects.get_mut(&id) else {
            return Ok(ClaimOutcome::NotFound);
        };
        if project.status == ProjectStatus::Processing {
            return Ok(ClaimOutcome::AlreadyProcessing);
        }

        project.status = ProjectStatus::Processing;
        project.processing_progress = 0.0;
        project.settings = settings.clone();
        project.output_path = None;
        project.output_size = None;
        project.error_message = None;
        project.updated_at = Utc::now();
        Ok(ClaimOutcome::Claimed)
    }

    async fn update_progress(&self, id: Uuid, progress: f64) -> StoreResult<()> {
        self.mutate(id, |project| {
            project.processing_progress = progress;
        })
        .await
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        output_path: &str,
        output_size: i64,
    ) -> StoreResult<()> {
        self.mutate(id, |project| {
            project.status = ProjectStatus::Completed;
            project.processing_progress = 100.0;
            project.output_path = Some(output_path.to_string());
            project.output_size = Some(output_size);
            project.error_message = None;
        })
        .await
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> StoreResult<()> {
        self.mutate(id, |project| {
            project.status = ProjectStatus::Failed;
            project.processing_progress = 0.0;
            project.error_message = Some(error_message.to_string());
            project.output_path = None;
            project.output_size = None;
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded_project() -> Project {
        let mut project = Project::new("Demo".to_string());
        project.base_video_path = Some("uploads/base.mp4".to_string());
        project.overlay_media_path = Some("uploads/holo.png".to_string());
        project
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryProjectStore::new();
        let project = Project::new("Demo".to_string());
        store.insert(&project).await.unwrap();

        let fetched = store.get(project.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, project.id);
        assert_eq!(fetched.name, "Demo");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = InMemoryProjectStore::new();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let store = InMemoryProjectStore::new();
        let mut older = Project::new("older".to_string());
        older.created_at = Utc::now() - chrono::Duration::minutes(5);
        let newer = Project::new("newer".to_string());
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();

        let listed = store.list(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "newer");

        let limited = store.list(1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].name, "newer");
    }

    #[tokio::test]
    async fn test_set_base_video_on_missing_project() {
        let store = InMemoryProjectStore::new();
        let result = store
            .set_base_video(Uuid::new_v4(), "uploads/base.mp4", "clip.mp4", 100)
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_begin_processing_claims_once() {
        let store = InMemoryProjectStore::new();
        let project = uploaded_project();
        store.insert(&project).await.unwrap();

        let settings = HologramSettings::default();
        assert_eq!(
            store.begin_processing(project.id, &settings).await.unwrap(),
            ClaimOutcome::Claimed
        );
        assert_eq!(
            store.begin_processing(project.id, &settings).await.unwrap(),
            ClaimOutcome::AlreadyProcessing
        );

        let fetched = store.get(project.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProjectStatus::Processing);
        assert_eq!(fetched.processing_progress, 0.0);
    }

    #[tokio::test]
    async fn test_begin_processing_missing_project() {
        let store = InMemoryProjectStore::new();
        let outcome = store
            .begin_processing(Uuid::new_v4(), &HologramSettings::default())
            .await
            .unwrap();
        assert_eq!(outcome, ClaimOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_claims_yield_one_winner() {
        let store = InMemoryProjectStore::new();
        let project = uploaded_project();
        store.insert(&project).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let id = project.id;
            handles.push(tokio::spawn(async move {
                store
                    .begin_processing(id, &HologramSettings::default())
                    .await
                    .unwrap()
            }));
        }

        let mut claimed = 0;
        for handle in handles {
            if handle.await.unwrap() == ClaimOutcome::Claimed {
                claimed += 1;
            }
        }
        assert_eq!(claimed, 1);
    }

    #[tokio::test]
    async fn test_mark_failed_resets_progress_and_clears_output() {
        let store = InMemoryProjectStore::new();
        let project = uploaded_project();
        store.insert(&project).await.unwrap();

        store
            .begin_processing(project.id, &HologramSettings::default())
            .await
            .unwrap();
        store.update_progress(project.id, 60.0).await.unwrap();
        store.mark_failed(project.id, "ffmpeg exploded").await.unwrap();

        let fetched = store.get(project.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProjectStatus::Failed);
        assert_eq!(fetched.processing_progress, 0.0);
        assert_eq!(fetched.error_message.as_deref(), Some("ffmpeg exploded"));
        assert!(fetched.output_path.is_none());
        assert!(fetched.output_size.is_none());
    }

    #[tokio::test]
    async fn test_mark_completed_records_output() {
        let store = InMemoryProjectStore::new();
        let project = uploaded_project();
        store.insert(&project).await.unwrap();

        store
            .begin_processing(project.id, &HologramSettings::default())
            .await
            .unwrap();
        store
            .mark_completed(project.id, "processed/hologram_x.mp4", 1_536_000)
            .await
            .unwrap();

        let fetched = store.get(project.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProjectStatus::Completed);
        assert_eq!(fetched.processing_progress, 100.0);
        assert_eq!(
            fetched.output_path.as_deref(),
            Some("processed/hologram_x.mp4")
        );
        assert_eq!(fetched.output_size, Some(1_536_000));
        assert!(fetched.error_message.is_none());
    }

    #[tokio::test]
    async fn test_reprocessing_failed_project_clears_error() {
        let store = InMemoryProjectStore::new();
        let project = uploaded_project();
        store.insert(&project).await.unwrap();

        store
            .begin_processing(project.id, &HologramSettings::default())
            .await
            .unwrap();
        store.mark_failed(project.id, "first run failed").await.unwrap();

        let outcome = store
            .begin_processing(project.id, &HologramSettings::default())
            .await
            .unwrap();
        assert_eq!(outcome, ClaimOutcome::Claimed);

        let fetched = store.get(project.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProjectStatus::Processing);
        assert!(fetched.error_message.is_none());
    }
}
