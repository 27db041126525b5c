//! In-process pingback repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use url::Url;

use crate::domain::entities::{NewPingback, Pingback};
use crate::domain::repositories::PingbackRepository;
use crate::error::AppError;
use crate::utils::url_normalizer::comparison_key;

#[derive(Default)]
struct Store {
    targets: HashSet<String>,
    pingbacks: BTreeMap<i64, Pingback>,
    pairs: HashSet<(String, String)>,
    next_id: i64,
}

/// Volatile repository kept in process memory.
///
/// Used by the development server and tests. Contents are lost on restart.
/// The lock is only held around map operations, never across I/O.
#[derive(Default)]
pub struct MemoryPingbackRepository {
    store: RwLock<Store>,
}

impl MemoryPingbackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository with `targets` already published.
    pub fn with_targets<'a>(targets: impl IntoIterator<Item = &'a Url>) -> Self {
        let store = Store {
            targets: targets.into_iter().map(comparison_key).collect(),
            ..Store::default()
        };
        Self {
            store: RwLock::new(store),
        }
    }

    fn pair_key(source: &Url, target: &Url) -> (String, String) {
        (comparison_key(source), comparison_key(target))
    }
}

#[async_trait]
impl PingbackRepository for MemoryPingbackRepository {
    async fn target_exists(&self, target: &Url) -> Result<bool, AppError> {
        let store = self.store.read().await;
        Ok(store.targets.contains(&comparison_key(target)))
    }

    async fn pingback_exists(&self, source: &Url, target: &Url) -> Result<bool, AppError> {
        let store = self.store.read().await;
        Ok(store.pairs.contains(&Self::pair_key(source, target)))
    }

    async fn save_pingback(&self, new_pingback: NewPingback) -> Result<Pingback, AppError> {
        let key = Self::pair_key(&new_pingback.source_url, &new_pingback.target_url);

        let mut store = self.store.write().await;
        if !store.pairs.insert(key) {
            return Err(AppError::conflict(
                "Pingback already registered",
                json!({
                    "source": new_pingback.source_url.as_str(),
                    "target": new_pingback.target_url.as_str(),
                }),
            ));
        }

        store.next_id += 1;
        let pingback = Pingback {
            id: store.next_id,
            source_url: new_pingback.source_url,
            source_title: new_pingback.source_title,
            source_domain: new_pingback.source_domain,
            target_url: new_pingback.target_url,
            source_ip: new_pingback.source_ip,
            received_at: Utc::now(),
        };
        store.pingbacks.insert(pingback.id, pingback.clone());

        Ok(pingback)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Pingback>, AppError> {
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        let store = self.store.read().await;
        Ok(store
            .pingbacks
            .values()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let store = self.store.read().await;
        Ok(store.pingbacks.len() as i64)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        let Some(pingback) = store.pingbacks.remove(&id) else {
            return Err(AppError::not_found(
                "Pingback not found",
                json!({ "id": id }),
            ));
        };

        let key = Self::pair_key(&pingback.source_url, &pingback.target_url);
        store.pairs.remove(&key);
        Ok(())
    }

    async fn clear(&self) -> Result<u64, AppError> {
        let mut store = self.store.write().await;
        let removed = store.pingbacks.len() as u64;
        store.pingbacks.clear();
        store.pairs.clear();
        Ok(removed)
    }

    async fn publish_target(&self, url: &Url) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        Ok(store.targets.insert(comparison_key(url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn new_pingback(source: &str, target: &str) -> NewPingback {
        let source = url(source);
        NewPingback {
            source_domain: source.host_str().unwrap().to_string(),
            source_url: source,
            source_title: None,
            target_url: url(target),
            source_ip: None,
        }
    }

    #[tokio::test]
    async fn test_target_lookup_ignores_trailing_slash() {
        let repo = MemoryPingbackRepository::with_targets([&url("https://blog.example/post/")]);

        assert!(repo.target_exists(&url("https://blog.example/post")).await.unwrap());
        assert!(!repo.target_exists(&url("https://blog.example/other")).await.unwrap());
    }

    #[tokio::test]
    async fn test_publish_target_reports_new() {
        let repo = MemoryPingbackRepository::new();
        let target = url("https://blog.example/post");

        assert!(repo.publish_target(&target).await.unwrap());
        assert!(!repo.publish_target(&target).await.unwrap());
        assert!(repo.target_exists(&target).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate_pair() {
        let repo = MemoryPingbackRepository::new();

        let first = repo
            .save_pingback(new_pingback("https://a.example/1", "https://blog.example/p"))
            .await
            .unwrap();
        assert_eq!(first.id, 1);

        let duplicate = repo
            .save_pingback(new_pingback("https://a.example/1/", "https://blog.example/p"))
            .await;
        assert!(matches!(duplicate, Err(AppError::Conflict { .. })));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_saves_store_once() {
        let repo = Arc::new(MemoryPingbackRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.save_pingback(new_pingback("https://a.example/1", "https://blog.example/p"))
                        .await
                })
            })
            .collect();

        let mut stored = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                stored += 1;
            }
        }

        assert_eq!(stored, 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_paging() {
        let repo = MemoryPingbackRepository::new();
        for i in 1..=3 {
            repo.save_pingback(new_pingback(
                &format!("https://a.example/{i}"),
                "https://blog.example/p",
            ))
            .await
            .unwrap();
        }

        let page: Vec<i64> = repo.list(0, 2).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(page, vec![3, 2]);

        let page: Vec<i64> = repo.list(2, 2).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(page, vec![1]);
    }

    #[tokio::test]
    async fn test_delete_allows_reregistration() {
        let repo = MemoryPingbackRepository::new();
        let saved = repo
            .save_pingback(new_pingback("https://a.example/1", "https://blog.example/p"))
            .await
            .unwrap();

        repo.delete(saved.id).await.unwrap();

        assert!(
            !repo
                .pingback_exists(&url("https://a.example/1"), &url("https://blog.example/p"))
                .await
                .unwrap()
        );
        assert!(matches!(
            repo.delete(saved.id).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_clear() {
        let repo = MemoryPingbackRepository::new();
        repo.save_pingback(new_pingback("https://a.example/1", "https://blog.example/p"))
            .await
            .unwrap();
        repo.save_pingback(new_pingback("https://a.example/2", "https://blog.example/p"))
            .await
            .unwrap();

        assert_eq!(repo.clear().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
