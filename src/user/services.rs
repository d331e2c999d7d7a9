use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, User};
use crate::{
    common::{non_blank, PageResult, PageWindow},
    error::{AppError, AppResult},
    state::AppState,
    wechat::IdentityProvider,
};

/// Maps WeChat identities to local customer accounts.
#[derive(Clone)]
pub struct UserService {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.identity.clone(), state.users.clone())
    }
}

impl UserService {
    pub fn new(provider: Arc<dyn IdentityProvider>, users: Arc<dyn UserStore>) -> Self {
        Self { provider, users }
    }

    /// Resolves `code` with WeChat and returns the (possibly new) local user.
    #[instrument(skip(self, code))]
    pub async fn login(&self, code: &str) -> AppResult<User> {
        if code.trim().is_empty() {
            return Err(AppError::BadRequest("code must not be empty".into()));
        }
        let openid = self.provider.resolve_openid(code).await?;
        self.provision(&openid).await
    }

    /// Find-or-create by openid.
    ///
    /// Two first-time logins for the same openid may both miss the lookup;
    /// the loser of the insert gets [`StoreError::Conflict`] from the unique
    /// index and returns the winner's row instead.
    #[instrument(skip(self, openid))]
    pub async fn provision(&self, openid: &str) -> AppResult<User> {
        if let Some(user) = self.users.find_by_openid(openid).await? {
            return Ok(user);
        }

        match self.users.create(NewUser::for_openid(openid)).await {
            Ok(user) => {
                info!(user_id = %user.id, "provisioned new user");
                Ok(user)
            }
            Err(StoreError::Conflict) => {
                warn!("concurrent first login, re-fetching existing user");
                self.users.find_by_openid(openid).await?.ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!("user vanished after insert conflict"))
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".into()))
    }

    /// Back-office listing of customers, filtered by a name fragment.
    pub async fn page(
        &self,
        name: Option<String>,
        page: i64,
        page_size: i64,
    ) -> AppResult<PageResult<User>> {
        let name = non_blank(name);
        let (total, records) = self
            .users
            .page(name.as_deref(), PageWindow::new(page, page_size))
            .await?;
        Ok(PageResult { total, records })
    }

    pub async fn count(&self) -> AppResult<i64> {
        Ok(self.users.count().await?)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    /// Provider answering from a fixed code -> openid table.
    pub struct ScriptedProvider(pub HashMap<String, String>);

    impl ScriptedProvider {
        pub fn new(pairs: &[(&str, &str)]) -> Self {
            Self(
                pairs
                    .iter()
                    .map(|(c, o)| (c.to_string(), o.to_string()))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl IdentityProvider for ScriptedProvider {
        async fn resolve_openid(&self, code: &str) -> Result<String, AppError> {
            self.0.get(code).cloned().ok_or(AppError::LoginFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::fakes::ScriptedProvider;
    use super::*;
    use crate::user::repo::memory::MemoryUserStore;

    fn service(store: Arc<MemoryUserStore>) -> UserService {
        let provider = ScriptedProvider::new(&[
            ("abc123", "wx-001"),
            ("def456", "wx-001"),
            ("zzz999", "wx-002"),
        ]);
        UserService::new(Arc::new(provider), store)
    }

    #[tokio::test]
    async fn first_login_creates_exactly_one_user() {
        let store = Arc::new(MemoryUserStore::new());
        let svc = service(store.clone());

        let user = svc.login("abc123").await.expect("login");
        assert_eq!(user.openid, "wx-001");
        assert!(user.name.is_none());
        assert!(user.create_time <= time::OffsetDateTime::now_utc());
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn repeat_login_with_new_code_returns_same_user() {
        let store = Arc::new(MemoryUserStore::new());
        let svc = service(store.clone());

        let first = svc.login("abc123").await.expect("first login");
        let second = svc.login("def456").await.expect("second login");
        assert_eq!(first, second);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn existing_user_is_returned_untouched() {
        let store = Arc::new(MemoryUserStore::new());
        let mut existing = User::from(NewUser::for_openid("wx-002"));
        existing.name = Some("Ada".into());
        store.seed(existing.clone());

        let user = service(store.clone()).login("zzz999").await.expect("login");
        assert_eq!(user, existing);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_code_fails_without_touching_store() {
        let store = Arc::new(MemoryUserStore::new());
        let err = service(store.clone()).login("bad").await.unwrap_err();
        assert!(matches!(err, AppError::LoginFailed));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn blank_code_is_rejected() {
        let store = Arc::new(MemoryUserStore::new());
        let err = service(store).login("   ").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_persistence_error() {
        let store = Arc::new(MemoryUserStore::new());
        store.set_unavailable(true);
        let err = service(store).login("abc123").await.unwrap_err();
        assert!(matches!(err, AppError::PersistenceUnavailable(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_first_logins_converge_on_one_row() {
        let store = Arc::new(MemoryUserStore::with_racing_lookups(2));
        let svc = service(store.clone());

        let a = tokio::spawn({
            let svc = svc.clone();
            async move { svc.login("abc123").await }
        });
        let b = tokio::spawn({
            let svc = svc.clone();
            async move { svc.login("def456").await }
        });

        let a = a.await.unwrap().expect("login a");
        let b = b.await.unwrap().expect("login b");

        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(store.conflicts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let store = Arc::new(MemoryUserStore::new());
        let err = service(store).get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn page_filters_by_name_and_counts_everyone() {
        let store = Arc::new(MemoryUserStore::new());
        for (openid, name) in [("wx-a", Some("Wang Wei")), ("wx-b", Some("Li Na")), ("wx-c", None)] {
            let mut u = User::from(NewUser::for_openid(openid));
            u.name = name.map(String::from);
            store.seed(u);
        }
        let svc = service(store);

        let all = svc.page(None, 1, 10).await.expect("page");
        assert_eq!(all.total, 3);
        assert_eq!(all.records.len(), 3);

        let wang = svc.page(Some(" Wang ".into()), 1, 10).await.expect("page");
        assert_eq!(wang.total, 1);
        assert_eq!(wang.records[0].openid, "wx-a");

        let second = svc.page(None, 2, 2).await.expect("page");
        assert_eq!(second.total, 3);
        assert_eq!(second.records.len(), 1);

        assert_eq!(svc.count().await.expect("count"), 3);
    }

    #[tokio::test]
    async fn count_surfaces_store_outage() {
        let store = Arc::new(MemoryUserStore::new());
        store.set_unavailable(true);
        let err = service(store).count().await.unwrap_err();
        assert!(matches!(err, AppError::PersistenceUnavailable(_)));
    }
}
