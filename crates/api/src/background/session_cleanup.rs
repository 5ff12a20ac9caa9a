//! Periodic purge of sessions whose absolute expiry has passed.
//!
//! Expired sessions are already rejected at refresh time; this job only keeps
//! rows for refresh tokens that are never presented again from piling up.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use taskboard_db::Store;
use tokio_util::sync::CancellationToken;

/// Run the cleanup loop until `cancel` is triggered.
///
/// The first purge happens immediately, then once per `every`.
pub async fn run(store: Arc<dyn Store>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Session cleanup job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match store.delete_expired_sessions(Utc::now()).await {
                    Ok(0) => tracing::debug!("Session cleanup: nothing to purge"),
                    Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged expired sessions"),
                    Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use taskboard_db::models::session::CreateSession;
    use taskboard_db::models::user::CreateUser;
    use taskboard_db::MemoryStore;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_purges_expired_and_stops_on_cancel() {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(&CreateUser {
                email: "c@d.e".into(),
                password_hash: "x".into(),
            })
            .await
            .unwrap();
        for (token, offset) in [("old", -1), ("live", 1)] {
            store
                .create_session(&CreateSession {
                    user_id: user.id,
                    refresh_token: token.into(),
                    expires_at: Utc::now() + ChronoDuration::days(offset),
                })
                .await
                .unwrap();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            store.clone(),
            Duration::from_secs(60),
            cancel.clone(),
        ));

        // Let the immediate first tick run.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let left = store.sessions_for_user(user.id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].refresh_token, "live");

        cancel.cancel();
        handle.await.unwrap();
    }
}
