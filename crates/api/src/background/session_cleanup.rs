//! Periodic sweep of expired sessions.
//!
//! Validation already deletes an expired session when it is presented; this
//! job removes the ones nobody presents again, along with spent or expired
//! email tokens.

use std::time::Duration;

use chrono::Utc;
use fitback_db::repositories::AuthTokenRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::auth::session;

/// Run the expired-session sweep every `interval` until `cancel` fires.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Session cleanup job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = ticker.tick() => {
                match session::cleanup_expired(&pool).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Session cleanup: purged expired sessions");
                        } else {
                            tracing::debug!("Session cleanup: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session cleanup failed");
                    }
                }
                match AuthTokenRepo::cleanup(&pool, Utc::now()).await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::debug!(deleted, "Purged spent email tokens"),
                    Err(e) => tracing::error!(error = %e, "Email token cleanup failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use fitback_db::models::user::CreateUser;
    use fitback_db::repositories::{SessionRepo, UserRepo};

    use super::*;

    #[sqlx::test(migrations = "../../db/migrations")]
    async fn sweep_runs_on_start_and_stops_on_cancel(pool: PgPool) {
        let user = UserRepo::create(
            &pool,
            &CreateUser {
                email: "old@example.com".into(),
                password_hash: "x".into(),
                name: "Old".into(),
                is_admin: false,
            },
        )
        .await
        .unwrap();
        session::create_at(&pool, user.id, Utc::now() - ChronoDuration::days(45))
            .await
            .unwrap();
        let live = session::create(&pool, user.id).await.unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(pool.clone(), Duration::from_secs(3600), cancel.clone()));

        // The first tick fires immediately.
        for _ in 0..50 {
            if SessionRepo::count_for_user(&pool, user.id).await.unwrap() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(SessionRepo::count_for_user(&pool, user.id).await.unwrap(), 1);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("job stops after cancel")
            .unwrap();

        assert!(matches!(
            session::validate(&pool, &live.token).await.unwrap(),
            session::SessionCheck::Valid(_)
        ));
    }
}
