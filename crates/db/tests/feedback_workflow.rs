//! Integration tests for the feedback review workflow, wallet and spin.
//!
//! Exercises the transactional repository operations against a real
//! database:
//! - Feedback creation provisions the profile row
//! - Video attachment advances status atomically
//! - Approve credits cashback exactly once; reject writes no ledger entry
//! - Contradicting a terminal decision is refused
//! - Spins never overdraw

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use fitback_core::feedback::{FeedbackStatus, KeptStatus, ReviewAction, DEFAULT_CASHBACK_AMOUNT};
use fitback_core::wallet::LedgerKind;
use fitback_db::models::feedback::{CreateFeedback, Feedback, UpdateFeedback};
use fitback_db::models::review::ReviewOutcome;
use fitback_db::models::user::{CreateUser, User};
use fitback_db::models::video::{CreateVideo, VideoAttachOutcome};
use fitback_db::models::wallet::SpinOutcome;
use fitback_db::repositories::{
    FeedbackRepo, ProfileRepo, ReviewRepo, UserRepo, VideoRepo, WalletRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, email: &str, is_admin: bool) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            name: email.split('@').next().unwrap_or("user").to_string(),
            is_admin,
        },
    )
    .await
    .unwrap()
}

async fn create_feedback(pool: &PgPool, user_id: i64) -> Feedback {
    FeedbackRepo::create(
        pool,
        &CreateFeedback {
            user_id,
            product_url: "https://x.com/p1".to_string(),
            brand: "Nike".to_string(),
            size: "M".to_string(),
            fit_score: 3,
            kept_status: KeptStatus::Kept,
            cashback_amount: DEFAULT_CASHBACK_AMOUNT,
        },
    )
    .await
    .unwrap()
}

fn mp4(feedback_id: i64) -> CreateVideo {
    CreateVideo {
        feedback_id,
        storage_path: format!("videos/{feedback_id}/original.mp4"),
        format: "mp4".to_string(),
        video_type: "original".to_string(),
    }
}

async fn cashback_count(pool: &PgPool, feedback_id: i64) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM wallet_transactions WHERE feedback_id = $1 AND kind = 'cashback'",
    )
    .bind(feedback_id)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

async fn seed_balance(pool: &PgPool, user_id: i64, amount: i64) {
    WalletRepo::record(pool, user_id, None, LedgerKind::SpinReward, amount)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Creation and owner edits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_feedback_provisions_profile(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    assert!(ProfileRepo::find_by_user(&pool, alice.id).await.unwrap().is_none());

    let fb = create_feedback(&pool, alice.id).await;
    assert_eq!(fb.status, "pending");
    assert_eq!(fb.cashback_amount, 50);
    assert!(fb.is_final);
    assert!(ProfileRepo::find_by_user(&pool, alice.id).await.unwrap().is_some());

    // A second submission does not trip the profile's unique key.
    create_feedback(&pool, alice.id).await;
    assert_eq!(FeedbackRepo::list_for_user(&pool, alice.id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_parallel_creates_provision_one_profile(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;

    let results = futures::future::join_all((0..8).map(|_| create_feedback(&pool, alice.id))).await;
    assert_eq!(results.len(), 8);

    let profiles: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_profiles WHERE user_id = $1")
        .bind(alice.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(profiles.0, 1);
    assert_eq!(FeedbackRepo::list_for_user(&pool, alice.id).await.unwrap().len(), 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fit_score_check_constraint(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let err = sqlx::query(
        "INSERT INTO feedbacks (user_id, product_url, brand, size, fit_score, kept_status)
         VALUES ($1, 'https://x.com/p', 'Nike', 'M', 9, 'kept')",
    )
    .bind(alice.id)
    .execute(&pool)
    .await
    .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("ck_feedbacks_fit_score")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_edit_guarded_by_window_and_owner(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let bob = create_user(&pool, "bob@example.com", false).await;
    let fb = create_feedback(&pool, alice.id).await;
    let cutoff = Utc::now() - Duration::hours(24);
    let edit = UpdateFeedback {
        size: Some("L".to_string()),
        ..Default::default()
    };

    let updated = FeedbackRepo::update_by_owner(&pool, fb.id, alice.id, cutoff, &edit)
        .await
        .unwrap()
        .expect("owner edit inside window");
    assert_eq!(updated.size, "L");
    assert_eq!(updated.brand, "Nike");

    assert!(FeedbackRepo::update_by_owner(&pool, fb.id, bob.id, cutoff, &edit)
        .await
        .unwrap()
        .is_none());

    sqlx::query("UPDATE feedbacks SET created_at = NOW() - INTERVAL '25 hours' WHERE id = $1")
        .bind(fb.id)
        .execute(&pool)
        .await
        .unwrap();
    assert!(FeedbackRepo::update_by_owner(&pool, fb.id, alice.id, cutoff, &edit)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Videos
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attach_video_advances_status(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let fb = create_feedback(&pool, alice.id).await;

    let outcome = VideoRepo::attach(&pool, &mp4(fb.id)).await.unwrap();
    let VideoAttachOutcome::Attached { video, feedback } = outcome else {
        panic!("expected attachment");
    };
    assert_eq!(video.feedback_id, fb.id);
    assert_eq!(feedback.status, "under_review");

    // Further videos keep it in review.
    assert_matches!(
        VideoRepo::attach(&pool, &mp4(fb.id)).await.unwrap(),
        VideoAttachOutcome::Attached { .. }
    );
    assert_eq!(VideoRepo::list_for_feedback(&pool, fb.id).await.unwrap().len(), 2);

    assert_matches!(
        VideoRepo::attach(&pool, &mp4(999_999)).await.unwrap(),
        VideoAttachOutcome::NotFound
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attach_video_refused_after_decision(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let admin = create_user(&pool, "admin@example.com", true).await;
    let fb = create_feedback(&pool, alice.id).await;
    ReviewRepo::decide(&pool, fb.id, admin.id, ReviewAction::Reject, Some("blurry"))
        .await
        .unwrap();

    assert_matches!(
        VideoRepo::attach(&pool, &mp4(fb.id)).await.unwrap(),
        VideoAttachOutcome::Closed(FeedbackStatus::Rejected)
    );
    assert!(VideoRepo::list_for_feedback(&pool, fb.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Review decisions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approve_credits_cashback_once(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let admin = create_user(&pool, "admin@example.com", true).await;
    let fb = create_feedback(&pool, alice.id).await;
    VideoRepo::attach(&pool, &mp4(fb.id)).await.unwrap();

    let first = ReviewRepo::decide(&pool, fb.id, admin.id, ReviewAction::Approve, None)
        .await
        .unwrap();
    assert_matches!(first, ReviewOutcome::Applied(ref f) if f.status == "approved");

    let second = ReviewRepo::decide(&pool, fb.id, admin.id, ReviewAction::Approve, None)
        .await
        .unwrap();
    assert_matches!(second, ReviewOutcome::AlreadyProcessed(_));

    assert_eq!(cashback_count(&pool, fb.id).await, 1);
    assert_eq!(WalletRepo::available_balance(&pool, alice.id).await.unwrap(), 50);
    assert_eq!(ReviewRepo::list_for_feedback(&pool, fb.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_writes_audit_but_no_ledger(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let admin = create_user(&pool, "admin@example.com", true).await;
    let fb = create_feedback(&pool, alice.id).await;

    let outcome = ReviewRepo::decide(&pool, fb.id, admin.id, ReviewAction::Reject, Some("blurry"))
        .await
        .unwrap();
    assert_matches!(outcome, ReviewOutcome::Applied(ref f) if f.status == "rejected");

    assert_eq!(cashback_count(&pool, fb.id).await, 0);
    assert_eq!(WalletRepo::available_balance(&pool, alice.id).await.unwrap(), 0);

    let reviews = ReviewRepo::list_for_feedback(&pool, fb.id).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].decision, "rejected");
    assert_eq!(reviews[0].notes.as_deref(), Some("blurry"));
    assert_eq!(reviews[0].reviewer_id, admin.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_contradicting_decisions_conflict(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let admin = create_user(&pool, "admin@example.com", true).await;

    let rejected = create_feedback(&pool, alice.id).await;
    ReviewRepo::decide(&pool, rejected.id, admin.id, ReviewAction::Reject, Some("no"))
        .await
        .unwrap();
    assert_matches!(
        ReviewRepo::decide(&pool, rejected.id, admin.id, ReviewAction::Approve, None)
            .await
            .unwrap(),
        ReviewOutcome::Conflict(FeedbackStatus::Rejected)
    );
    assert_eq!(cashback_count(&pool, rejected.id).await, 0);

    let approved = create_feedback(&pool, alice.id).await;
    ReviewRepo::decide(&pool, approved.id, admin.id, ReviewAction::Approve, None)
        .await
        .unwrap();
    assert_matches!(
        ReviewRepo::decide(&pool, approved.id, admin.id, ReviewAction::Reject, Some("oops"))
            .await
            .unwrap(),
        ReviewOutcome::Conflict(FeedbackStatus::Approved)
    );

    assert_matches!(
        ReviewRepo::decide(&pool, 424_242, admin.id, ReviewAction::Approve, None)
            .await
            .unwrap(),
        ReviewOutcome::NotFound
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_approvals_credit_once(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let admin = create_user(&pool, "admin@example.com", true).await;
    let fb = create_feedback(&pool, alice.id).await;

    let (a, b) = tokio::join!(
        ReviewRepo::decide(&pool, fb.id, admin.id, ReviewAction::Approve, None),
        ReviewRepo::decide(&pool, fb.id, admin.id, ReviewAction::Approve, None),
    );
    let outcomes = [a.unwrap(), b.unwrap()];
    let applied = outcomes
        .iter()
        .filter(|o| matches!(o, ReviewOutcome::Applied(_)))
        .count();
    assert_eq!(applied, 1);
    assert_eq!(cashback_count(&pool, fb.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cashback_unique_index(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let fb = create_feedback(&pool, alice.id).await;
    WalletRepo::record(&pool, alice.id, Some(fb.id), LedgerKind::Cashback, 50)
        .await
        .unwrap();

    let err = WalletRepo::record(&pool, alice.id, Some(fb.id), LedgerKind::Cashback, 50)
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_wallet_transactions_cashback_feedback")
    );
}

// ---------------------------------------------------------------------------
// Wallet and spin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pending_cashback_tracks_open_feedback(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let admin = create_user(&pool, "admin@example.com", true).await;
    let a = create_feedback(&pool, alice.id).await;
    let b = create_feedback(&pool, alice.id).await;
    create_feedback(&pool, alice.id).await;

    assert_eq!(FeedbackRepo::pending_cashback(&pool, alice.id).await.unwrap(), 150);

    ReviewRepo::decide(&pool, a.id, admin.id, ReviewAction::Approve, None)
        .await
        .unwrap();
    ReviewRepo::decide(&pool, b.id, admin.id, ReviewAction::Reject, Some("no"))
        .await
        .unwrap();

    assert_eq!(FeedbackRepo::pending_cashback(&pool, alice.id).await.unwrap(), 50);
    assert_eq!(WalletRepo::available_balance(&pool, alice.id).await.unwrap(), 50);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_spin_debits_cost_and_credits_reward(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    seed_balance(&pool, alice.id, 100).await;

    let outcome = WalletRepo::spin(&pool, alice.id, |_| 25).await.unwrap();
    let SpinOutcome::Spun { tier, reward, balance_after } = outcome else {
        panic!("expected a spin");
    };
    assert_eq!(tier.cost, 50);
    assert_eq!(reward, 25);
    assert_eq!(balance_after, 75);
    assert_eq!(WalletRepo::available_balance(&pool, alice.id).await.unwrap(), 75);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_zero_reward_spin_writes_only_debit(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    seed_balance(&pool, alice.id, 50).await;

    WalletRepo::spin(&pool, alice.id, |_| 0).await.unwrap();

    let kinds: Vec<String> = WalletRepo::list_for_user(&pool, alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(kinds.iter().filter(|k| *k == "spin_cost").count(), 1);
    assert_eq!(kinds.iter().filter(|k| *k == "spin_reward").count(), 1); // the seed
    assert_eq!(WalletRepo::available_balance(&pool, alice.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_spin_refused_when_balance_too_low(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    seed_balance(&pool, alice.id, 49).await;

    assert_matches!(
        WalletRepo::spin(&pool, alice.id, |_| 100).await.unwrap(),
        SpinOutcome::InsufficientBalance { balance: 49, cost: 50 }
    );
    assert_eq!(WalletRepo::available_balance(&pool, alice.id).await.unwrap(), 49);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_spins_never_overdraw(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    seed_balance(&pool, alice.id, 50).await;

    let (a, b) = tokio::join!(
        WalletRepo::spin(&pool, alice.id, |_| 0),
        WalletRepo::spin(&pool, alice.id, |_| 0),
    );
    let spun = [a.unwrap(), b.unwrap()]
        .iter()
        .filter(|o| matches!(o, SpinOutcome::Spun { .. }))
        .count();
    assert_eq!(spun, 1);
    assert_eq!(WalletRepo::available_balance(&pool, alice.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_queue_filters_by_status(pool: PgPool) {
    let alice = create_user(&pool, "alice@example.com", false).await;
    let admin = create_user(&pool, "admin@example.com", true).await;
    let a = create_feedback(&pool, alice.id).await;
    let b = create_feedback(&pool, alice.id).await;
    VideoRepo::attach(&pool, &mp4(a.id)).await.unwrap();
    ReviewRepo::decide(&pool, b.id, admin.id, ReviewAction::Approve, None)
        .await
        .unwrap();

    let all = FeedbackRepo::list_queue(&pool, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let in_review = FeedbackRepo::list_queue(&pool, Some(FeedbackStatus::UnderReview))
        .await
        .unwrap();
    assert_eq!(in_review.len(), 1);
    assert_eq!(in_review[0].feedback.id, a.id);
    assert_eq!(in_review[0].video_count, 1);
    assert_eq!(in_review[0].user_email, "alice@example.com");
}
