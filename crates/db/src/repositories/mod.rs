//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Operations that must keep several
//! rows consistent open their own transaction.

pub mod auth_token_repo;
pub mod feedback_repo;
pub mod profile_repo;
pub mod review_repo;
pub mod session_repo;
pub mod user_repo;
pub mod video_repo;
pub mod wallet_repo;

pub use auth_token_repo::AuthTokenRepo;
pub use feedback_repo::FeedbackRepo;
pub use profile_repo::ProfileRepo;
pub use review_repo::ReviewRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use video_repo::VideoRepo;
pub use wallet_repo::WalletRepo;
