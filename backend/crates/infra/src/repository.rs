//! # リポジトリ実装
//!
//! 通知の認可と受信者解決に必要な行を読み取るリポジトリ。
//!
//! - **読み取り専用**: このサービスは認可に関わる行を書き換えない
//! - **見つからない行は `None`**: 例外ではなく拒否理由として扱うのは認可エンジン側
//! - **テスタビリティ**: トレイト経由でモック可能

pub mod comment_repository;
pub mod page_repository;
pub mod participation_repository;
pub mod profile_repository;
pub mod proposition_repository;
pub mod subscription_repository;

pub use comment_repository::{CommentRepository, PostgresCommentRepository};
pub use page_repository::{PageRepository, PostgresPageRepository};
pub use participation_repository::{ParticipationRepository, PostgresParticipationRepository};
pub use profile_repository::{PostgresProfileRepository, ProfileRepository};
pub use proposition_repository::{PostgresPropositionRepository, PropositionRepository};
pub use subscription_repository::{PostgresSubscriptionRepository, SubscriptionRepository};
