//! Assembles a complete, consistent snapshot of a GitHub pull request:
//! metadata, every changed file, and each file's content before and after
//! the change, ready to hand to a review backend.

pub mod config;
pub mod github;
pub mod report;
pub mod snapshot;
pub mod token;

pub use github::{ClientOptions, GitHubClient, GitHubError, PullRequestScope};
pub use snapshot::Snapshot;
pub use token::TokenStore;
