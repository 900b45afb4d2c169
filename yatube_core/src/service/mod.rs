pub mod comments;
pub mod feeds;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod users;
