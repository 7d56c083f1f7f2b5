pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod validate;

pub use handlers::router;
