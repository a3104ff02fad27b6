pub mod accounts;
pub mod auth;
pub mod db;

pub use accounts::AccountDirectory;
pub use auth::PasswordAuthAdapter;
pub use db::{PgDocumentStore, UnconfiguredStore};
