pub mod manager;
pub mod models;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{NewUser, User, UserProfile};
pub use users::{PgUserStore, StoreError, UniqueField, UpdatableField, UserStore};
