pub mod model;
pub mod repo;

pub use model::{is_valid_email, NewUser};
pub use repo::{PgUserStore, StoreError, UserStore};
