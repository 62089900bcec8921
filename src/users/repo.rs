use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::model::{normalize_email, NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with email {0} already exists")]
    DuplicateKey(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Credential store. Owns every `User` record.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; fails with `DuplicateKey` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        // Uniqueness is enforced by the unique index on users.email.
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.username())
        .bind(user.email())
        .bind(user.password_hash())
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateKey(user.email().to_string())
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}


#[cfg(test)]
mod tests {
    use std::{borrow::Cow, error::Error as StdError, fmt};

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::memory::MemoryUserStore;
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser::new(username, email, "hash".into()).expect("valid")
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = MemoryUserStore::default();
        let created = store.create(new_user("alice", "a@x.com")).await.expect("create");
        let found = store
            .find_by_email("A@X.com ")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.id, created.id);
        assert_eq!(found.username, "alice");
        let by_id = store.find_by_id(created.id).await.expect("lookup");
        assert_eq!(by_id.map(|u| u.email), Some("a@x.com".to_string()));
        assert!(store.find_by_email("b@x.com").await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_regardless_of_username() {
        let store = MemoryUserStore::default();
        store.create(new_user("alice", "a@x.com")).await.expect("create");
        let err = store.create(new_user("bob", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref e) if e == "a@x.com"));
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn db_error(code: Option<&'static str>) -> sqlx::Error {
        sqlx::Error::Database(Box::new(TestDbError { code }))
    }

    #[test]
    fn unique_violation_matches_sqlstate_23505() {
        assert!(is_unique_violation(&db_error(Some("23505"))));
        assert!(!is_unique_violation(&db_error(Some("23503"))));
        assert!(!is_unique_violation(&db_error(None)));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }
}
