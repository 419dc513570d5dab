//! Startup seeding.
//!
//! Populates an empty database with an administrator account and a starter
//! catalogue so a fresh deployment is usable immediately. Both steps are
//! idempotent: existing data short-circuits them.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    CatalogRepository, CatalogRepositoryError, PasswordHasher, PasswordHasherError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Book, BookDraft, BookValidationError, DEFAULT_TOTAL_COPIES, User, UserDraft, UserId,
    UserValidationError,
};

/// Administrator account created on first start.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

/// Errors raised while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed user repository error: {0}")]
    UserRepository(#[from] UserRepositoryError),
    #[error("seed catalogue repository error: {0}")]
    CatalogRepository(#[from] CatalogRepositoryError),
    #[error("seed password hashing error: {0}")]
    PasswordHasher(#[from] PasswordHasherError),
    #[error("seed admin account invalid: {0}")]
    InvalidAdmin(#[from] UserValidationError),
    #[error("seed book invalid: {0}")]
    InvalidBook(#[from] BookValidationError),
}

fn starter_books() -> Result<Vec<Book>, BookValidationError> {
    let titles: [(&str, &str, i32, &str); 5] = [
        (
            "Don Quijote de la Mancha",
            "Miguel de Cervantes",
            1605,
            "Novela",
        ),
        ("Cien años de soledad", "Gabriel García Márquez", 1967, "Novela"),
        ("La casa de los espíritus", "Isabel Allende", 1982, "Novela"),
        ("Ficciones", "Jorge Luis Borges", 1944, "Cuento"),
        ("Veinte poemas de amor", "Pablo Neruda", 1924, "Poesía"),
    ];

    titles
        .into_iter()
        .map(|(title, author, year, category)| {
            Book::new(BookDraft {
                id: Uuid::new_v4(),
                title: title.to_owned(),
                author: author.to_owned(),
                published_year: Some(year),
                description: None,
                category: Some(category.to_owned()),
                cover_url: None,
                created_at: Utc::now(),
            })
        })
        .collect()
}

/// Create the admin account unless its email is already registered.
pub async fn seed_admin<U, H>(
    user_repo: &Arc<U>,
    hasher: &Arc<H>,
    admin: &AdminSeed,
) -> Result<(), SeedError>
where
    U: UserRepository,
    H: PasswordHasher,
{
    let email = admin.email.trim().to_lowercase();
    if user_repo.find_by_email(&email).await?.is_some() {
        tracing::debug!(email = %email, "admin account already present; skipping seed");
        return Ok(());
    }

    let user = User::new(UserDraft {
        id: UserId::random(),
        display_name: admin.display_name.clone(),
        email,
        is_admin: true,
        birth_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
        created_at: Utc::now(),
    })?;
    let password_hash = hasher.hash(&admin.password)?;

    match user_repo.insert(&user, &password_hash).await {
        Ok(()) => {
            tracing::info!(user_id = %user.id(), "seeded admin account");
            Ok(())
        }
        // Lost a race with a concurrent replica; the account exists either way.
        Err(UserRepositoryError::DuplicateEmail) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Insert the starter catalogue when no books exist yet.
pub async fn seed_catalog<C>(catalog_repo: &Arc<C>) -> Result<(), SeedError>
where
    C: CatalogRepository,
{
    if catalog_repo.count().await? > 0 {
        tracing::debug!("catalogue already populated; skipping seed");
        return Ok(());
    }

    let books = starter_books()?;
    let seeded = books.len();
    for book in &books {
        catalog_repo
            .insert_with_inventory(book, DEFAULT_TOTAL_COPIES)
            .await?;
    }
    tracing::info!(seeded, "seeded starter catalogue");
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use crate::domain::ports::{
        FixturePasswordHasher, MockCatalogRepository, MockUserRepository, StoredUser,
    };

    use super::*;

    fn admin_seed() -> AdminSeed {
        AdminSeed {
            display_name: "Librarian".to_owned(),
            email: "Admin@Example.org".to_owned(),
            password: "letmein".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn admin_is_created_when_absent() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_insert()
            .withf(|user, hash| {
                user.is_admin()
                    && user.email().as_ref() == "admin@example.org"
                    && hash == "plain:letmein"
            })
            .returning(|_, _| Ok(()));

        seed_admin(&Arc::new(users), &Arc::new(FixturePasswordHasher), &admin_seed())
            .await
            .expect("seed succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn existing_admin_short_circuits() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| {
            let user = User::new(UserDraft {
                id: UserId::random(),
                display_name: "Librarian".to_owned(),
                email: "admin@example.org".to_owned(),
                is_admin: true,
                birth_date: NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date"),
                created_at: Utc::now(),
            })
            .expect("fixture user is valid");
            Ok(Some(StoredUser {
                user,
                password_hash: "plain:letmein".to_owned(),
            }))
        });
        // No insert expectation: an existing account must not be touched.

        seed_admin(&Arc::new(users), &Arc::new(FixturePasswordHasher), &admin_seed())
            .await
            .expect("seed succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn losing_the_seed_race_is_not_an_error() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_insert()
            .returning(|_, _| Err(UserRepositoryError::DuplicateEmail));

        seed_admin(&Arc::new(users), &Arc::new(FixturePasswordHasher), &admin_seed())
            .await
            .expect("duplicate insert is tolerated");
    }

    #[rstest]
    #[tokio::test]
    async fn catalogue_seed_inserts_starter_books_once() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_count().returning(|| Ok(0));
        catalog
            .expect_insert_with_inventory()
            .times(5)
            .withf(|_, initial| *initial == DEFAULT_TOTAL_COPIES)
            .returning(|_, _| Ok(()));

        seed_catalog(&Arc::new(catalog)).await.expect("seed succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn populated_catalogue_short_circuits() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_count().returning(|| Ok(12));
        // No insert expectation: existing data must not be touched.

        seed_catalog(&Arc::new(catalog)).await.expect("seed succeeds");
    }
}
