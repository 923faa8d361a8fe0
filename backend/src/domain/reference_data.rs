//! Startup bootstrap of reference cities and built-in accounts.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{CityRepository, UnitOfWork, UserRepository, in_transaction};
use crate::domain::{
    Email, Error, NewUser, Password, PasswordDigest, REFERENCE_CITY_NAMES, Role, UserId, Username,
};

const GUEST_USERNAME: &str = "訪客";
const GUEST_EMAIL: &str = "temp@temp.com";
const GUEST_PASSWORD: &str = "temp@temp";

/// Account that must exist after bootstrap.
#[derive(Debug, Clone)]
pub struct AccountSeed {
    pub username: String,
    pub email: String,
    pub password: Password,
    pub role: Role,
}

impl AccountSeed {
    /// Shared guest login.
    pub fn guest() -> Self {
        Self {
            username: GUEST_USERNAME.to_owned(),
            email: GUEST_EMAIL.to_owned(),
            password: Password::new(GUEST_PASSWORD),
            role: Role::Normal,
        }
    }

    /// Operator account; the username is the local part of the email.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::{AccountSeed, Password, Role};
    ///
    /// let seed = AccountSeed::admin("root@example.com", Password::new("secret"));
    /// assert_eq!(seed.username, "root");
    /// assert_eq!(seed.role, Role::Admin);
    /// ```
    pub fn admin(email: impl Into<String>, password: Password) -> Self {
        let email = email.into();
        let username = email
            .split_once('@')
            .map_or(email.as_str(), |(local, _)| local)
            .to_owned();
        Self {
            username,
            email,
            password,
            role: Role::Admin,
        }
    }
}

/// What a bootstrap run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub cities_added: usize,
    pub accounts_created: usize,
}

/// Inserts missing reference data in one unit of work.
pub struct ReferenceDataSeeder<C, U, W> {
    cities: Arc<C>,
    users: Arc<U>,
    uow: Arc<W>,
}

impl<C, U, W> ReferenceDataSeeder<C, U, W>
where
    C: CityRepository,
    U: UserRepository,
    W: UnitOfWork,
{
    /// Create a seeder over the given ports.
    pub fn new(cities: Arc<C>, users: Arc<U>, uow: Arc<W>) -> Self {
        Self { cities, users, uow }
    }

    /// Insert the built-in cities and any of `accounts` that are missing.
    ///
    /// Existing rows are left untouched, so repeated runs are harmless.
    pub async fn seed(&self, accounts: &[AccountSeed]) -> Result<SeedSummary, Error> {
        let city_names: Vec<String> = REFERENCE_CITY_NAMES
            .iter()
            .map(|name| (*name).to_owned())
            .collect();

        let summary = in_transaction(self.uow.as_ref(), || async move {
            let cities_added = self.cities.insert_missing(&city_names).await?;
            let mut accounts_created = 0;
            for seed in accounts {
                if self.ensure_account(seed).await? {
                    accounts_created += 1;
                }
            }
            Ok(SeedSummary {
                cities_added,
                accounts_created,
            })
        })
        .await?;

        info!(
            cities_added = summary.cities_added,
            accounts_created = summary.accounts_created,
            "reference data ready"
        );
        Ok(summary)
    }

    async fn ensure_account(&self, seed: &AccountSeed) -> Result<bool, Error> {
        let email = Email::new(&seed.email).map_err(|err| Error::invalid_request(err.to_string()))?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Ok(false);
        }
        let username =
            Username::new(&seed.username).map_err(|err| Error::invalid_request(err.to_string()))?;
        let password_digest = PasswordDigest::derive(email.as_ref(), &seed.password);
        self.users
            .create(&NewUser {
                id: UserId::random(),
                username,
                email,
                password_digest,
                age: None,
                address_id: None,
                role: seed.role,
            })
            .await?;
        Ok(true)
    }
}
