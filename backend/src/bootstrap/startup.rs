//! Reference data seeding at startup.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::bootstrap::ServiceSettings;
use crate::domain::{AccountSeed, Error, Password, ReferenceDataSeeder, SeedSummary};
use crate::outbound::persistence::{
    DbContext, DbPool, DieselCityRepository, DieselUnitOfWork, DieselUserRepository,
};

/// Errors returned while seeding reference data.
#[derive(Debug, Error)]
pub enum StartupSeedingError {
    /// Cities or accounts could not be written.
    #[error("reference data seeding failed: {0}")]
    Seeding(#[from] Error),
}

fn account_seeds(settings: &ServiceSettings) -> Vec<AccountSeed> {
    let mut seeds = vec![AccountSeed::guest()];
    match settings.admin_password.as_deref() {
        Some(password) if !password.is_empty() => {
            seeds.push(AccountSeed::admin(
                settings.admin_email(),
                Password::new(password),
            ));
        }
        _ => warn!("admin_password is not set; no admin account will be seeded"),
    }
    seeds
}

/// Insert reference cities and built-in accounts when enabled.
///
/// Runs outside any request, so it installs its own [`DbContext`] around the
/// seeder.
pub async fn seed_reference_data_on_startup(
    settings: &ServiceSettings,
    pool: &DbPool,
) -> Result<Option<SeedSummary>, StartupSeedingError> {
    if !settings.seed_reference_data() {
        info!(reason = "disabled", "reference data seeding skipped");
        return Ok(None);
    }

    let seeder = ReferenceDataSeeder::new(
        Arc::new(DieselCityRepository::new()),
        Arc::new(DieselUserRepository::new()),
        Arc::new(DieselUnitOfWork::new()),
    );
    let seeds = account_seeds(settings);
    let ctx = Arc::new(DbContext::new(pool.clone()));
    let summary = ctx.scope(seeder.seed(&seeds)).await?;
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::outbound::persistence::PoolConfig;
    use rstest::rstest;

    fn settings(admin_password: Option<&str>, seed: bool) -> ServiceSettings {
        ServiceSettings {
            database_url: None,
            host: None,
            port: None,
            jwt_secret: None,
            token_ttl_hours: None,
            pool_max_size: None,
            admin_email: Some("root@example.com".to_owned()),
            admin_password: admin_password.map(str::to_owned),
            seed_reference_data: Some(seed),
        }
    }

    #[rstest]
    fn admin_is_seeded_only_with_a_password() {
        let without = account_seeds(&settings(None, true));
        assert_eq!(without.len(), 1);

        let with = account_seeds(&settings(Some("pw"), true));
        assert_eq!(with.len(), 2);
        assert_eq!(with[1].email, "root@example.com");
        assert_eq!(with[1].role, Role::Admin);
    }

    #[rstest]
    #[tokio::test]
    async fn disabled_seeding_never_touches_the_pool() {
        let pool = DbPool::lazy(
            PoolConfig::new("postgres://localhost:1/unreachable").with_min_idle(None),
        );

        let outcome = seed_reference_data_on_startup(&settings(None, false), &pool)
            .await
            .expect("skipped");
        assert!(outcome.is_none());
    }
}
