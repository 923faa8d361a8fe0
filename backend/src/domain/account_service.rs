//! Account registration, login, and profile lookup.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountCommand, AccountQuery, AddressRepository, CityRepository, LoginRequest, LoginResponse,
    RegisterRequest, TokenService, UnitOfWork, UserRepository, in_transaction,
};
use crate::domain::{
    Address, AddressId, AddressInput, Error, NewUser, PasswordDigest, ResolvedAddress, Role,
    UserId, UserProfile,
};

const INVALID_CREDENTIALS: &str = "incorrect email or password";

/// Account service implementing [`AccountCommand`] and [`AccountQuery`].
pub struct AccountService<U, A, C, T, W> {
    users: Arc<U>,
    addresses: Arc<A>,
    cities: Arc<C>,
    tokens: Arc<T>,
    uow: Arc<W>,
}

impl<U, A, C, T, W> AccountService<U, A, C, T, W> {
    /// Create a service over the given ports.
    pub fn new(
        users: Arc<U>,
        addresses: Arc<A>,
        cities: Arc<C>,
        tokens: Arc<T>,
        uow: Arc<W>,
    ) -> Self {
        Self {
            users,
            addresses,
            cities,
            tokens,
            uow,
        }
    }
}

impl<U, A, C, T, W> AccountService<U, A, C, T, W>
where
    U: UserRepository,
    A: AddressRepository,
    C: CityRepository,
    T: TokenService,
    W: UnitOfWork,
{
    async fn create_address(&self, input: AddressInput) -> Result<ResolvedAddress, Error> {
        let city = self
            .cities
            .find_by_id(&input.city_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("city {} does not exist", input.city_id)))?;
        let address = Address {
            id: AddressId::random(),
            city_id: city.id,
            street: input.street,
        };
        self.addresses.create(&address).await?;
        Ok(ResolvedAddress { address, city })
    }

    async fn resolve_address(
        &self,
        address_id: Option<AddressId>,
    ) -> Result<Option<ResolvedAddress>, Error> {
        let Some(address_id) = address_id else {
            return Ok(None);
        };
        let address = self
            .addresses
            .find_by_id(&address_id)
            .await?
            .ok_or_else(|| Error::internal(format!("address {address_id} is missing")))?;
        let city = self
            .cities
            .find_by_id(&address.city_id)
            .await?
            .ok_or_else(|| Error::internal(format!("city {} is missing", address.city_id)))?;
        Ok(Some(ResolvedAddress { address, city }))
    }
}

#[async_trait]
impl<U, A, C, T, W> AccountCommand for AccountService<U, A, C, T, W>
where
    U: UserRepository,
    A: AddressRepository,
    C: CityRepository,
    T: TokenService,
    W: UnitOfWork,
{
    async fn register(&self, request: RegisterRequest) -> Result<UserProfile, Error> {
        let RegisterRequest {
            username,
            email,
            password,
            age,
            address,
        } = request;
        let password_digest = PasswordDigest::derive(email.as_ref(), &password);

        let profile = in_transaction(self.uow.as_ref(), || async move {
            if self.users.find_by_email(&email).await?.is_some() {
                return Err(Error::conflict(format!(
                    "email {email} is already registered"
                )));
            }
            let resolved = match address {
                Some(input) => Some(self.create_address(input).await?),
                None => None,
            };
            let user = self
                .users
                .create(&NewUser {
                    id: UserId::random(),
                    username,
                    email,
                    password_digest,
                    age,
                    address_id: resolved.as_ref().map(|r| r.address.id),
                    role: Role::Normal,
                })
                .await?;
            Ok(UserProfile::from_user(user, resolved))
        })
        .await?;

        info!(user_id = %profile.id, "registered account");
        Ok(profile)
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, Error> {
        let Some(user) = self.users.find_by_email(&request.email).await? else {
            warn!("login attempt for unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !user
            .password_digest
            .verify(request.email.as_ref(), &request.password)
        {
            warn!(user_id = %user.id, "login attempt with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let token = self.tokens.issue(&user.id)?;
        let address = self.resolve_address(user.address_id).await?;
        info!(user_id = %user.id, "issued access token");
        Ok(LoginResponse {
            token,
            profile: UserProfile::from_user(user, address),
        })
    }
}

#[async_trait]
impl<U, A, C, T, W> AccountQuery for AccountService<U, A, C, T, W>
where
    U: UserRepository,
    A: AddressRepository,
    C: CityRepository,
    T: TokenService,
    W: UnitOfWork,
{
    async fn get_user(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} does not exist")))?;
        let address = self.resolve_address(user.address_id).await?;
        Ok(UserProfile::from_user(user, address))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
