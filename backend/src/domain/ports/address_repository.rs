//! Port abstraction for postal addresses.
use async_trait::async_trait;

use crate::domain::{Address, AddressId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by address repository adapters.
    pub enum AddressPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable: "address repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError: "address repository query failed: {message}",
        /// The referenced city does not exist.
        UnknownCity { city_id: String } => NotFound: "city {city_id} does not exist",
    }
}

/// Driven port for addresses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Insert an address.
    async fn create(&self, address: &Address) -> Result<(), AddressPersistenceError>;

    /// Fetch an address by identifier.
    async fn find_by_id(&self, id: &AddressId)
    -> Result<Option<Address>, AddressPersistenceError>;
}
