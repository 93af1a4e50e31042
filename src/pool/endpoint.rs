//! Endpoint abstraction.
//!
//! # Responsibilities
//! - Represent a single RPC server address
//! - Own the client used to reach it
//! - Provide address-based identity

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::blockchain::{ClientFactory, RpcClient, RpcResult};

/// A single RPC endpoint. Immutable once constructed.
#[derive(Clone)]
pub struct Endpoint {
    address: String,
    client: Arc<dyn RpcClient>,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, client: Arc<dyn RpcClient>) -> Self {
        Self {
            address: address.into(),
            client,
        }
    }

    /// Build an endpoint by connecting through a factory.
    pub fn connect(address: &str, factory: &dyn ClientFactory) -> RpcResult<Self> {
        let client = factory.connect(address)?;
        Ok(Self::new(address, client))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn client(&self) -> &Arc<dyn RpcClient> {
        &self.client
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("address", &self.address)
            .finish()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
