use async_trait::async_trait;

use crate::data::Address;
use crate::error::SignerError;

/// The signing capability attached to a transaction sender.
///
/// Signing is asynchronous so implementations backed by keystores or remote
/// signers can await their own I/O. The pipeline never inspects key material;
/// it only needs the derived address and the signature bytes.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Address the signer signs for
    fn address(&self) -> Address;

    /// Sign the exact serialized unsigned transaction bytes
    async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// Signer producing an empty signature.
///
/// Sufficient for simulated networks, which skip signature verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DummySigner {
    address: Address,
}

impl DummySigner {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

#[async_trait]
impl Signer for DummySigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, _data: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(Vec::new())
    }
}
