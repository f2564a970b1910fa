use ipam_model::{Cidr, CidrError};

/// Possible allocation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The CIDR given at construction is malformed
    #[error(transparent)]
    Cidr(#[from] CidrError),
    /// No valid candidate is left inside the block
    #[error("no more IPs available in CIDR [{cidr}]")]
    Exhausted {
        /// Exhausted block
        cidr: Cidr,
    },
    /// Attempt cap of the randomized allocator was hit
    #[error("no unique IP found in CIDR [{cidr}] after {attempts} attempts")]
    AttemptsExhausted {
        /// Block being allocated from
        cidr: Cidr,
        /// Attempts made for the failing address
        attempts: u32,
    },
}

/// Result alias for allocation operations
pub type Result<T> = std::result::Result<T, Error>;
