//! # Gossamer Cryptography
//!
//! Signing policy and signature production for Gossamer transactions:
//! - `Endorsement` - recursive n-of-m key policy an account or file requires
//! - `Signatory` - anything that can sign a transaction: one key, a list of
//!   signatories, or an external (possibly hardware) signer
//! - `Invoice` - the signable transaction body plus the signatures gathered
//! - `KeyPair` - Ed25519 signing keys
//!
//! ## Supported key types
//!
//! | Type | Validation | Signing |
//! |------|------------|---------|
//! | Ed25519 | curve point decode | native |
//! | RSA-3072 | non-empty | external callback |
//! | ECDSA-384 | non-empty | external callback |

pub mod endorsement;
pub mod error;
pub mod invoice;
pub mod keys;
pub mod signatory;

pub use endorsement::*;
pub use error::*;
pub use invoice::*;
pub use keys::*;
pub use signatory::*;

/// Cryptographic prelude
pub mod prelude {
    pub use crate::endorsement::{Endorsement, EndorsementKind};
    pub use crate::error::{CryptoError, Result};
    pub use crate::invoice::{Invoice, SignaturePair, SignatureSet};
    pub use crate::keys::{KeyPair, KeyType};
    pub use crate::signatory::{Signatory, SigningCallback};
}
