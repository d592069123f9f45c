//! Signatory - produces the signatures a transaction needs
//!
//! A signatory is one of:
//! - a single Ed25519 keypair held in memory
//! - a list of signatories that all sign, in order
//! - an external signer reached through a `SigningCallback`, which may
//!   suspend for as long as it needs (a hardware wallet waiting for a button
//!   press, a remote co-signer, ...)
//!
//! Signatories are cheap to clone and share their inner state, so the same
//! signatory configured on a context and passed again at the call site is
//! recognised as the same object and signs only once.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use gossamer_core::TxId;

use crate::error::{CryptoError, Result};
use crate::invoice::{Invoice, SignaturePair, SignatureSet};
use crate::keys::{KeyPair, KeyType};

/// External signing capability
///
/// Implementations receive the invoice and return the signatures they
/// produced over its body bytes. Returning an error aborts the whole
/// signing operation.
#[async_trait]
pub trait SigningCallback: Send + Sync {
    /// Sign the invoice
    async fn sign(&self, invoice: &Invoice) -> Result<Vec<SignaturePair>>;
}

type SignFn = dyn Fn(Invoice) -> BoxFuture<'static, Result<Vec<SignaturePair>>> + Send + Sync;

struct FnCallback {
    sign: Box<SignFn>,
}

#[async_trait]
impl SigningCallback for FnCallback {
    async fn sign(&self, invoice: &Invoice) -> Result<Vec<SignaturePair>> {
        (self.sign)(invoice.clone()).await
    }
}

enum SignatoryKind {
    Ed25519(KeyPair),
    List(Vec<Signatory>),
    Callback(Arc<dyn SigningCallback>),
}

/// Shared handle to a signing capability
#[derive(Clone)]
pub struct Signatory {
    inner: Arc<SignatoryKind>,
}

impl Signatory {
    /// Signatory backed by an in-memory Ed25519 keypair
    pub fn ed25519(keypair: KeyPair) -> Self {
        Self {
            inner: Arc::new(SignatoryKind::Ed25519(keypair)),
        }
    }

    /// Import an Ed25519 private key (raw seed or PKCS#8)
    pub fn from_private_key(bytes: &[u8]) -> Result<Self> {
        Ok(Self::ed25519(KeyPair::from_private_key(bytes)?))
    }

    /// Signatory backed by an external signer
    pub fn from_callback(callback: Arc<dyn SigningCallback>) -> Self {
        Self {
            inner: Arc::new(SignatoryKind::Callback(callback)),
        }
    }

    /// Signatory backed by an async closure
    ///
    /// The closure receives its own copy of the invoice.
    pub fn from_fn<F, Fut>(sign: F) -> Self
    where
        F: Fn(Invoice) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<SignaturePair>>> + Send + 'static,
    {
        let sign: Box<SignFn> = Box::new(
            move |invoice| -> BoxFuture<'static, Result<Vec<SignaturePair>>> {
                Box::pin(sign(invoice))
            },
        );
        Self::from_callback(Arc::new(FnCallback { sign }))
    }

    /// Combine signatories into one list
    ///
    /// Nested lists are flattened and a signatory object that appears more
    /// than once is kept only at its first position. A single survivor is
    /// returned as itself rather than wrapped in a list.
    pub fn compose<I>(signatories: I) -> Result<Self>
    where
        I: IntoIterator<Item = Signatory>,
    {
        let mut flat = Vec::new();
        for signatory in signatories {
            signatory.flatten_into(&mut flat);
        }
        match flat.len() {
            0 => Err(CryptoError::out_of_range(
                "signatories",
                "At least one signatory is required.",
            )),
            1 => Ok(flat.remove(0)),
            _ => Ok(Self {
                inner: Arc::new(SignatoryKind::List(flat)),
            }),
        }
    }

    fn flatten_into(&self, flat: &mut Vec<Signatory>) {
        match self.inner.as_ref() {
            SignatoryKind::List(children) => {
                for child in children {
                    child.flatten_into(flat);
                }
            }
            _ => {
                if !flat.iter().any(|s| s.same_as(self)) {
                    flat.push(self.clone());
                }
            }
        }
    }

    /// Whether both handles refer to the same signatory object
    pub fn same_as(&self, other: &Signatory) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether this is a list of signatories
    pub fn is_list(&self) -> bool {
        matches!(self.inner.as_ref(), SignatoryKind::List(_))
    }

    /// Number of leaf signers (1 for anything but a list)
    pub fn len(&self) -> usize {
        match self.inner.as_ref() {
            SignatoryKind::List(children) => children.len(),
            _ => 1,
        }
    }

    /// Always false; a signatory has at least one signer
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Public keys of the in-memory signers
    ///
    /// External signers are opaque and contribute nothing.
    pub fn public_keys(&self) -> Vec<[u8; 32]> {
        match self.inner.as_ref() {
            SignatoryKind::Ed25519(keypair) => vec![keypair.public_key()],
            SignatoryKind::List(children) => children.iter().flat_map(|c| c.public_keys()).collect(),
            SignatoryKind::Callback(_) => Vec::new(),
        }
    }

    /// Sign an encoded transaction body
    pub async fn sign(&self, tx_id: TxId, body_bytes: Vec<u8>) -> Result<SignatureSet> {
        let mut invoice = Invoice::new(tx_id, body_bytes);
        self.sign_invoice(&mut invoice).await?;
        Ok(invoice.into_parts().1)
    }

    /// Add this signatory's signatures to an invoice
    ///
    /// All-or-nothing: if any signer fails the invoice is left untouched.
    pub async fn sign_invoice(&self, invoice: &mut Invoice) -> Result<()> {
        let mut working = invoice.clone();
        let leaves: Vec<Signatory> = match self.inner.as_ref() {
            SignatoryKind::List(children) => children.clone(),
            _ => vec![self.clone()],
        };
        for leaf in &leaves {
            leaf.sign_leaf(&mut working).await?;
        }
        tracing::trace!(
            tx_id = %invoice.tx_id(),
            signatures = working.signatures().len(),
            "Signed invoice"
        );
        *invoice = working;
        Ok(())
    }

    async fn sign_leaf(&self, invoice: &mut Invoice) -> Result<()> {
        match self.inner.as_ref() {
            SignatoryKind::Ed25519(keypair) => {
                let public_key = keypair.public_key();
                if invoice.signatures().contains_key(&public_key) {
                    return Ok(());
                }
                let signature = keypair.sign(invoice.body_bytes());
                invoice.add_signature(SignaturePair::new(KeyType::Ed25519, public_key, signature));
                Ok(())
            }
            SignatoryKind::Callback(callback) => {
                let pairs = callback
                    .sign(invoice)
                    .await
                    .map_err(|e| match e {
                        CryptoError::SigningFailed(_) => e,
                        other => CryptoError::SigningFailed(other.to_string()),
                    })?;
                for pair in pairs {
                    invoice.add_signature(pair);
                }
                Ok(())
            }
            SignatoryKind::List(_) => Err(CryptoError::SigningFailed(
                "nested signatory lists are flattened on construction".to_string(),
            )),
        }
    }
}

impl From<KeyPair> for Signatory {
    fn from(keypair: KeyPair) -> Self {
        Self::ed25519(keypair)
    }
}

impl fmt::Debug for Signatory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.as_ref() {
            SignatoryKind::Ed25519(keypair) => write!(f, "Signatory({:?})", keypair),
            SignatoryKind::List(children) => f.debug_list().entries(children).finish(),
            SignatoryKind::Callback(_) => write!(f, "Signatory(Callback)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gossamer_core::Address;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tx_id() -> TxId {
        TxId::new(Address::account(2), 1_600_000_000, 0)
    }

    #[tokio::test]
    async fn test_single_signatory() {
        let keypair = KeyPair::generate();
        let signatory = Signatory::ed25519(keypair.clone());

        let signatures = signatory.sign(tx_id(), b"body".to_vec()).await.unwrap();
        assert_eq!(signatures.len(), 1);
        let pair = signatures.get(&keypair.public_key()).unwrap();
        assert_eq!(pair.signature, keypair.sign(b"body").to_vec());
    }

    #[tokio::test]
    async fn test_composite_signs_each_key_once() {
        let a = Signatory::ed25519(KeyPair::generate());
        let b = Signatory::ed25519(KeyPair::generate());
        let c = Signatory::ed25519(KeyPair::generate());

        let context_default = Signatory::compose([a.clone(), b.clone()]).unwrap();
        let combined = Signatory::compose([context_default, b.clone(), c.clone(), a.clone()]).unwrap();
        assert_eq!(combined.len(), 3);

        let signatures = combined.sign(tx_id(), b"body".to_vec()).await.unwrap();
        let mut expected: Vec<[u8; 32]> = [a, b, c].iter().flat_map(|s| s.public_keys()).collect();
        let mut actual: Vec<[u8; 32]> = signatures
            .public_keys()
            .into_iter()
            .map(|k| k.try_into().unwrap())
            .collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_compose_single_is_unwrapped() {
        let a = Signatory::ed25519(KeyPair::generate());
        let composed = Signatory::compose([a.clone(), a.clone()]).unwrap();
        assert!(composed.same_as(&a));
        assert!(!composed.is_list());

        assert!(Signatory::compose(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_callback_invoked_once_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let keypair = KeyPair::generate();
        let first = Signatory::ed25519(KeyPair::generate());

        let counter = calls.clone();
        let external_key = keypair.clone();
        let external = Signatory::from_fn(move |invoice: Invoice| {
            let counter = counter.clone();
            let key = external_key.clone();
            async move {
                // The in-memory signer listed first has already signed.
                assert_eq!(invoice.signatures().len(), 1);
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(vec![SignaturePair::new(
                    KeyType::Ed25519,
                    key.public_key(),
                    key.sign(invoice.body_bytes()),
                )])
            }
        });

        let combined = Signatory::compose([first, external.clone(), external]).unwrap();
        let signatures = combined.sign(tx_id(), b"body".to_vec()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(signatures.len(), 2);
        assert!(signatures.contains_key(&keypair.public_key()));
    }

    #[tokio::test]
    async fn test_signing_is_all_or_nothing() {
        let good = Signatory::ed25519(KeyPair::generate());
        let failing = Signatory::from_fn(|_invoice: Invoice| async {
            Err(CryptoError::InvalidSignature("device rejected".to_string()))
        });
        let combined = Signatory::compose([good, failing]).unwrap();

        let mut invoice = Invoice::new(tx_id(), b"body".to_vec());
        let err = combined.sign_invoice(&mut invoice).await.unwrap_err();
        assert!(matches!(err, CryptoError::SigningFailed(_)));
        assert!(invoice.signatures().is_empty());
    }
}
