//! Signable transaction payloads and the signatures gathered for them

use gossamer_core::TxId;
use serde::{Deserialize, Serialize};

use crate::keys::KeyType;

/// One signature together with the public key that produced it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePair {
    /// Algorithm of the signing key
    pub key_type: KeyType,

    /// Raw public key of the signer
    #[serde(with = "serde_bytes")]
    pub public_key: Vec<u8>,

    /// Signature over the invoice body bytes
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

impl SignaturePair {
    /// Create a signature pair
    pub fn new(key_type: KeyType, public_key: impl Into<Vec<u8>>, signature: impl Into<Vec<u8>>) -> Self {
        Self {
            key_type,
            public_key: public_key.into(),
            signature: signature.into(),
        }
    }
}

/// Ordered set of signatures keyed by public key
///
/// Insertion order is preserved and a public key appears at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSet {
    pairs: Vec<SignaturePair>,
}

impl SignatureSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature; returns false when the key already signed
    pub fn insert(&mut self, pair: SignaturePair) -> bool {
        if self.contains_key(&pair.public_key) {
            return false;
        }
        self.pairs.push(pair);
        true
    }

    /// Whether a signature from `public_key` is present
    pub fn contains_key(&self, public_key: &[u8]) -> bool {
        self.get(public_key).is_some()
    }

    /// Signature produced by `public_key`, if any
    pub fn get(&self, public_key: &[u8]) -> Option<&SignaturePair> {
        self.pairs.iter().find(|p| p.public_key == public_key)
    }

    /// Number of signatures
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no signatures were gathered
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate signatures in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SignaturePair> {
        self.pairs.iter()
    }

    /// Public keys of all signers, in insertion order
    pub fn public_keys(&self) -> Vec<&[u8]> {
        self.pairs.iter().map(|p| p.public_key.as_slice()).collect()
    }

    /// Take ownership of the pairs
    pub fn into_pairs(self) -> Vec<SignaturePair> {
        self.pairs
    }
}

impl FromIterator<SignaturePair> for SignatureSet {
    fn from_iter<I: IntoIterator<Item = SignaturePair>>(iter: I) -> Self {
        let mut set = Self::new();
        for pair in iter {
            set.insert(pair);
        }
        set
    }
}

/// A transaction body awaiting signatures
///
/// Signatories read the body bytes and add their signatures; the
/// transaction id is exposed so external signers can show the user what
/// they are approving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invoice {
    tx_id: TxId,
    body_bytes: Vec<u8>,
    signatures: SignatureSet,
}

impl Invoice {
    /// Create an invoice for an encoded transaction body
    pub fn new(tx_id: TxId, body_bytes: Vec<u8>) -> Self {
        Self {
            tx_id,
            body_bytes,
            signatures: SignatureSet::new(),
        }
    }

    /// Transaction being signed
    pub fn tx_id(&self) -> &TxId {
        &self.tx_id
    }

    /// Bytes every signature must cover
    pub fn body_bytes(&self) -> &[u8] {
        &self.body_bytes
    }

    /// Add a signature; a second signature from the same key is ignored
    pub fn add_signature(&mut self, pair: SignaturePair) -> bool {
        self.signatures.insert(pair)
    }

    /// Signatures gathered so far
    pub fn signatures(&self) -> &SignatureSet {
        &self.signatures
    }

    /// Split into body bytes and signatures
    pub fn into_parts(self) -> (Vec<u8>, SignatureSet) {
        (self.body_bytes, self.signatures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gossamer_core::Address;

    #[test]
    fn test_signature_set_rejects_duplicate_keys() {
        let mut set = SignatureSet::new();
        assert!(set.insert(SignaturePair::new(KeyType::Ed25519, vec![1; 32], vec![9; 64])));
        assert!(!set.insert(SignaturePair::new(KeyType::Ed25519, vec![1; 32], vec![8; 64])));
        assert!(set.insert(SignaturePair::new(KeyType::Ed25519, vec![2; 32], vec![7; 64])));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&[1; 32]).unwrap().signature, vec![9; 64]);
        assert_eq!(set.public_keys(), vec![&[1u8; 32][..], &[2u8; 32][..]]);
    }

    #[test]
    fn test_invoice_parts() {
        let mut invoice = Invoice::new(TxId::new(Address::account(2), 10, 0), b"body".to_vec());
        invoice.add_signature(SignaturePair::new(KeyType::Ed25519, vec![1; 32], vec![0; 64]));

        assert_eq!(invoice.tx_id().payer, Address::account(2));
        let (body, signatures) = invoice.into_parts();
        assert_eq!(body, b"body");
        assert_eq!(signatures.len(), 1);
    }
}
