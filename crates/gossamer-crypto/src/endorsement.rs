//! Endorsement - the key policy an entity requires for a valid signature
//!
//! An endorsement is either a single public key or an n-of-m list of
//! nested endorsements:
//!
//! ```text
//!            Threshold(2 of 3)
//!           /        |         \
//!       Key(A)   Threshold(1 of 2)   Key(D)
//!                  /        \
//!               Key(B)    Key(C)
//! ```
//!
//! Values are immutable and compare structurally; two trees built
//! independently from equal inputs are equal.

use serde::Serialize;
use std::fmt;

use crate::error::{CryptoError, Result};
use crate::invoice::SignatureSet;
use crate::keys::{parse_ed25519_public_key, verify_ed25519, KeyType};

/// The two shapes an endorsement can take
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub enum EndorsementKind {
    /// One public key
    Key {
        key_type: KeyType,
        #[serde(with = "serde_bytes")]
        public_key: Vec<u8>,
    },

    /// At least `required_count` of `children` must be satisfied
    Threshold {
        required_count: u32,
        children: Vec<Endorsement>,
    },
}

/// Validated endorsement tree
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Endorsement {
    kind: EndorsementKind,
}

impl Endorsement {
    /// Single Ed25519 key, raw or DER encoded
    pub fn ed25519(public_key: &[u8]) -> Result<Self> {
        Self::single(KeyType::Ed25519, public_key)
    }

    /// Single key of the given algorithm
    ///
    /// Ed25519 keys are decoded and stored raw; other algorithms are kept
    /// as supplied and only checked for presence.
    pub fn single(key_type: KeyType, public_key: &[u8]) -> Result<Self> {
        let public_key = match key_type {
            KeyType::Ed25519 => parse_ed25519_public_key(public_key)?.to_bytes().to_vec(),
            KeyType::Rsa3072 | KeyType::Ecdsa384 => {
                if public_key.is_empty() {
                    return Err(CryptoError::InvalidKeyFormat(format!(
                        "The {} public key is empty.",
                        key_type
                    )));
                }
                public_key.to_vec()
            }
            KeyType::List => {
                return Err(CryptoError::out_of_range(
                    "key_type",
                    "Only endorsements representing a single key are supported with this constructor, please use the list constructor instead.",
                ))
            }
        };
        Ok(Self {
            kind: EndorsementKind::Key {
                key_type,
                public_key,
            },
        })
    }

    /// n-of-m list of child endorsements
    pub fn threshold(required_count: u32, children: Vec<Endorsement>) -> Result<Self> {
        if children.is_empty() {
            return Err(CryptoError::out_of_range(
                "children",
                "At least one endorsement in a list is required.",
            ));
        }
        if required_count < 1 {
            return Err(CryptoError::out_of_range(
                "required_count",
                "At least one key is required to sign a transaction.",
            ));
        }
        if required_count as usize > children.len() {
            return Err(CryptoError::out_of_range(
                "required_count",
                "The required number of keys for a valid signature cannot exceed the number of public keys provided.",
            ));
        }
        Ok(Self {
            kind: EndorsementKind::Threshold {
                required_count,
                children,
            },
        })
    }

    /// List that requires every child
    pub fn all_of(children: Vec<Endorsement>) -> Result<Self> {
        let count = children.len() as u32;
        Self::threshold(count, children)
    }

    /// Underlying shape
    pub fn kind(&self) -> &EndorsementKind {
        &self.kind
    }

    /// Algorithm, or `KeyType::List` for a threshold
    pub fn key_type(&self) -> KeyType {
        match &self.kind {
            EndorsementKind::Key { key_type, .. } => *key_type,
            EndorsementKind::Threshold { .. } => KeyType::List,
        }
    }

    /// Public key bytes; empty for a list
    pub fn public_key(&self) -> &[u8] {
        match &self.kind {
            EndorsementKind::Key { public_key, .. } => public_key,
            EndorsementKind::Threshold { .. } => &[],
        }
    }

    /// Required count; zero for a single key
    pub fn required_count(&self) -> u32 {
        match &self.kind {
            EndorsementKind::Key { .. } => 0,
            EndorsementKind::Threshold { required_count, .. } => *required_count,
        }
    }

    /// Child endorsements; empty for a single key
    pub fn children(&self) -> &[Endorsement] {
        match &self.kind {
            EndorsementKind::Key { .. } => &[],
            EndorsementKind::Threshold { children, .. } => children,
        }
    }

    /// Every leaf key in depth-first order
    pub fn public_keys(&self) -> Vec<(KeyType, &[u8])> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys<'a>(&'a self, keys: &mut Vec<(KeyType, &'a [u8])>) {
        match &self.kind {
            EndorsementKind::Key {
                key_type,
                public_key,
            } => keys.push((*key_type, public_key.as_slice())),
            EndorsementKind::Threshold { children, .. } => {
                for child in children {
                    child.collect_keys(keys);
                }
            }
        }
    }

    /// Whether `signatures` over `payload` satisfy this policy
    ///
    /// Ed25519 leaves are verified cryptographically. Other algorithms are
    /// verified by the network; a signature from the matching key counts.
    pub fn is_satisfied_by(&self, payload: &[u8], signatures: &SignatureSet) -> bool {
        match &self.kind {
            EndorsementKind::Key {
                key_type,
                public_key,
            } => match signatures.get(public_key) {
                Some(pair) if *key_type == KeyType::Ed25519 => {
                    verify_ed25519(public_key, payload, &pair.signature).unwrap_or(false)
                }
                Some(_) => true,
                None => false,
            },
            EndorsementKind::Threshold {
                required_count,
                children,
            } => {
                let satisfied = children
                    .iter()
                    .filter(|child| child.is_satisfied_by(payload, signatures))
                    .take(*required_count as usize)
                    .count();
                satisfied >= *required_count as usize
            }
        }
    }
}

impl fmt::Debug for Endorsement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EndorsementKind::Key {
                key_type,
                public_key,
            } => write!(f, "{}({})", key_type, hex::encode(public_key)),
            EndorsementKind::Threshold {
                required_count,
                children,
            } => f
                .debug_struct("Threshold")
                .field("required_count", required_count)
                .field("children", children)
                .finish(),
        }
    }
}

impl fmt::Debug for EndorsementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key {
                key_type,
                public_key,
            } => write!(f, "Key({}, {})", key_type, hex::encode(public_key)),
            Self::Threshold {
                required_count,
                children,
            } => write!(f, "Threshold({} of {})", required_count, children.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::SignaturePair;
    use crate::keys::KeyPair;

    fn key() -> (KeyPair, Endorsement) {
        let pair = KeyPair::generate();
        let endorsement = Endorsement::ed25519(&pair.public_key_der()).unwrap();
        (pair, endorsement)
    }

    #[test]
    fn test_single_key_accessors() {
        let pair = KeyPair::generate();
        let endorsement = Endorsement::ed25519(&pair.public_key()).unwrap();

        assert_eq!(endorsement.key_type(), KeyType::Ed25519);
        assert_eq!(endorsement.public_key(), &pair.public_key()[..]);
        assert_eq!(endorsement.required_count(), 0);
        assert!(endorsement.children().is_empty());
    }

    #[test]
    fn test_raw_and_der_keys_are_equal() {
        let pair = KeyPair::generate();
        let raw = Endorsement::ed25519(&pair.public_key()).unwrap();
        let der = Endorsement::ed25519(&pair.public_key_der()).unwrap();
        assert_eq!(raw, der);
    }

    #[test]
    fn test_invalid_ed25519_bytes() {
        let mut der = KeyPair::generate().public_key_der();
        der[0] = 0;
        assert!(matches!(
            Endorsement::ed25519(&der),
            Err(CryptoError::InvalidKeyFormat(_))
        ));
    }

    #[test]
    fn test_other_algorithms_kept_as_supplied() {
        let bytes = vec![0xAB; 48];
        let ecdsa = Endorsement::single(KeyType::Ecdsa384, &bytes).unwrap();
        assert_eq!(ecdsa.key_type(), KeyType::Ecdsa384);
        assert_eq!(ecdsa.public_key(), bytes.as_slice());

        assert!(Endorsement::single(KeyType::Rsa3072, &[]).is_err());
    }

    #[test]
    fn test_list_type_rejected_for_single() {
        let (pair, _) = key();
        let err = Endorsement::single(KeyType::List, &pair.public_key()).unwrap_err();
        assert!(matches!(err, CryptoError::OutOfRange { parameter: "key_type", .. }));
    }

    #[test]
    fn test_threshold_ranges() {
        let (_, a) = key();
        let (_, b) = key();

        assert!(Endorsement::threshold(1, vec![a.clone(), b.clone()]).is_ok());
        assert!(Endorsement::threshold(2, vec![a.clone(), b.clone()]).is_ok());
        assert!(matches!(
            Endorsement::threshold(0, vec![a.clone()]),
            Err(CryptoError::OutOfRange { parameter: "required_count", .. })
        ));
        assert!(matches!(
            Endorsement::threshold(3, vec![a, b]),
            Err(CryptoError::OutOfRange { parameter: "required_count", .. })
        ));
        assert!(matches!(
            Endorsement::threshold(1, vec![]),
            Err(CryptoError::OutOfRange { parameter: "children", .. })
        ));
    }

    #[test]
    fn test_structural_equality() {
        let (_, a) = key();
        let (_, b) = key();
        let (_, c) = key();

        assert_eq!(a, a.clone());
        assert_ne!(a, b);

        let list1 = Endorsement::all_of(vec![a.clone(), b.clone()]).unwrap();
        let list2 = Endorsement::all_of(vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(list1, list2);
        assert_eq!(list2, list1);

        let one_of = Endorsement::threshold(1, vec![a.clone(), b.clone()]).unwrap();
        assert_ne!(list1, one_of);

        let reordered = Endorsement::all_of(vec![b.clone(), a.clone()]).unwrap();
        assert_ne!(list1, reordered);

        let other = Endorsement::all_of(vec![b, c]).unwrap();
        assert_ne!(list1, other);
        assert_ne!(a, list1);
    }

    #[test]
    fn test_tree_enumeration() {
        let (_, a1) = key();
        let (_, b1) = key();
        let (_, a2) = key();
        let (_, b2) = key();
        let first = Endorsement::threshold(1, vec![a1.clone(), b1.clone()]).unwrap();
        let second = Endorsement::all_of(vec![a2.clone(), b2.clone()]).unwrap();
        let tree = Endorsement::all_of(vec![first.clone(), second.clone()]).unwrap();

        assert_eq!(tree.key_type(), KeyType::List);
        assert_eq!(tree.required_count(), 2);
        assert!(tree.public_key().is_empty());
        assert_eq!(tree.children(), &[first, second]);
        assert_eq!(tree.children()[1].required_count(), 2);

        let keys: Vec<&[u8]> = tree.public_keys().into_iter().map(|(_, k)| k).collect();
        assert_eq!(
            keys,
            vec![a1.public_key(), b1.public_key(), a2.public_key(), b2.public_key()]
        );
    }

    #[test]
    fn test_policy_satisfaction() {
        let (pa, a) = key();
        let (pb, b) = key();
        let (_, c) = key();
        let policy = Endorsement::threshold(2, vec![a, b, c]).unwrap();
        let payload = b"transaction body";

        let mut signatures = SignatureSet::new();
        signatures.insert(SignaturePair::new(KeyType::Ed25519, pa.public_key(), pa.sign(payload)));
        assert!(!policy.is_satisfied_by(payload, &signatures));

        signatures.insert(SignaturePair::new(KeyType::Ed25519, pb.public_key(), pb.sign(payload)));
        assert!(policy.is_satisfied_by(payload, &signatures));
        assert!(!policy.is_satisfied_by(b"tampered body", &signatures));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::keys::KeyPair;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn threshold_construction_matches_range(count in 1usize..6, required in 0u32..8) {
            let children: Vec<Endorsement> = (0..count)
                .map(|_| Endorsement::ed25519(&KeyPair::generate().public_key()).unwrap())
                .collect();
            let result = Endorsement::threshold(required, children.clone());

            if required >= 1 && required as usize <= count {
                let endorsement = result.unwrap();
                prop_assert_eq!(endorsement.required_count(), required);
                prop_assert_eq!(endorsement.children(), children.as_slice());
            } else {
                let is_range_error = matches!(result, Err(CryptoError::OutOfRange { .. }));
                prop_assert!(is_range_error);
            }
        }
    }
}
