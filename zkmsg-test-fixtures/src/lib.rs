//! Deterministic identities and map mirrors shared by the zkmsg test suites.

use ed25519_dalek::{Signature, Signer, SigningKey};
use once_cell::sync::OnceCell;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use zkmsg_common::{Account, AuthenticatedMap, MapWitness, Root, EMPTY_VALUE, MARKER_VALUE};

static FIXTURES: OnceCell<TestFixtures> = OnceCell::new();

/// A signing key together with the account it controls.
#[derive(Clone, Debug)]
pub struct Identity {
    pub signing_key: SigningKey,
    pub account: Account,
}

impl Identity {
    /// Derive an identity from a human-readable label. Same label, same key.
    pub fn from_label(label: &str) -> Self {
        let seed = blake3_seed(label);
        let mut rng = ChaCha20Rng::from_seed(seed);
        let signing_key = SigningKey::generate(&mut rng);
        let account = Account::new(signing_key.verifying_key());
        Self {
            signing_key,
            account,
        }
    }

    pub fn sign(&self, payload: &[u8]) -> Signature {
        self.signing_key.sign(payload)
    }
}

fn blake3_seed(label: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key("zkmsg test fixtures v1");
    hasher.update(label.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Fixed cast of identities reused across crates.
#[derive(Debug)]
pub struct TestFixtures {
    pub admin: Identity,
    pub alice: Identity,
    pub bob: Identity,
    pub mallory: Identity,
}

/// Return lazily constructed fixtures shared across tests.
pub fn fixtures() -> &'static TestFixtures {
    FIXTURES.get_or_init(|| TestFixtures {
        admin: Identity::from_label("admin"),
        alice: Identity::from_label("alice"),
        bob: Identity::from_label("bob"),
        mallory: Identity::from_label("mallory"),
    })
}

/// Off-chain copy of one marker map, kept in step with a registry root.
///
/// Tests build witnesses from the mirror, submit them, and call
/// [`MapMirror::mark`] only once the registry accepted the transition.
#[derive(Clone, Debug, Default)]
pub struct MapMirror {
    map: AuthenticatedMap,
}

impl MapMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Root {
        self.map.root()
    }

    pub fn witness(&self, account: &Account) -> MapWitness {
        self.map.witness(&account.key())
    }

    pub fn is_marked(&self, account: &Account) -> bool {
        self.map.get(&account.key()) != EMPTY_VALUE
    }

    /// Record the marker for `account` and return the new root.
    pub fn mark(&mut self, account: &Account) -> Root {
        self.map.set(account.key(), MARKER_VALUE)
    }
}
