//! Root-committed registries.
//!
//! Both registries keep a single [`Root`] and never see the underlying map.
//! Callers bring a [`MapWitness`] built from their own copy of the map; the
//! registry re-derives roots from it and compares against what it committed.
//!
//! ```text
//! eligible(k)      <=> witness_k.root(MARKER) == eligibility_root
//! consumed(k)      <=> witness_k.root(MARKER) == nullifier_root
//! consume(k):        nullifier_root <- witness_k.root(MARKER)
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zkmsg_common::{
    empty_root, Account, MapKey, MapValue, MapWitness, Root, EMPTY_VALUE, MARKER_VALUE,
};

use crate::error::{DepositError, Result};

/// True when storing `value` at the witnessed key yields a root other than
/// `root`, i.e. the key does not already hold `value` under `root`.
pub fn would_change_root(root: &Root, witness: &MapWitness, value: &MapValue) -> bool {
    witness.compute_root(value) != *root
}

/// Per-identity deposit state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositStatus {
    NotDeposited,
    Deposited,
}

/// Set of identities allowed to deposit, committed as one root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EligibilityRegistry {
    root: Root,
    admin: MapKey,
    total_addresses: u64,
    max_total_addresses: u64,
}

impl EligibilityRegistry {
    /// Empty registry administered by `admin`.
    pub fn new(admin: &Account, max_total_addresses: u64) -> Self {
        Self {
            root: empty_root(),
            admin: admin.key(),
            total_addresses: 0,
            max_total_addresses,
        }
    }

    pub fn root(&self) -> Root {
        self.root
    }

    /// Key of the account allowed to add identities.
    pub fn admin(&self) -> MapKey {
        self.admin
    }

    pub fn total_addresses(&self) -> u64 {
        self.total_addresses
    }

    pub fn max_total_addresses(&self) -> u64 {
        self.max_total_addresses
    }

    /// Check that the witnessed key holds the eligibility marker.
    ///
    /// Returns the key encoded by the witness.
    pub fn check_eligibility(&self, witness: &MapWitness) -> Result<MapKey> {
        witness.ensure_well_formed()?;
        let (root, key) = witness.compute_root_and_key(&MARKER_VALUE);
        if root != self.root {
            debug!(%key, "eligibility witness does not derive the committed root");
            return Err(DepositError::NotEligible(format!(
                "{key} is not in the eligibility set"
            )));
        }
        Ok(key)
    }

    /// Root the registry would hold after adding the witnessed key.
    ///
    /// Read only; fails for the same reasons [`add_eligible`](Self::add_eligible) does.
    pub fn plan_add(&self, sender: &Account, witness: &MapWitness) -> Result<(MapKey, Root)> {
        if sender.key() != self.admin {
            warn!(sender = %sender.key(), "non-admin tried to add an eligible address");
            return Err(DepositError::Unauthorized(
                "only the admin can add eligible addresses".into(),
            ));
        }
        if self.total_addresses >= self.max_total_addresses {
            return Err(DepositError::CapacityExceeded {
                max: self.max_total_addresses,
            });
        }

        witness.ensure_well_formed()?;
        let (next, key) = witness.compute_root_and_key(&MARKER_VALUE);
        if next == self.root {
            return Err(DepositError::AlreadyEligible { key });
        }
        if witness.compute_root(&EMPTY_VALUE) != self.root {
            return Err(DepositError::StaleWitness(format!(
                "witness for {key} does not derive the current eligibility root"
            )));
        }
        Ok((key, next))
    }

    /// Mark the witnessed key as eligible. Admin only.
    pub fn add_eligible(&mut self, sender: &Account, witness: &MapWitness) -> Result<Root> {
        let (key, next) = self.plan_add(sender, witness)?;
        let total = self
            .total_addresses
            .checked_add(1)
            .ok_or(DepositError::Overflow("total_addresses"))?;

        self.root = next;
        self.total_addresses = total;
        info!(%key, root = %next, total, "address added to eligibility set");
        Ok(next)
    }
}

/// Nullifier root transition computed by [`NullifierRegistry::check_not_consumed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NullifierUpdate {
    pub key: MapKey,
    pub previous: Root,
    pub next: Root,
}

/// Set of identities that already took their one-time action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NullifierRegistry {
    root: Root,
}

impl Default for NullifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NullifierRegistry {
    pub fn new() -> Self {
        Self { root: empty_root() }
    }

    pub fn root(&self) -> Root {
        self.root
    }

    /// Check that `key` has not been consumed and plan its consumption.
    ///
    /// The witness must encode `key`, must not already derive the current
    /// root with the marker, and must derive the current root with the empty
    /// value. No state changes.
    pub fn check_not_consumed(&self, witness: &MapWitness, key: &MapKey) -> Result<NullifierUpdate> {
        witness.ensure_well_formed()?;
        let (next, derived) = witness.compute_root_and_key(&MARKER_VALUE);
        if derived != *key {
            return Err(DepositError::KeyMismatch {
                expected: *key,
                actual: derived,
            });
        }
        if !would_change_root(&self.root, witness, &MARKER_VALUE) {
            debug!(%key, "nullifier already set");
            return Err(DepositError::AlreadyConsumed { key: *key });
        }
        if witness.compute_root(&EMPTY_VALUE) != self.root {
            return Err(DepositError::StaleWitness(format!(
                "witness for {key} does not derive the current nullifier root"
            )));
        }
        Ok(NullifierUpdate {
            key: *key,
            previous: self.root,
            next,
        })
    }

    /// Mark `key` as consumed.
    pub fn consume(&mut self, witness: &MapWitness, key: &MapKey) -> Result<Root> {
        let update = self.check_not_consumed(witness, key)?;
        self.apply(update)
    }

    /// Commit a planned update. Fails if the root moved since it was planned.
    pub fn apply(&mut self, update: NullifierUpdate) -> Result<Root> {
        if update.previous != self.root {
            return Err(DepositError::StaleWitness(format!(
                "nullifier root moved since the update for {} was planned",
                update.key
            )));
        }
        self.root = update.next;
        debug!(key = %update.key, root = %update.next, "nullifier consumed");
        Ok(update.next)
    }

    /// Deposit status of `key`, read from a witness against the current root.
    pub fn status(&self, witness: &MapWitness, key: &MapKey) -> Result<DepositStatus> {
        witness.ensure_well_formed()?;
        let derived = witness.key();
        if derived != *key {
            return Err(DepositError::KeyMismatch {
                expected: *key,
                actual: derived,
            });
        }
        if !would_change_root(&self.root, witness, &MARKER_VALUE) {
            Ok(DepositStatus::Deposited)
        } else if !would_change_root(&self.root, witness, &EMPTY_VALUE) {
            Ok(DepositStatus::NotDeposited)
        } else {
            Err(DepositError::StaleWitness(format!(
                "witness for {key} does not derive the current nullifier root"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkmsg_test_fixtures::{fixtures, MapMirror};

    #[test]
    fn admin_adds_and_member_checks() {
        let f = fixtures();
        let mut registry = EligibilityRegistry::new(&f.admin.account, 10);
        let mut mirror = MapMirror::new();

        let root = registry
            .add_eligible(&f.admin.account, &mirror.witness(&f.alice.account))
            .unwrap();
        assert_eq!(root, mirror.mark(&f.alice.account));
        assert_eq!(registry.total_addresses(), 1);

        let key = registry
            .check_eligibility(&mirror.witness(&f.alice.account))
            .unwrap();
        assert_eq!(key, f.alice.account.key());
        assert!(matches!(
            registry.check_eligibility(&mirror.witness(&f.bob.account)),
            Err(DepositError::NotEligible(_))
        ));
    }

    #[test]
    fn non_admin_cannot_add() {
        let f = fixtures();
        let mut registry = EligibilityRegistry::new(&f.admin.account, 10);
        let mirror = MapMirror::new();
        let err = registry
            .add_eligible(&f.mallory.account, &mirror.witness(&f.mallory.account))
            .unwrap_err();
        assert!(matches!(err, DepositError::Unauthorized(_)));
        assert_eq!(registry.root(), empty_root());
        assert_eq!(registry.total_addresses(), 0);
    }

    #[test]
    fn re_adding_keeps_counter() {
        let f = fixtures();
        let mut registry = EligibilityRegistry::new(&f.admin.account, 10);
        let mut mirror = MapMirror::new();
        registry
            .add_eligible(&f.admin.account, &mirror.witness(&f.alice.account))
            .unwrap();
        mirror.mark(&f.alice.account);

        let err = registry
            .add_eligible(&f.admin.account, &mirror.witness(&f.alice.account))
            .unwrap_err();
        assert!(matches!(err, DepositError::AlreadyEligible { .. }));
        assert_eq!(registry.total_addresses(), 1);
    }

    #[test]
    fn stale_add_witness_is_rejected() {
        let f = fixtures();
        let mut registry = EligibilityRegistry::new(&f.admin.account, 10);
        let mut mirror = MapMirror::new();
        let stale = mirror.witness(&f.bob.account);

        registry
            .add_eligible(&f.admin.account, &mirror.witness(&f.alice.account))
            .unwrap();
        mirror.mark(&f.alice.account);

        let err = registry.add_eligible(&f.admin.account, &stale).unwrap_err();
        assert!(matches!(err, DepositError::StaleWitness(_)));
        assert_eq!(registry.root(), mirror.root());
    }

    #[test]
    fn capacity_is_enforced() {
        let f = fixtures();
        let mut registry = EligibilityRegistry::new(&f.admin.account, 1);
        let mut mirror = MapMirror::new();
        registry
            .add_eligible(&f.admin.account, &mirror.witness(&f.alice.account))
            .unwrap();
        mirror.mark(&f.alice.account);

        let err = registry
            .add_eligible(&f.admin.account, &mirror.witness(&f.bob.account))
            .unwrap_err();
        assert!(matches!(err, DepositError::CapacityExceeded { max: 1 }));
    }

    #[test]
    fn consume_is_one_shot() {
        let f = fixtures();
        let key = f.alice.account.key();
        let mut registry = NullifierRegistry::new();
        let mut mirror = MapMirror::new();

        registry
            .consume(&mirror.witness(&f.alice.account), &key)
            .unwrap();
        mirror.mark(&f.alice.account);
        assert_eq!(registry.root(), mirror.root());

        let witness = mirror.witness(&f.alice.account);
        assert!(matches!(
            registry.check_not_consumed(&witness, &key),
            Err(DepositError::AlreadyConsumed { .. })
        ));
        assert!(matches!(
            registry.consume(&witness, &key),
            Err(DepositError::AlreadyConsumed { .. })
        ));
        assert_eq!(registry.root(), mirror.root());
    }

    #[test]
    fn witness_must_encode_the_acting_key() {
        let f = fixtures();
        let registry = NullifierRegistry::new();
        let mirror = MapMirror::new();
        let err = registry
            .check_not_consumed(&mirror.witness(&f.bob.account), &f.alice.account.key())
            .unwrap_err();
        assert!(matches!(err, DepositError::KeyMismatch { .. }));
    }

    #[test]
    fn apply_rejects_outdated_plan() {
        let f = fixtures();
        let mut registry = NullifierRegistry::new();
        let mirror = MapMirror::new();
        let plan_a = registry
            .check_not_consumed(&mirror.witness(&f.alice.account), &f.alice.account.key())
            .unwrap();
        let plan_b = registry
            .check_not_consumed(&mirror.witness(&f.bob.account), &f.bob.account.key())
            .unwrap();

        registry.apply(plan_a).unwrap();
        assert!(matches!(
            registry.apply(plan_b),
            Err(DepositError::StaleWitness(_))
        ));
        assert_eq!(registry.root(), plan_a.next);
    }

    #[test]
    fn status_follows_consumption() {
        let f = fixtures();
        let key = f.alice.account.key();
        let mut registry = NullifierRegistry::new();
        let mut mirror = MapMirror::new();

        assert_eq!(
            registry.status(&mirror.witness(&f.alice.account), &key).unwrap(),
            DepositStatus::NotDeposited
        );
        registry
            .consume(&mirror.witness(&f.alice.account), &key)
            .unwrap();
        mirror.mark(&f.alice.account);
        assert_eq!(
            registry.status(&mirror.witness(&f.alice.account), &key).unwrap(),
            DepositStatus::Deposited
        );
    }

    #[test]
    fn would_change_root_matches_definition() {
        let f = fixtures();
        let mut mirror = MapMirror::new();
        let witness = mirror.witness(&f.alice.account);
        let root = mirror.root();
        assert!(would_change_root(&root, &witness, &MARKER_VALUE));
        assert!(!would_change_root(&root, &witness, &EMPTY_VALUE));

        mirror.mark(&f.alice.account);
        let witness = mirror.witness(&f.alice.account);
        assert!(!would_change_root(&mirror.root(), &witness, &MARKER_VALUE));
    }
}
