use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Replica points placed on the ring per member. Higher values smooth the
/// distribution at the cost of memory; 100 keeps per-member imbalance in
/// the low single-digit percent range for typical fleet sizes.
const DEFAULT_REPLICAS: u32 = 100;

/// Consistent-hash ring over coordination-group members.
///
/// Every cooperating process that builds a ring from the same member set
/// computes identical placements: placement is a pure function of the
/// member ids, hashed with SHA-256.
///
/// # Examples
///
/// ```
/// use meterd_coordination::hashring::HashRing;
///
/// let ring = HashRing::new(["agent-1".to_string(), "agent-2".to_string()]);
/// let owner = ring.owner("resource-42").unwrap();
/// assert!(owner == "agent-1" || owner == "agent-2");
/// // Ownership is deterministic.
/// assert_eq!(ring.owner("resource-42"), Some(owner));
/// ```
pub struct HashRing {
    points: BTreeMap<u64, String>,
}

impl HashRing {
    pub fn new(members: impl IntoIterator<Item = String>) -> Self {
        Self::with_replicas(members, DEFAULT_REPLICAS)
    }

    pub fn with_replicas(members: impl IntoIterator<Item = String>, replicas: u32) -> Self {
        let mut points = BTreeMap::new();
        for member in members {
            for replica in 0..replicas {
                points.insert(hash_key(&format!("{member}-{replica}")), member.clone());
            }
        }
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the member owning `key`: the first ring point at or after
    /// the key's hash, wrapping around to the lowest point.
    pub fn owner(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }
        let h = hash_key(key);
        self.points
            .range(h..)
            .next()
            .or_else(|| self.points.iter().next())
            .map(|(_, member)| member.as_str())
    }
}

/// Stable 64-bit hash: the first 8 bytes of SHA-256, big-endian. Stable
/// across processes and architectures, unlike the std hasher.
fn hash_key(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn members(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("agent-{i}")).collect()
    }

    #[test]
    fn empty_ring_owns_nothing() {
        let ring = HashRing::new(Vec::new());
        assert!(ring.is_empty());
        assert_eq!(ring.owner("anything"), None);
    }

    #[test]
    fn every_key_has_exactly_one_owner() {
        let ring = HashRing::new(members(3));
        let owners: HashSet<String> = (0..200)
            .map(|i| ring.owner(&format!("res-{i}")).unwrap().to_string())
            .collect();
        // All owners come from the member set.
        for owner in &owners {
            assert!(owner.starts_with("agent-"));
        }
        // With 200 keys and 3 members, every member should own something.
        assert_eq!(owners.len(), 3);
    }

    #[test]
    fn ownership_is_stable_across_ring_instances() {
        let a = HashRing::new(members(5));
        let b = HashRing::new(members(5));
        for i in 0..100 {
            let key = format!("res-{i}");
            assert_eq!(a.owner(&key), b.owner(&key));
        }
    }

    #[test]
    fn single_member_owns_everything() {
        let ring = HashRing::new(vec!["solo".to_string()]);
        for i in 0..50 {
            assert_eq!(ring.owner(&format!("res-{i}")), Some("solo"));
        }
    }
}
