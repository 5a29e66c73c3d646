//! Domain-separated BLAKE3 hashing.

use blake3::Hasher;

use crate::digest::Digest;

/// Domain tag for internal map nodes.
pub const MAP_NODE_DOMAIN: &[u8] = b"zkmsg_map_node_v1";

/// Domain tag for identity keys.
pub const IDENTITY_DOMAIN: &[u8] = b"zkmsg_identity_v1";

/// Domain tag for agent security codes.
pub const SECURITY_CODE_DOMAIN: &[u8] = b"zkmsg_security_code_v1";

/// Hash `parts` under `domain`.
///
/// Each part is length-prefixed so that `["ab", "c"]` and `["a", "bc"]`
/// produce different digests.
pub fn hash_with_domain(domain: &[u8], parts: &[&[u8]]) -> Digest {
    let mut hasher = Hasher::new();
    hasher.update(domain);
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Parent of two map nodes.
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Hasher::new();
    hasher.update(MAP_NODE_DOMAIN);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hasher.finalize().into()
}

/// BLAKE3 of arbitrary bytes as bare hex, for file fingerprints.
pub fn hash_bytes_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
