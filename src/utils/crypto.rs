use ring::digest::{Context, SHA256};

/// Single SHA-256 digest.
pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    let mut out = [0u8; 32];
    out.copy_from_slice(digest.as_ref());
    out
}

/// Double SHA-256: `sha256(sha256(data))`.
///
/// Every content hash in the system uses this: transaction ids, block
/// header hashes, merkle steps, address checksums.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256_digest(&sha256_digest(data))
}
