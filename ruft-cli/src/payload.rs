//! Synthetic payload generation

use rand::RngCore;

/// Generate `size_mib` MiB of random bytes
///
/// Used when no input file is given, so transfers can be exercised without
/// any on-disk fixture.
pub fn generate_random_payload(size_mib: usize) -> Vec<u8> {
    let mut data = vec![0u8; size_mib * 1024 * 1024];
    rand::thread_rng().fill_bytes(&mut data);
    data
}
