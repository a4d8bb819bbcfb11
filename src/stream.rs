//! Stream expander: Salsa20 keystream into a caller-supplied buffer.

use salsa20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use salsa20::{Key, Nonce, Salsa20};

/// Salsa20 block size in bytes.
const BLOCK_BYTES: u128 = 64;

/// The nonce block used by every pipeline stage.
pub const ZERO_NONCE: [u8; 16] = [0; 16];

/// Fills `out` with Salsa20 keystream under `key`.
///
/// `nonce` is the full 16-byte input block: an 8-byte nonce followed by the
/// little-endian block counter the keystream starts at. The result equals an
/// all-zero buffer XORed with the keystream. Each call starts from scratch.
#[inline]
pub fn expand(key: &[u8; 32], nonce: &[u8; 16], out: &mut [u8]) {
    let mut counter = [0u8; 8];
    counter.copy_from_slice(&nonce[8..]);
    let counter = u64::from_le_bytes(counter);

    let mut cipher = Salsa20::new(Key::from_slice(key), Nonce::from_slice(&nonce[..8]));
    if counter != 0 {
        cipher.seek(u128::from(counter) * BLOCK_BYTES);
    }
    out.fill(0);
    cipher.apply_keystream(out);
}
