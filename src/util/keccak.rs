//! Keccak digests for transaction hashing and address derivation.
//!
//! These are the pre-standardization padding variant ("Keccak"), not the
//! finalized FIPS SHA3. The network's hashes were fixed before the standard
//! changed its padding, so the FIPS variant produces incompatible digests.

use ethereum_types::{H256, H512};
use tiny_keccak::{Hasher, Keccak};

/// Computes the 256-bit Keccak digest of a byte sequence.
///
/// Accepts anything viewable as bytes: slices, vectors, and fixed-width
/// hashes alike.
#[must_use]
#[inline]
pub fn keccak256<T: AsRef<[u8]>>(data: T) -> H256 {
    let mut output = [0u8; 32];
    let mut keccak = Keccak::v256();
    keccak.update(data.as_ref());
    keccak.finalize(&mut output);
    H256(output)
}

/// Computes the 512-bit Keccak digest of a byte sequence.
#[must_use]
#[inline]
pub fn keccak512<T: AsRef<[u8]>>(data: T) -> H512 {
    let mut output = [0u8; 64];
    let mut keccak = Keccak::v512();
    keccak.update(data.as_ref());
    keccak.finalize(&mut output);
    H512(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn keccak256_empty() {
        let expected = hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");
        assert_eq!(keccak256(b"").0, expected);
        // The FIPS SHA3-256 empty digest differs; the padding change matters.
        let fips = hex!("a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a");
        assert_ne!(keccak256(b"").0, fips);
    }

    #[test]
    fn keccak256_known_value() {
        let expected = hex!("4d741b6f1eb29cb2a9b9911c82f56fa8d73b04959d3d9d222895df6c0b28aa15");
        assert_eq!(
            keccak256("The quick brown fox jumps over the lazy dog").0,
            expected
        );
    }

    #[test]
    fn keccak256_fixed_width_input() {
        // 32 zero bytes, whether as an array or a hash value.
        let expected = hex!("290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563");
        assert_eq!(keccak256([0u8; 32]).0, expected);
        assert_eq!(keccak256(H256::zero()).0, expected);
    }

    #[test]
    fn keccak512_empty() {
        let expected = hex!(
            "0eab42de4c3ceb9235fc91acffe746b29c29a8c366b7c60e4e67c466f36a4304
             c00fa9caf9d87976ba469bcbe06713b435f091ef2769fb160cdab33d3670680e"
        );
        assert_eq!(keccak512(b"").0, expected);
    }
}
