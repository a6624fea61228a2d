//! Recoverable ECDSA signatures over secp256k1.
//!
//! A transaction signature is the `(r, s, v)` triple: two 256-bit scalars
//! and a one-bit recovery id. Recovery reconstructs the signer's public key
//! from the triple and the signed digest, which is how senders are derived
//! without ever being placed on the wire.

use crate::util::{keccak256, Error, Result};
use ethereum_types::{Address, BigEndianHash, H256, H512, U256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1, SecretKey};

/// Uncompressed secp256k1 public key without the 0x04 prefix byte.
pub type Public = H512;

/// The order of the secp256k1 group.
pub const SECP256K1_N: U256 = U256([
    0xbfd2_5e8c_d036_4141,
    0xbaae_dce6_af48_a03b,
    0xffff_ffff_ffff_fffe,
    0xffff_ffff_ffff_ffff,
]);

/// An ECDSA signature with its recovery id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// The r scalar, as a 256-bit big-endian value.
    pub r: H256,
    /// The s scalar, as a 256-bit big-endian value.
    pub s: H256,
    /// The recovery id, 0 or 1.
    pub v: u8,
}

impl Signature {
    /// Returns true if both scalars are zero.
    ///
    /// A zero signature is a sentinel for system transactions whose sender
    /// is fixed by convention rather than recovered from the curve.
    #[must_use]
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.r.is_zero() && self.s.is_zero()
    }

    /// Returns true if both scalars are inside the group order (exclusive)
    /// and the recovery id is 0 or 1.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let r = self.r.into_uint();
        let s = self.s.into_uint();
        self.v <= 1 && !r.is_zero() && r < SECP256K1_N && !s.is_zero() && s < SECP256K1_N
    }
}

/// Signs a 256-bit digest with the given private key.
///
/// Signing is deterministic (RFC 6979 nonces) and always produces the
/// low-s form, so recovery ids stay in {0, 1}.
///
/// # Errors
/// `Error::BadArgument` for an invalid private key.
#[must_use]
pub fn sign_digest(private_key: &[u8; 32], digest: &H256) -> Result<Signature> {
    let secp = Secp256k1::signing_only();
    let secret_key = SecretKey::from_byte_array(*private_key)
        .map_err(|_| Error::BadArgument("Invalid private key".to_string()))?;
    let message = Message::from_digest(digest.0);
    let (recovery_id, serialized) = secp
        .sign_ecdsa_recoverable(message, &secret_key)
        .serialize_compact();
    Ok(Signature {
        r: H256::from_slice(&serialized[..32]),
        s: H256::from_slice(&serialized[32..]),
        v: i32::from(recovery_id) as u8,
    })
}

/// Recovers the public key that signed `digest`.
///
/// # Errors
/// `Error::Secp256k1Error` when the triple is mathematically inconsistent
/// with the curve (point at infinity, bad recovery id, residue mismatch).
#[must_use]
pub fn recover(signature: &Signature, digest: &H256) -> Result<Public> {
    let secp = Secp256k1::verification_only();
    let recovery_id = RecoveryId::try_from(i32::from(signature.v))?;
    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(signature.r.as_bytes());
    compact[32..].copy_from_slice(signature.s.as_bytes());
    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id)?;
    let public_key = secp.recover_ecdsa(Message::from_digest(digest.0), &recoverable)?;
    let serialized = public_key.serialize_uncompressed();
    Ok(Public::from_slice(&serialized[1..]))
}

/// Derives the 160-bit address of a public key: the rightmost 20 bytes of
/// its Keccak-256 digest.
#[must_use]
#[inline]
pub fn public_to_address(public: &Public) -> Address {
    Address::from(keccak256(public))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use pretty_assertions::assert_eq;
    use secp256k1::PublicKey;

    fn one() -> H256 {
        H256::from_low_u64_be(1)
    }

    #[test]
    fn validity_bounds() {
        let n = H256::from_uint(&SECP256K1_N);
        let n_minus_one = H256::from_uint(&(SECP256K1_N - U256::from(1u64)));

        assert!(Signature { r: one(), s: one(), v: 0 }.is_valid());
        assert!(Signature { r: n_minus_one, s: one(), v: 1 }.is_valid());
        // Zero scalars, scalars at the group order, and wide recovery ids
        // are all rejected.
        assert!(!Signature { r: H256::zero(), s: one(), v: 0 }.is_valid());
        assert!(!Signature { r: one(), s: H256::zero(), v: 0 }.is_valid());
        assert!(!Signature { r: n, s: one(), v: 0 }.is_valid());
        assert!(!Signature { r: one(), s: n, v: 0 }.is_valid());
        assert!(!Signature { r: one(), s: one(), v: 2 }.is_valid());
    }

    #[test]
    fn zero_sentinel() {
        let zero = Signature { r: H256::zero(), s: H256::zero(), v: 0 };
        assert!(zero.is_zero());
        assert!(!zero.is_valid());
        assert!(!Signature { r: one(), s: H256::zero(), v: 0 }.is_zero());
    }

    #[test]
    fn sign_is_deterministic() -> Result<()> {
        // Worked example from the EIP-155 replay protection scheme: the
        // chain-1 signing hash under the 0x46.. key.
        let private_key = [0x46u8; 32];
        let digest = H256(hex!(
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        ));
        let signature = sign_digest(&private_key, &digest)?;
        assert_eq!(
            signature.r.0,
            hex!("28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276")
        );
        assert_eq!(
            signature.s.0,
            hex!("67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83")
        );
        assert_eq!(signature.v, 0);
        assert!(signature.is_valid());
        Ok(())
    }

    #[test]
    fn recover_round_trip() -> Result<()> {
        let private_key = hex!("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef");
        let digest = keccak256(b"transfer 10 wei");
        let signature = sign_digest(&private_key, &digest)?;
        let public = recover(&signature, &digest)?;

        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_byte_array(private_key).unwrap();
        let expected = PublicKey::from_secret_key(&secp, &secret_key);
        assert_eq!(public.as_bytes(), &expected.serialize_uncompressed()[1..]);
        Ok(())
    }

    #[test]
    fn recover_rejects_wrong_digest() -> Result<()> {
        let private_key = [0x46u8; 32];
        let digest = keccak256(b"signed message");
        let signature = sign_digest(&private_key, &digest)?;
        let public = recover(&signature, &digest)?;
        let other = recover(&signature, &keccak256(b"different message"))?;
        // Recovery over the wrong digest yields a different key, never the
        // signer's.
        assert_ne!(public, other);
        Ok(())
    }

    #[test]
    fn address_derivation() -> Result<()> {
        // The EIP-155 example key 0x46..46 controls this address.
        let private_key = [0x46u8; 32];
        let digest = keccak256(b"anything");
        let signature = sign_digest(&private_key, &digest)?;
        let public = recover(&signature, &digest)?;
        assert_eq!(
            public_to_address(&public).0,
            hex!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f")
        );
        Ok(())
    }

    #[test]
    fn bad_private_key() {
        let digest = keccak256(b"x");
        // Zero is not a valid secp256k1 secret.
        let err = sign_digest(&[0u8; 32], &digest).unwrap_err();
        assert_eq!(err.to_string(), "Bad argument: Invalid private key");
    }
}
