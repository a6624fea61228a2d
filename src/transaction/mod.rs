//! Transaction building, signing, and sender recovery.
//!
//! A [`Transaction`] owns its fields and an optional signature. Serialized
//! form is an RLP list; the Keccak-256 digest of the signed list is the
//! transaction id, and the digest of the unsigned list (optionally bound
//! to a chain id per EIP-155) is what signatures commit to. The sender is
//! never on the wire: it is recovered from the signature on demand and
//! cached.
//!
//! # Examples
//!
//! Sign a message call and recover its sender:
//! ```
//! use ethereum_types::{Address, U256};
//! use ethertx::transaction::{Transaction, NO_CHAIN_ID};
//!
//! let private_key = [1u8; 32];
//! let mut tx = Transaction::message_call(
//!     U256::from(10u64),
//!     U256::from(3_000u64),
//!     U256::from(50_000u64),
//!     Address::from_low_u64_be(0x95),
//!     vec![],
//!     U256::from(42u64),
//!     &private_key,
//!     NO_CHAIN_ID,
//! )
//! .unwrap();
//! assert!(tx.has_signature());
//! assert!(!tx.sender().unwrap().is_zero());
//! ```

pub mod signature;

pub use self::signature::{Public, Signature};

use crate::transaction::signature::{public_to_address, recover, sign_digest};
use crate::util::{keccak256, Error, Result};
use ethereum_types::{Address, BigEndianHash, H160, H256, U256};
use rlp::{Rlp, RlpStream};

/// Chain id sentinel for transactions carrying no replay protection.
pub const NO_CHAIN_ID: i64 = -4;

/// The designated sender of zero-signature system transactions.
pub const MAX_ADDRESS: Address = H160([0xff; 20]);

/// What a transaction does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kind {
    /// Default-constructed placeholder; serializes to nothing.
    #[default]
    Null,
    /// Creates a contract; the destination field is left empty.
    ContractCreation,
    /// Invokes (or transfers to) an existing account.
    MessageCall,
}

/// Whether serialization and hashing cover the signature fields.
///
/// The unsigned form is what gets signed; the signed form is what goes on
/// the wire and what the transaction id is computed from. Passing the
/// wrong one is the classic misuse of this API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeSignature {
    /// Serialize the six content fields only.
    Without,
    /// Serialize content plus `v`, `r`, `s`.
    With,
}

/// How much signature checking [`Transaction::decode`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckSignature {
    /// Structural checks only.
    None,
    /// Additionally require the scalars and recovery id to be in range.
    Cheap,
    /// Additionally recover the sender, surfacing bad signatures eagerly.
    Everything,
}

/// A transaction on an account-based ledger.
///
/// Mutable value type. The signed-encoding hash and the recovered sender
/// are cached lazily; any mutation of signing-relevant state clears them.
#[derive(Debug, Clone)]
pub struct Transaction {
    kind: Kind,
    nonce: U256,
    gas_price: U256,
    gas: U256,
    to: Address,
    value: U256,
    data: Vec<u8>,
    vrs: Option<Signature>,
    chain_id: i64,
    hash_with: Option<H256>,
    sender: Option<Address>,
}

impl Default for Transaction {
    fn default() -> Transaction {
        Transaction {
            kind: Kind::Null,
            nonce: U256::zero(),
            gas_price: U256::zero(),
            gas: U256::zero(),
            to: Address::zero(),
            value: U256::zero(),
            data: Vec::new(),
            vrs: None,
            chain_id: NO_CHAIN_ID,
            hash_with: None,
            sender: None,
        }
    }
}

// Caches are derived state; they take no part in value identity.
impl PartialEq for Transaction {
    fn eq(&self, other: &Transaction) -> bool {
        self.kind == other.kind
            && self.nonce == other.nonce
            && self.gas_price == other.gas_price
            && self.gas == other.gas
            && self.to == other.to
            && self.value == other.value
            && self.data == other.data
            && self.vrs == other.vrs
            && self.chain_id == other.chain_id
    }
}

impl Eq for Transaction {}

impl Transaction {
    /// Constructs a signed message-call transaction.
    ///
    /// # Errors
    /// `Error::BadArgument` for an invalid private key;
    /// `Error::InvalidSignature` if signing produced an out-of-range
    /// signature.
    #[allow(clippy::too_many_arguments)]
    pub fn message_call(
        value: U256,
        gas_price: U256,
        gas: U256,
        to: Address,
        data: Vec<u8>,
        nonce: U256,
        private_key: &[u8; 32],
        chain_id: i64,
    ) -> Result<Transaction> {
        let mut tx = Transaction {
            kind: Kind::MessageCall,
            nonce,
            gas_price,
            gas,
            to,
            value,
            data,
            chain_id,
            ..Transaction::default()
        };
        tx.sign(private_key)?;
        Ok(tx)
    }

    /// Constructs a signed contract-creation transaction. `data` is the
    /// contract init code; there is no destination.
    ///
    /// # Errors
    /// Same as [`Transaction::message_call`].
    pub fn contract_creation(
        value: U256,
        gas_price: U256,
        gas: U256,
        data: Vec<u8>,
        nonce: U256,
        private_key: &[u8; 32],
        chain_id: i64,
    ) -> Result<Transaction> {
        let mut tx = Transaction {
            kind: Kind::ContractCreation,
            nonce,
            gas_price,
            gas,
            value,
            data,
            chain_id,
            ..Transaction::default()
        };
        tx.sign(private_key)?;
        Ok(tx)
    }

    /// Decodes a transaction from its RLP wire form.
    ///
    /// The buffer must hold a list of exactly nine items: nonce, gas
    /// price, gas limit, destination (empty for contract creation), value,
    /// payload, `v`, `r`, `s`. `v` carries both the recovery id and the
    /// chain id: values above 36 follow the EIP-155 scheme, 27 and 28 are
    /// the legacy unprotected encodings, anything else is rejected. A
    /// zero `r` and `s` marks a system transaction whose `v` is the chain
    /// id verbatim.
    ///
    /// # Errors
    /// `Error::BadData` for structural problems (with the offending RLP
    /// rendered in hex), `Error::InvalidSignature` for signature problems
    /// at the requested check level.
    ///
    /// # Examples
    /// ```
    /// use ethertx::transaction::{CheckSignature, Kind, Transaction};
    ///
    /// let raw = hex::decode(
    ///     "f85f800182520894095e7baea6a6c7c4c2dfeb977efac326af552d870a801ba048b55bfa915ac795c4\
    ///      31978d8a6a992b628d557da5ff759b307d495a36649353a0efffd310ac743f371de3b9f7f9cb56c0b28\
    ///      ad43601b4ab949f53faa07bd2c804",
    /// )
    /// .unwrap();
    /// let tx = Transaction::decode(&raw, CheckSignature::Cheap).unwrap();
    /// assert_eq!(tx.kind(), Kind::MessageCall);
    /// ```
    pub fn decode(bytes: &[u8], check: CheckSignature) -> Result<Transaction> {
        Transaction::decode_rlp(&Rlp::new(bytes), check).map_err(|e| match e {
            Error::DecoderError(inner) => Error::BadData(format!(
                "invalid transaction format ({}): RLP: {}",
                inner,
                hex::encode(bytes)
            )),
            other => other,
        })
    }

    fn decode_rlp(rlp: &Rlp, check: CheckSignature) -> Result<Transaction> {
        if !rlp.is_list() {
            return Err(Error::BadData("transaction RLP must be a list".to_string()));
        }

        let nonce = rlp.val_at(0)?;
        let gas_price = rlp.val_at(1)?;
        let gas = rlp.val_at(2)?;
        let to_item = rlp.at(3)?;
        let (kind, to) = if to_item.is_empty() {
            (Kind::ContractCreation, Address::zero())
        } else {
            (Kind::MessageCall, to_item.as_val()?)
        };
        let value = rlp.val_at(4)?;
        let data_item = rlp.at(5)?;
        if !data_item.is_data() {
            return Err(Error::BadData(
                "transaction data RLP must be a byte string".to_string(),
            ));
        }
        let data = data_item.data()?.to_vec();

        let v: u64 = rlp.val_at(6)?;
        let r = H256::from_uint(&rlp.val_at::<U256>(7)?);
        let s = H256::from_uint(&rlp.val_at::<U256>(8)?);

        let (chain_id, vrs) = if r.is_zero() && s.is_zero() {
            // Zero signature: v is the chain id verbatim, no EIP-155 math.
            (v as i64, Signature { r, s, v: 0 })
        } else {
            let chain_id = if v > 36 {
                ((v - 35) / 2) as i64
            } else if v == 27 || v == 28 {
                NO_CHAIN_ID
            } else {
                return Err(Error::InvalidSignature(format!("v value {} out of range", v)));
            };
            let vrs = Signature {
                r,
                s,
                v: (v as i64 - (chain_id * 2 + 35)) as u8,
            };
            if check >= CheckSignature::Cheap && !vrs.is_valid() {
                return Err(Error::InvalidSignature(
                    "signature scalars out of range".to_string(),
                ));
            }
            (chain_id, vrs)
        };

        if rlp.item_count()? > 9 {
            return Err(Error::BadData(
                "too many fields in the transaction RLP".to_string(),
            ));
        }

        let mut tx = Transaction {
            kind,
            nonce,
            gas_price,
            gas,
            to,
            value,
            data,
            vrs: Some(vrs),
            chain_id,
            hash_with: None,
            sender: None,
        };
        if check == CheckSignature::Everything {
            tx.sender()?;
        }
        Ok(tx)
    }

    /// Serializes this transaction into an RLP stream.
    ///
    /// A `Null` transaction writes nothing. The list header declares six
    /// items, plus three when the signature is included or when
    /// `for_eip155_hash` requests the chain-binding placeholder suffix
    /// `chain_id, 0, 0` (only meaningful without a signature: it forms the
    /// pre-signature hash input that commits to the chain id).
    ///
    /// # Errors
    /// `Error::IllegalState` if a signature was requested but none is set.
    pub fn rlp_append(
        &self,
        s: &mut RlpStream,
        sig: IncludeSignature,
        for_eip155_hash: bool,
    ) -> Result<()> {
        if self.kind == Kind::Null {
            return Ok(());
        }

        let with_sig = sig == IncludeSignature::With;
        s.begin_list(if with_sig || for_eip155_hash { 9 } else { 6 });
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas);
        if self.kind == Kind::MessageCall {
            s.append(&self.to);
        } else {
            s.append_empty_data();
        }
        s.append(&self.value);
        s.append(&self.data);

        if with_sig {
            let vrs = self
                .vrs
                .as_ref()
                .ok_or_else(|| Error::IllegalState("Transaction is unsigned".to_string()))?;
            if vrs.is_zero() {
                s.append(&(self.chain_id as u64));
            } else {
                let v_offset = self.chain_id * 2 + 35;
                s.append(&((i64::from(vrs.v) + v_offset) as u64));
            }
            s.append(&vrs.r.into_uint());
            s.append(&vrs.s.into_uint());
        } else if for_eip155_hash {
            s.append(&(self.chain_id as u64));
            s.append(&0u64);
            s.append(&0u64);
        }
        Ok(())
    }

    /// Returns the RLP serialization of this transaction.
    ///
    /// # Errors
    /// `Error::IllegalState` if a signature was requested but none is set.
    pub fn rlp_bytes(&self, sig: IncludeSignature) -> Result<Vec<u8>> {
        let mut s = RlpStream::new();
        self.rlp_append(&mut s, sig, false)?;
        Ok(s.out().to_vec())
    }

    /// Computes the Keccak-256 digest of the RLP serialization.
    ///
    /// With [`IncludeSignature::With`] this is the canonical transaction
    /// id, memoized until a mutator invalidates it. Without, it is the
    /// digest that signatures commit to; when a positive chain id is
    /// configured the chain id is bound into it per EIP-155 (the
    /// [`NO_CHAIN_ID`] sentinel never is).
    ///
    /// # Errors
    /// `Error::IllegalState` if a signed hash was requested on an unsigned
    /// transaction.
    pub fn hash(&mut self, sig: IncludeSignature) -> Result<H256> {
        if sig == IncludeSignature::With {
            if let Some(cached) = self.hash_with {
                return Ok(cached);
            }
        }
        let mut s = RlpStream::new();
        let for_eip155_hash = self.chain_id > 0 && sig == IncludeSignature::Without;
        self.rlp_append(&mut s, sig, for_eip155_hash)?;
        let hash = keccak256(s.out());
        if sig == IncludeSignature::With {
            self.hash_with = Some(hash);
        }
        Ok(hash)
    }

    /// Signs the unsigned hash with the given private key, replacing any
    /// existing signature and invalidating the caches.
    ///
    /// # Errors
    /// `Error::BadArgument` for an invalid private key;
    /// `Error::InvalidSignature` in the astronomically unlikely case the
    /// produced signature fails the range check. The transaction is left
    /// unsigned in both cases.
    pub fn sign(&mut self, private_key: &[u8; 32]) -> Result<()> {
        let digest = self.hash(IncludeSignature::Without)?;
        let vrs = sign_digest(private_key, &digest)?;
        if !vrs.is_valid() {
            return Err(Error::InvalidSignature(
                "signing produced an out-of-range signature".to_string(),
            ));
        }
        self.vrs = Some(vrs);
        self.hash_with = None;
        self.sender = None;
        Ok(())
    }

    /// Returns the sender address, recovering and caching it on first use.
    ///
    /// A zero-signature transaction reports [`MAX_ADDRESS`] without
    /// touching the curve.
    ///
    /// # Errors
    /// `Error::IllegalState` if unsigned; `Error::Secp256k1Error` if the
    /// signature is inconsistent with the curve.
    pub fn sender(&mut self) -> Result<Address> {
        if let Some(sender) = self.sender {
            return Ok(sender);
        }
        let sender = if self.has_zero_signature() {
            MAX_ADDRESS
        } else {
            let vrs = self
                .vrs
                .ok_or_else(|| Error::IllegalState("Transaction is unsigned".to_string()))?;
            let digest = self.hash(IncludeSignature::Without)?;
            let public = recover(&vrs, &digest)?;
            public_to_address(&public)
        };
        self.sender = Some(sender);
        Ok(sender)
    }

    /// Sets the nonce, clearing any signature and the caches.
    pub fn set_nonce(&mut self, nonce: U256) {
        self.clear_signature();
        self.nonce = nonce;
    }

    fn clear_signature(&mut self) {
        self.vrs = None;
        self.hash_with = None;
        self.sender = None;
    }

    /// What this transaction does.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The sender's transaction count.
    #[must_use]
    #[inline]
    pub fn nonce(&self) -> U256 {
        self.nonce
    }

    /// The amount transferred (or endowed, for contract creation), in the
    /// ledger's smallest unit.
    #[must_use]
    #[inline]
    pub fn value(&self) -> U256 {
        self.value
    }

    /// The price paid per unit of gas.
    #[must_use]
    #[inline]
    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    /// The gas limit, paid for from the sender's account.
    #[must_use]
    #[inline]
    pub fn gas(&self) -> U256 {
        self.gas
    }

    /// The destination address. Meaningless for contract creation.
    #[must_use]
    #[inline]
    pub fn to(&self) -> Address {
        self.to
    }

    /// The call data, or the init code for contract creation.
    #[must_use]
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The chain id, or [`NO_CHAIN_ID`] when unprotected.
    #[must_use]
    #[inline]
    pub fn chain_id(&self) -> i64 {
        self.chain_id
    }

    /// The signature, if set.
    #[must_use]
    #[inline]
    pub fn signature(&self) -> Option<&Signature> {
        self.vrs.as_ref()
    }

    /// Returns true if the transaction is signed.
    #[must_use]
    #[inline]
    pub fn has_signature(&self) -> bool {
        self.vrs.is_some()
    }

    /// Returns true if the transaction carries the zero-signature
    /// sentinel.
    #[must_use]
    #[inline]
    pub fn has_zero_signature(&self) -> bool {
        self.vrs.as_ref().is_some_and(Signature::is_zero)
    }

    /// Returns true if the transaction binds a chain id into its signed
    /// hash (EIP-155).
    #[must_use]
    #[inline]
    pub fn is_replay_protected(&self) -> bool {
        self.chain_id != NO_CHAIN_ID
    }
}
