#![deny(missing_docs)]
#![deny(unsafe_code)]

/*! # Ethertx

A compact toolkit for canonical transactions on account-based ledgers.
Provides the RLP wire encoding, Keccak-256 content addressing, secp256k1
signing, and signature-based sender recovery, including EIP-155 replay
protection across chain identifiers.

## Usage
```
use ethertx::transaction::{CheckSignature, Transaction};

let raw = hex::decode(
    "f85f800182520894095e7baea6a6c7c4c2dfeb977efac326af552d870a801ba048b55bfa915ac795c431\
     978d8a6a992b628d557da5ff759b307d495a36649353a0efffd310ac743f371de3b9f7f9cb56c0b28ad43\
     601b4ab949f53faa07bd2c804",
)
.unwrap();
let mut tx = Transaction::decode(&raw, CheckSignature::Cheap).unwrap();
assert_eq!(
    hex::encode(tx.sender().unwrap()),
    "0f65fe9276bc9a24ae7083ae28e2660ef72df99e"
);
```

## Security
- Hashing uses the pre-standardization Keccak padding, not FIPS SHA3.
  The two are wire-incompatible; do not substitute one for the other.
- Not intended for consensus validation on its own; gas accounting and
  pool admission belong to a calling layer.
*/

pub mod transaction;
pub mod util;
