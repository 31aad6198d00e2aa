//! # Transaction Signing
//!
//! Development nodes sign with their own unlocked accounts
//! (`eth_sendTransaction`). Hosted providers such as Infura hold no keys, so
//! transactions are built as EIP-155 legacy transactions, signed locally
//! and sent with `eth_sendRawTransaction`.

use crate::client::RpcClient;
use crate::error::{RpcError, WalletError};
use crate::types::{BlockTag, CallRequest};
use crate::wallet::HdWallet;
use ch_01_abi::keccak256;
use k256::ecdsa::SigningKey;
use rlp::RlpStream;
use shared_types::{Address, TxHash, U256};
use std::sync::Arc;
use tracing::debug;

/// An unsigned EIP-155 legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: U256,
    pub gas_price: U256,
    pub gas: U256,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl LegacyTransaction {
    fn rlp_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas);
        stream.append(&self.to);
        stream.append(&self.value);
        stream.append(&self.data);
    }

    /// Hash signed over: `keccak256(rlp([.., chainId, 0, 0]))`.
    #[must_use]
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        self.rlp_fields(&mut stream);
        stream.append(&self.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        keccak256(&stream.out()).to_fixed_bytes()
    }

    /// Sign and RLP-encode, ready for `eth_sendRawTransaction`.
    pub fn sign(&self, key: &SigningKey) -> Result<Vec<u8>, WalletError> {
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(&self.signing_hash())
            .map_err(|e| WalletError::Signing(e.to_string()))?;

        let sig_bytes = signature.to_bytes();
        let r = U256::from_big_endian(&sig_bytes[..32]);
        let s = U256::from_big_endian(&sig_bytes[32..]);
        let v = u64::from(recovery_id.to_byte()) + self.chain_id * 2 + 35;

        let mut stream = RlpStream::new_list(9);
        self.rlp_fields(&mut stream);
        stream.append(&v);
        stream.append(&r);
        stream.append(&s);
        Ok(stream.out().to_vec())
    }
}

/// How transactions get signed.
#[derive(Debug, Clone)]
pub enum Signer {
    /// The node signs with an unlocked account.
    NodeManaged,
    /// Keys derived from a mnemonic, held in process.
    Local(Arc<HdWallet>),
}

impl Signer {
    /// Submit a state-mutating call from `request.from`.
    ///
    /// The gas limit is estimated when `request.gas` is unset.
    pub async fn send(&self, client: &RpcClient, request: CallRequest) -> Result<TxHash, RpcError> {
        let from = request
            .from
            .ok_or(RpcError::MissingSender)?;

        let gas = match request.gas {
            Some(gas) => gas,
            None => client.estimate_gas(&request).await?,
        };

        match self {
            Self::NodeManaged => {
                let request = CallRequest {
                    gas: Some(gas),
                    ..request
                };
                client.send_transaction(&request).await
            }
            Self::Local(wallet) => {
                let key = wallet.key_for(&from).ok_or(RpcError::UnknownAccount(from))?;

                let tx = LegacyTransaction {
                    nonce: client.transaction_count(&from, BlockTag::Pending).await?,
                    gas_price: match request.gas_price {
                        Some(price) => price,
                        None => client.gas_price().await?,
                    },
                    gas,
                    to: request.to,
                    value: U256::zero(),
                    data: request.data.0,
                    chain_id: client.chain_id().await?,
                };
                debug!(from = ?from, nonce = %tx.nonce, chain_id = tx.chain_id, "Signing transaction locally");

                let raw = tx.sign(key)?;
                client.send_raw_transaction(&raw).await
            }
        }
    }

    /// Accounts this signer can sign for; `None` when the node decides.
    #[must_use]
    pub fn local_accounts(&self) -> Option<Vec<Address>> {
        match self {
            Self::NodeManaged => None,
            Self::Local(wallet) => Some(wallet.addresses()),
        }
    }
}
