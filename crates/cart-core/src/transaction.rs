//! # Transfer Transactions
//!
//! Compiles a payment request into a legacy-format ledger transaction.
//!
//! Wire layout:
//!
//! ```text
//! transaction = shortvec(signatures) || signature[64]*  || message
//! message     = header[3] || shortvec(keys) || key[32]* || blockhash[32]
//!               || shortvec(instructions) || instruction*
//! instruction = program_index[1] || shortvec(accounts) || index[1]*
//!               || shortvec(data) || data
//! ```
//!
//! Signature slots are zero-filled here; the signer fills them in.

use crate::address::{Address, SYSTEM_PROGRAM_ID};
use crate::error::{PaymentError, PaymentResult};
use crate::payment::PaymentRequest;
use std::str::FromStr;

/// Signature length in bytes
pub const SIGNATURE_LEN: usize = 64;

/// Maximum serialized transaction size accepted by the ledger
pub const PACKET_DATA_SIZE: usize = 1232;

/// System program instruction index for `Transfer`
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// A recent blockhash, base58 on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Blockhash {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| PaymentError::NetworkError(format!("malformed blockhash {}: {}", s, e)))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            PaymentError::NetworkError(format!("malformed blockhash {}: wrong length", s))
        })?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for Blockhash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

/// Account reference within an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// An instruction before account indices are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    /// System program transfer of `lamports` from `from` to `to`
    pub fn transfer(from: Address, to: Address, lamports: u64) -> Self {
        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
        data.extend_from_slice(&lamports.to_le_bytes());

        Self {
            program_id: SYSTEM_PROGRAM_ID,
            accounts: vec![
                AccountMeta {
                    address: from,
                    is_signer: true,
                    is_writable: true,
                },
                AccountMeta {
                    address: to,
                    is_signer: false,
                    is_writable: true,
                },
            ],
            data,
        }
    }

    /// Memo program instruction carrying UTF-8 text
    pub fn memo(text: &str) -> PaymentResult<Self> {
        Ok(Self {
            program_id: Address::memo_program()?,
            accounts: Vec::new(),
            data: text.as_bytes().to_vec(),
        })
    }
}

/// Message header counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// Instruction with account indices resolved against the message key list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// A compiled legacy message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Address>,
    pub recent_blockhash: Blockhash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile instructions with `payer` as the first (fee-paying) signer
    pub fn compile(
        payer: Address,
        instructions: &[Instruction],
        recent_blockhash: Blockhash,
    ) -> PaymentResult<Self> {
        // insertion-ordered, flags merged across duplicates
        let mut metas: Vec<AccountMeta> = vec![AccountMeta {
            address: payer,
            is_signer: true,
            is_writable: true,
        }];
        let mut merge = |meta: AccountMeta| match metas.iter_mut().find(|m| m.address == meta.address) {
            Some(existing) => {
                existing.is_signer |= meta.is_signer;
                existing.is_writable |= meta.is_writable;
            }
            None => metas.push(meta),
        };
        for ix in instructions {
            for account in &ix.accounts {
                merge(*account);
            }
            merge(AccountMeta {
                address: ix.program_id,
                is_signer: false,
                is_writable: false,
            });
        }

        let group = |signer: bool, writable: bool| {
            metas
                .iter()
                .filter(move |m| m.is_signer == signer && m.is_writable == writable)
                .copied()
        };
        let ordered: Vec<AccountMeta> = group(true, true)
            .chain(group(true, false))
            .chain(group(false, true))
            .chain(group(false, false))
            .collect();

        if ordered.len() > u8::MAX as usize {
            return Err(PaymentError::InvalidRequest(
                "too many accounts in transaction".to_string(),
            ));
        }

        let header = MessageHeader {
            num_required_signatures: ordered.iter().filter(|m| m.is_signer).count() as u8,
            num_readonly_signed_accounts: ordered
                .iter()
                .filter(|m| m.is_signer && !m.is_writable)
                .count() as u8,
            num_readonly_unsigned_accounts: ordered
                .iter()
                .filter(|m| !m.is_signer && !m.is_writable)
                .count() as u8,
        };
        let account_keys: Vec<Address> = ordered.iter().map(|m| m.address).collect();

        let index_of = |address: &Address| -> u8 {
            // every address was merged above, so the position always exists
            account_keys
                .iter()
                .position(|k| k == address)
                .unwrap_or_default() as u8
        };

        let compiled = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|a| index_of(&a.address)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    /// Serialized message; this is what signers sign
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![
            self.header.num_required_signatures,
            self.header.num_readonly_signed_accounts,
            self.header.num_readonly_unsigned_accounts,
        ];
        encode_length(&mut out, self.account_keys.len());
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(self.recent_blockhash.as_bytes());
        encode_length(&mut out, self.instructions.len());
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_length(&mut out, ix.accounts.len());
            out.extend_from_slice(&ix.accounts);
            encode_length(&mut out, ix.data.len());
            out.extend_from_slice(&ix.data);
        }
        out
    }
}

/// A transaction awaiting signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub fee_payer: Address,
    pub message: Message,
}

impl UnsignedTransaction {
    /// Single transfer (plus optional memo) for a payment request
    pub fn transfer(
        payer: Address,
        request: &PaymentRequest,
        recent_blockhash: Blockhash,
    ) -> PaymentResult<Self> {
        let mut instructions = vec![Instruction::transfer(
            payer,
            request.recipient,
            request.amount.get(),
        )];
        if let Some(memo) = &request.memo {
            instructions.push(Instruction::memo(memo)?);
        }

        let tx = Self {
            fee_payer: payer,
            message: Message::compile(payer, &instructions, recent_blockhash)?,
        };

        let size = tx.to_bytes().len();
        if size > PACKET_DATA_SIZE {
            return Err(PaymentError::InvalidRequest(format!(
                "transaction is {} bytes, limit is {}",
                size, PACKET_DATA_SIZE
            )));
        }
        Ok(tx)
    }

    pub fn message_bytes(&self) -> Vec<u8> {
        self.message.to_bytes()
    }

    /// Wire bytes with zero-filled signature slots
    pub fn to_bytes(&self) -> Vec<u8> {
        let signatures = self.message.header.num_required_signatures as usize;
        let mut out = Vec::new();
        encode_length(&mut out, signatures);
        out.resize(out.len() + signatures * SIGNATURE_LEN, 0);
        out.extend_from_slice(&self.message_bytes());
        out
    }
}

/// Signed wire transaction returned by a signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    bytes: Vec<u8>,
}

impl SignedTransaction {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// First (fee payer) signature, base58, if present and non-zero
    pub fn first_signature(&self) -> Option<String> {
        let (count, offset) = decode_length(&self.bytes)?;
        if count == 0 {
            return None;
        }
        let sig = self.bytes.get(offset..offset + SIGNATURE_LEN)?;
        if sig.iter().all(|b| *b == 0) {
            return None;
        }
        Some(bs58::encode(sig).into_string())
    }

    pub fn is_signed(&self) -> bool {
        self.first_signature().is_some()
    }
}

/// Compact-u16 length prefix
pub fn encode_length(out: &mut Vec<u8>, len: usize) {
    let mut rem = len;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            break;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

/// Decode a compact-u16 prefix; returns (value, bytes consumed)
pub fn decode_length(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut value = 0usize;
    for (i, byte) in bytes.iter().take(3).enumerate() {
        value |= ((byte & 0x7f) as usize) << (i * 7);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}
