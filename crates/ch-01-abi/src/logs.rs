//! # Log Decoding
//!
//! Turns receipt logs into [`ContractEvent`]s.
//!
//! Indexed and non-indexed parameters are read as one positional word list
//! (`topics[1..]` followed by the data words), which works because every
//! parameter of the deed events is a static type.

use crate::decode::{address_from_word, word};
use crate::error::AbiError;
use crate::hash::event_topic;
use shared_types::{Address, ContractEvent, EventKind, H256, U256};

/// A log entry as it appears in a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLog {
    /// Emitting contract.
    pub address: Address,
    /// Topics; `topics[0]` is the event signature hash.
    pub topics: Vec<H256>,
    /// Non-indexed parameters.
    pub data: Vec<u8>,
}

const KNOWN: [EventKind; 5] = [
    EventKind::Paused,
    EventKind::Unpaused,
    EventKind::Transfer,
    EventKind::Approval,
    EventKind::SolutionAdded,
];

/// Identify the event kind from `topics[0]`.
#[must_use]
pub fn kind_of(log: &RawLog) -> Option<EventKind> {
    let topic0 = log.topics.first()?;
    KNOWN
        .into_iter()
        .find(|kind| kind.signature().map(event_topic).as_ref() == Some(topic0))
}

/// Decode a log emitted by a deed contract.
///
/// # Returns
///
/// - `Ok(Some(event))` - A known event
/// - `Ok(None)` - Anonymous log or an event these contracts do not define
/// - `Err(_)` - Known signature but malformed parameters
pub fn decode_log(log: &RawLog) -> Result<Option<ContractEvent>, AbiError> {
    let Some(kind) = kind_of(log) else {
        return Ok(None);
    };

    let mut words: Vec<&[u8]> = log.topics[1..].iter().map(H256::as_bytes).collect();
    for index in 0..log.data.len() / crate::WORD {
        words.push(word(&log.data, index)?);
    }

    let arg = |i: usize| {
        words.get(i).copied().ok_or(AbiError::ShortData {
            needed: (i + 1) * crate::WORD,
            available: words.len() * crate::WORD,
        })
    };
    let address = |i: usize| arg(i).and_then(address_from_word);
    let uint = |i: usize| arg(i).map(U256::from_big_endian);

    let event = match kind {
        EventKind::Paused => ContractEvent::Paused {
            account: address(0)?,
        },
        EventKind::Unpaused => ContractEvent::Unpaused {
            account: address(0)?,
        },
        EventKind::Transfer => ContractEvent::Transfer {
            from: address(0)?,
            to: address(1)?,
            token_id: uint(2)?,
        },
        EventKind::Approval => ContractEvent::Approval {
            owner: address(0)?,
            approved: address(1)?,
            token_id: uint(2)?,
        },
        EventKind::SolutionAdded => ContractEvent::SolutionAdded {
            index: uint(0)?,
            solver: address(1)?,
        },
        EventKind::All => return Ok(None),
    };

    Ok(Some(event))
}
