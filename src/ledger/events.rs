//! Ledger events
//!
//! Events are published only after an operation fully succeeds, in the order
//! the state changes were applied.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use web3::types::{Address, U256};

use crate::utxo::{AssetId, CommitmentHash, Owner};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    Deposited {
        payer: Address,
        asset: AssetId,
        amount: U256,
    },
    CommitmentCreated {
        asset: AssetId,
        hash: CommitmentHash,
        owner: Owner,
    },
    CommitmentRemoved {
        asset: AssetId,
        hash: CommitmentHash,
        prior_owner: Owner,
    },
    TransactionSpent {
        asset: AssetId,
        input_hashes: Vec<CommitmentHash>,
        output_hashes: Vec<CommitmentHash>,
        fee: U256,
    },
    EmergencySwept {
        operator: Address,
        asset: AssetId,
        amount: U256,
    },
}

/// Consumer of ledger events
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &LedgerEvent);
}

/// Writes each event to the log as a JSON line
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: &LedgerEvent) {
        match serde_json::to_string(event) {
            Ok(json) => log::info!("ledger event {}", json),
            Err(e) => log::error!("Failed to encode ledger event {:?}: {}", event, e),
        }
    }
}

/// Keeps every published event in memory
#[derive(Debug, Default)]
pub struct EventLog {
    events: RwLock<Vec<LedgerEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.events.write())
    }
}

impl EventSink for EventLog {
    fn publish(&self, event: &LedgerEvent) {
        self.events.write().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use web3::types::H256;

    #[test]
    fn test_event_json_shape() {
        let event = LedgerEvent::CommitmentCreated {
            asset: Address::from_low_u64_be(1),
            hash: H256::from_low_u64_be(2),
            owner: Address::from_low_u64_be(3),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "commitment_created");
        assert_eq!(
            json["owner"],
            "0x0000000000000000000000000000000000000003"
        );

        let decoded: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_event_log_drain() {
        let log = EventLog::new();
        log.publish(&LedgerEvent::Deposited {
            payer: Address::from_low_u64_be(1),
            asset: Address::from_low_u64_be(2),
            amount: U256::from(5u64),
        });
        assert_eq!(log.len(), 1);
        assert_eq!(log.drain().len(), 1);
        assert!(log.is_empty());
    }
}
