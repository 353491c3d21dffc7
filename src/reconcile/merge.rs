use std::collections::HashMap;

use crate::ledger::TransactionRecord;

/// Unions local and remote history into one record per hash.
///
/// When both sides carry a hash the remote record wins. Within one input a
/// later duplicate replaces an earlier one. Each hash keeps the position where it first
/// appeared, local hashes first.
pub fn merge(local: &[TransactionRecord], remote: &[TransactionRecord]) -> Vec<TransactionRecord> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(local.len() + remote.len());
    let mut merged: Vec<TransactionRecord> = Vec::with_capacity(local.len() + remote.len());

    for record in local.iter().chain(remote) {
        match positions.get(record.hash.as_str()) {
            Some(&index) => merged[index] = record.clone(),
            None => {
                positions.insert(record.hash.as_str(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    merged
}
