//! Per-recording class balancing.
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::error::BalanceError;
use crate::table::{EpochTable, NON_SEIZURE, SEIZURE};

/// Downsample non-seizure epochs to the seizure-epoch count.
///
/// Returns `Ok(None)` when `table` holds no seizure epochs.  Otherwise the
/// result has every seizure epoch (in table order) followed by the same
/// number of non-seizure epochs drawn without replacement by a generator
/// seeded with `seed`.
pub fn balance(table: &EpochTable, seed: u64) -> Result<Option<EpochTable>, BalanceError> {
    let seizure: Vec<usize> = rows_with(table, SEIZURE);
    let clear: Vec<usize> = rows_with(table, NON_SEIZURE);
    let n = seizure.len();
    if n == 0 {
        return Ok(None);
    }
    if clear.len() < n {
        return Err(BalanceError::InsufficientMajority { needed: n, available: clear.len() });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let picked = index::sample(&mut rng, clear.len(), n);
    let order: Vec<usize> = seizure
        .iter()
        .copied()
        .chain(picked.iter().map(|i| clear[i]))
        .collect();
    log::debug!(
        "{}: kept {n} of {} non-seizure epochs",
        table.subject,
        clear.len()
    );
    Ok(Some(table.select(&order)))
}

fn rows_with(table: &EpochTable, label: u8) -> Vec<usize> {
    table
        .labels
        .iter()
        .enumerate()
        .filter(|&(_, &l)| l == label)
        .map(|(i, _)| i)
        .collect()
}
