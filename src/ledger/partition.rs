//! Witness index partitioning
//!
//! Input and output witness groups must each cover `[0, len)` exactly once.

use crate::error::{LedgerError, LedgerResult};

/// Check that `groups` partition the positions `0..len`.
///
/// Totals are compared first so mismatched coverage fails before any
/// per-index work.
pub fn validate_partition<'a, I>(groups: I, len: usize) -> LedgerResult<()>
where
    I: IntoIterator<Item = &'a [usize]> + Clone,
{
    let covered: usize = groups.clone().into_iter().map(<[usize]>::len).sum();
    if covered != len {
        return Err(LedgerError::IncompleteIndexCoverage { expected: len, covered });
    }

    let mut seen = vec![false; len];
    for group in groups {
        if group.is_empty() {
            return Err(LedgerError::EmptyWitnessGroup);
        }
        for &index in group {
            if index >= len {
                return Err(LedgerError::IndexOutOfBounds { index, len });
            }
            if seen[index] {
                return Err(LedgerError::DuplicateIndex(index));
            }
            seen[index] = true;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(groups: &[Vec<usize>], len: usize) -> LedgerResult<()> {
        validate_partition(groups.iter().map(Vec::as_slice), len)
    }

    #[test]
    fn test_exact_partitions() {
        assert!(check(&[vec![0]], 1).is_ok());
        assert!(check(&[vec![2, 0], vec![1]], 3).is_ok());
        assert!(check(&[vec![1], vec![0], vec![2]], 3).is_ok());
    }

    #[test]
    fn test_coverage_mismatch() {
        assert!(matches!(
            check(&[vec![0]], 2),
            Err(LedgerError::IncompleteIndexCoverage { expected: 2, covered: 1 })
        ));
        assert!(matches!(
            check(&[vec![0, 1], vec![2]], 2),
            Err(LedgerError::IncompleteIndexCoverage { expected: 2, covered: 3 })
        ));
        assert!(matches!(
            check(&[], 1),
            Err(LedgerError::IncompleteIndexCoverage { expected: 1, covered: 0 })
        ));
    }

    #[test]
    fn test_duplicate_and_out_of_bounds() {
        assert!(matches!(
            check(&[vec![0], vec![0]], 2),
            Err(LedgerError::DuplicateIndex(0))
        ));
        assert!(matches!(
            check(&[vec![0, 2]], 2),
            Err(LedgerError::IndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_empty_group_rejected() {
        assert!(matches!(
            check(&[vec![0, 1], vec![]], 2),
            Err(LedgerError::EmptyWitnessGroup)
        ));
    }
}
