use crate::Cell;

/// Running top-level step numbers, one counter per column.
///
/// Call `reset` at the start of every task; numbering restarts at 1.
#[derive(Debug, Clone, Default)]
pub struct StepCounter {
    counts: Vec<usize>,
}

impl StepCounter {
    /// Start over for a task with `num_cols` columns.
    pub fn reset(&mut self, num_cols: usize) {
        self.counts.clear();
        self.counts.resize(num_cols, 0);
    }

    /// Number for the next step in `cell`.
    ///
    /// A merged cell continues from the furthest-along column it covers,
    /// and every covered column moves to the new number.
    pub fn next(&mut self, cell: &Cell) -> usize {
        let end = (cell.anchor + cell.colspan).min(self.counts.len());
        let covered = &mut self.counts[cell.anchor.min(end)..end];
        let n = covered.iter().copied().max().unwrap_or(0) + 1;
        covered.iter_mut().for_each(|c| *c = n);
        n
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cell(anchor: usize, colspan: usize) -> Cell<'static> {
        Cell {
            anchor,
            colspan,
            series: Vec::new(),
        }
    }

    fn counter(num_cols: usize) -> StepCounter {
        let mut counter = StepCounter::default();
        counter.reset(num_cols);
        counter
    }

    #[test]
    fn test_per_column() {
        let mut counter = counter(3);
        assert_eq!(counter.next(&cell(0, 1)), 1);
        assert_eq!(counter.next(&cell(0, 1)), 2);
        assert_eq!(counter.next(&cell(2, 1)), 1);
        assert_eq!(counter.next(&cell(1, 1)), 1);
    }

    #[test]
    fn test_merged_cells() {
        let mut counter = counter(3);
        counter.next(&cell(0, 1));
        counter.next(&cell(0, 1));
        counter.next(&cell(1, 1));
        // EV1 + EV2 continues from EV1, the furthest along:
        assert_eq!(counter.next(&cell(0, 2)), 3);
        // and both columns carry on from there
        assert_eq!(counter.next(&cell(1, 1)), 4);
        assert_eq!(counter.next(&cell(0, 1)), 4);
        assert_eq!(counter.next(&cell(2, 1)), 1);
    }

    #[test]
    fn test_reset() {
        let mut counter = counter(2);
        counter.next(&cell(1, 1));
        counter.next(&cell(1, 1));
        counter.reset(4);
        assert_eq!(counter.next(&cell(1, 1)), 1);
        assert_eq!(counter.next(&cell(3, 1)), 1);
    }

    #[test]
    fn test_no_columns() {
        let mut counter = StepCounter::default();
        assert_eq!(counter.next(&cell(0, 1)), 1);
    }
}
