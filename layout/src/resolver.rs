use anyhow::{Context, Result};

use model::{split_joint_key, ColumnLayout, ConcurrentStep, Step, Task};
use syntax::JOINT_DELIM;

use crate::Error;

/// The steps one actor key contributes to a cell.
#[derive(Debug, Clone, Copy)]
pub struct Series<'a> {
    pub actor_key: &'a str,
    pub steps: &'a [Step],
}

/// One table cell in a division's row.
/// Empty cells are placeholders for columns with nothing to do.
#[derive(Debug, Clone)]
pub struct Cell<'a> {
    /// Index of the first column this cell covers
    pub anchor: usize,
    pub colspan: usize,
    pub series: Vec<Series<'a>>,
}

impl Cell<'_> {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// true if this cell merges more than one column.
    pub fn is_merged(&self) -> bool {
        self.colspan > 1
    }
}

/// A division resolved into one row of cells.
#[derive(Debug, Clone)]
pub struct DivisionLayout<'a> {
    /// Cells in column order; together they cover every column of the task exactly once.
    pub cells: Vec<Cell<'a>>,
    /// Original column index -> position once merged columns are collapsed.
    /// Only used to decide where borders go.
    pub remap: Vec<usize>,
    pub simo: bool,
}

impl DivisionLayout<'_> {
    pub fn num_cols(&self) -> usize {
        self.remap.len()
    }
}

/// Who has claimed a column within one division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    Free,
    Simple,
    /// index of the joint group in the division
    Joint(usize),
}

/// Resolve every division of `task`, in order.
pub fn resolve_task<'a>(task: &'a Task, layout: &ColumnLayout) -> Result<Vec<DivisionLayout<'a>>> {
    task.concurrent_steps()
        .iter()
        .enumerate()
        .map(|(i, division)| {
            resolve_division(division, task, layout)
                .with_context(|| format!("while laying out division {} of task \"{}\"", i + 1, task.title))
        })
        .collect()
}

/// Assign the series of one division to the columns of `task`.
///
/// Simple actors go in their own column. Joint keys ("EV1 + EV2") must cover
/// adjacent columns, which are merged into a single cell anchored at the
/// leftmost one. A column may not be claimed by more than one joint group,
/// or by both a joint group and a simple actor; several simple actors that
/// share a column end up in the same cell.
pub fn resolve_division<'a>(
    division: &'a ConcurrentStep,
    task: &Task,
    layout: &ColumnLayout,
) -> Result<DivisionLayout<'a>> {
    let num_cols = task.num_cols();
    let index_of = |actor: &str| -> Result<usize> {
        let key = layout.column_key(actor)?;
        task.column_index(key)
            .ok_or_else(|| Error::ColumnNotInTask(key.to_owned(), task.title.clone()).into())
    };

    let (simple, joint): (Vec<_>, Vec<_>) =
        division.iter().partition(|(key, _)| !key.contains(JOINT_DELIM));

    let mut claims = vec![Claim::Free; num_cols];
    let mut simple_cols: Vec<(usize, Series)> = Vec::with_capacity(simple.len());

    for (actor, steps) in simple {
        let idx = index_of(actor)?;
        claims[idx] = Claim::Simple;
        simple_cols.push((idx, Series { actor_key: actor, steps }));
    }

    // (first, last, series)
    let mut spans: Vec<(usize, usize, Series)> = Vec::with_capacity(joint.len());
    for (group, (key, steps)) in joint.into_iter().enumerate() {
        let mut indexed = split_joint_key(key)
            .map(|actor| Ok((index_of(actor)?, actor)))
            .collect::<Result<Vec<_>>>()?;
        indexed.sort_by_key(|(idx, _)| *idx);

        let mut duplicates: Vec<&str> = Vec::new();
        for (idx, actor) in &indexed {
            match claims[*idx] {
                Claim::Free => claims[*idx] = Claim::Joint(group),
                Claim::Joint(g) if g == group => {}
                _ => duplicates.push(*actor),
            }
        }
        if !duplicates.is_empty() {
            return Err(Error::DuplicateActor(duplicates.join(", ")).into());
        }

        let mut indices: Vec<usize> = indexed.iter().map(|(idx, _)| *idx).collect();
        indices.dedup();
        if indices.windows(2).any(|w| w[1] != w[0] + 1) {
            return Err(Error::NonAdjacentColumns(key.to_owned(), indices).into());
        }
        // split_joint_key always yields at least one item:
        let (first, last) = (indices[0], indices[indices.len() - 1]);
        spans.push((first, last, Series { actor_key: key, steps }));
    }
    spans.sort_by_key(|(first, _, _)| *first);

    let mut cells = Vec::with_capacity(num_cols);
    let mut col = 0;
    while col < num_cols {
        if let Some((first, last, series)) = spans.iter().find(|(first, _, _)| *first == col) {
            cells.push(Cell {
                anchor: *first,
                colspan: last - first + 1,
                series: vec![*series],
            });
            col = last + 1;
        } else {
            let series = simple_cols
                .iter()
                .filter(|(idx, _)| *idx == col)
                .map(|(_, series)| *series)
                .collect();
            cells.push(Cell {
                anchor: col,
                colspan: 1,
                series,
            });
            col += 1;
        }
    }

    let bounds: Vec<(usize, usize)> = spans.iter().map(|(f, l, _)| (*f, *l)).collect();
    let remap = column_remap(num_cols, &bounds);

    log::trace!(
        "division [{}] -> {} cells",
        division.actor_keys().collect::<Vec<_>>().join(", "),
        cells.len()
    );

    Ok(DivisionLayout {
        cells,
        remap,
        simo: division.is_simo(),
    })
}

/// Columns inside a span map to the span's anchor; columns after it shift
/// left by `colspan - 1`. `spans` must be sorted and disjoint.
fn column_remap(num_cols: usize, spans: &[(usize, usize)]) -> Vec<usize> {
    let mut remap = Vec::with_capacity(num_cols);
    let mut collapsed = 0;
    let mut col = 0;
    while col < num_cols {
        match spans.iter().find(|(first, _)| *first == col) {
            Some((first, last)) => {
                let anchor = col - collapsed;
                for _ in *first..=*last {
                    remap.push(anchor);
                }
                collapsed += last - first;
                col = last + 1;
            }
            None => {
                remap.push(col - collapsed);
                col += 1;
            }
        }
    }
    remap
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    use model::{Actor, Diagnostics, TaskInvocation};

    fn actors(roles: &[&str]) -> Vec<Actor> {
        roles
            .iter()
            .map(|r| Actor {
                role: r.to_string(),
                name: None,
            })
            .collect()
    }

    fn task(text: &str, layout: &ColumnLayout) -> Result<Task> {
        let bindings = BTreeMap::new();
        let invocation = TaskInvocation {
            file: "test.yml",
            roles: &bindings,
        };
        let def = syntax::parse_task(text)?;
        Task::create(def, invocation, layout, &mut Diagnostics::default())
    }

    /// A task whose first division puts EV1, EV2, EV3 in columns 0, 1, 2.
    fn three_columns(rest: &str) -> String {
        format!(
            "title: Walk\nsteps:\n  - simo:\n      EV1: a\n      EV2: b\n      EV3: c\n{rest}"
        )
    }

    #[test]
    fn test_joint_adjacent() -> Result<()> {
        let layout = ColumnLayout::identity();
        let task = task(&three_columns("  - EV1 + EV2: lift\n"), &layout)?;
        assert_eq!(task.columns(), &["EV1", "EV2", "EV3"]);

        let row = resolve_division(&task.concurrent_steps()[1], &task, &layout)?;
        assert_eq!(row.cells.len(), 2);
        assert_eq!(row.cells[0].anchor, 0);
        assert_eq!(row.cells[0].colspan, 2);
        assert_eq!(row.cells[0].series[0].actor_key, "EV1 + EV2");
        assert_eq!(row.cells[0].series[0].steps[0].text, "lift");
        // EV3 has nothing to do:
        assert_eq!(row.cells[1].anchor, 2);
        assert!(row.cells[1].is_empty());
        assert_eq!(row.remap, vec![0, 0, 1]);
        Ok(())
    }

    #[test]
    fn test_joint_not_adjacent() -> Result<()> {
        let layout = ColumnLayout::identity();
        let task = task(&three_columns("  - EV1 + EV3: lift\n"), &layout)?;
        let err = resolve_division(&task.concurrent_steps()[1], &task, &layout).unwrap_err();
        assert!(err.to_string().contains("When joining actors, columns must be adjacent"));
        // whole-task resolution fails the same way:
        assert!(resolve_task(&task, &layout).is_err());
        Ok(())
    }

    #[test]
    fn test_joint_order_does_not_matter() -> Result<()> {
        let layout = ColumnLayout::identity();
        let task = task(&three_columns("  - EV3 + EV2: lift\n"), &layout)?;
        let row = resolve_division(&task.concurrent_steps()[1], &task, &layout)?;
        assert_eq!(row.cells[0].anchor, 0);
        assert!(row.cells[0].is_empty());
        assert_eq!(row.cells[1].anchor, 1);
        assert_eq!(row.cells[1].colspan, 2);
        assert!(row.cells[1].is_merged());
        assert_eq!(row.remap, vec![0, 1, 1]);
        Ok(())
    }

    #[test]
    fn test_duplicate_actor_in_joint_and_simple() -> Result<()> {
        let layout = ColumnLayout::identity();
        let text = "
title: Walk
steps:
  - simo:
      EV1 + EV2: lift
      EV2: hold
";
        let task = task(text, &layout)?;
        let err = resolve_division(&task.concurrent_steps()[0], &task, &layout).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("EV2"), "{msg}");
        assert!(!msg.contains("EV1"), "{msg}");
        Ok(())
    }

    #[test]
    fn test_duplicate_actor_in_two_groups() -> Result<()> {
        let layout = ColumnLayout::identity();
        let task = task(
            &three_columns("  - simo:\n      EV1 + EV2: lift\n      EV2 + EV3: lower\n"),
            &layout,
        )?;
        let err = resolve_division(&task.concurrent_steps()[1], &task, &layout).unwrap_err();
        assert!(err.to_string().contains("EV2"));
        Ok(())
    }

    #[test]
    fn test_placeholders_and_order() -> Result<()> {
        let layout = ColumnLayout::create(&[], &actors(&["IV", "EV1", "EV2"]))?;
        let text = "
title: Walk
steps:
  - simo:
      EV2: second
      IV: first
  - EV1: alone
";
        let task = task(text, &layout)?;
        let rows = resolve_task(&task, &layout)?;
        assert_eq!(rows.len(), 2);

        // cells follow column order, not source order:
        let keys: Vec<Vec<&str>> = rows[0]
            .cells
            .iter()
            .map(|c| c.series.iter().map(|s| s.actor_key).collect())
            .collect();
        assert_eq!(keys, vec![vec!["IV"], vec![], vec!["EV2"]]);
        assert!(rows[0].simo);

        assert_eq!(rows[1].cells.len(), 3);
        assert!(rows[1].cells[0].is_empty());
        assert!(!rows[1].cells[1].is_empty());
        assert_eq!(rows[1].remap, vec![0, 1, 2]);
        assert_eq!(rows[1].num_cols(), 3);
        Ok(())
    }

    #[test]
    fn test_shared_column() -> Result<()> {
        let columns: Vec<syntax::ast::ColumnDef> = serde_yaml::from_str(
            "[{key: IV, actors: [IV, '*']}, {key: EV, actors: [EV1, EV2]}]",
        )?;
        let layout = ColumnLayout::create(&columns, &actors(&["IV", "EV1", "EV2"]))?;
        let text = "
title: Walk
steps:
  - simo:
      EV1: left
      EV2: right
      MCC: call
";
        let task = task(text, &layout)?;
        let row = resolve_division(&task.concurrent_steps()[0], &task, &layout)?;
        assert_eq!(row.cells.len(), 2);
        // MCC falls back to the wildcard column:
        assert_eq!(row.cells[0].series[0].actor_key, "MCC");
        // two simple actors in one column share a cell, in source order:
        let shared: Vec<&str> = row.cells[1].series.iter().map(|s| s.actor_key).collect();
        assert_eq!(shared, vec!["EV1", "EV2"]);
        Ok(())
    }

    #[test]
    fn test_column_remap() {
        assert_eq!(column_remap(4, &[]), vec![0, 1, 2, 3]);
        assert_eq!(column_remap(5, &[(1, 2), (3, 4)]), vec![0, 1, 1, 2, 2]);
        assert_eq!(column_remap(5, &[(0, 2)]), vec![0, 0, 0, 1, 2]);
    }
}
