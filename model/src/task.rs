use std::collections::BTreeMap;

use anyhow::{Context, Result};

use syntax::ast::TaskDef;
use util::{HashMap, Hasher, IndexSet};

use crate::{split_joint_key, ColumnLayout, ConcurrentStep, Diagnostics, Duration, TaskRoles};

/// How a procedure includes a task file.
#[derive(Debug, Clone, Copy)]
pub struct TaskInvocation<'a> {
    /// Name of the task file, for error messages
    pub file: &'a str,
    /// role name -> actor id
    pub roles: &'a BTreeMap<String, String>,
}

/// A titled unit of work: an ordered list of divisions, plus the columns
/// needed to display them.
///
/// Columns are computed once, when the task is created, and never change.
#[derive(Debug, Clone)]
pub struct Task {
    pub title: String,
    /// File (or url) this task was loaded from
    pub file: String,
    pub duration: Duration,
    roles: TaskRoles,
    concurrent_steps: Vec<ConcurrentStep>,
    columns: Vec<String>,
    column_indexes: HashMap<String, usize>,
}

impl Task {
    /// Create a task from its parse tree.
    ///
    /// Roles are bound with `invocation`, and actors are mapped to display
    /// columns with `layout`; column order follows the layout's declared
    /// order if it has one, otherwise the order actors first appear.
    pub fn create(
        def: TaskDef,
        invocation: TaskInvocation,
        layout: &ColumnLayout,
        diags: &mut Diagnostics,
    ) -> Result<Self> {
        let roles = TaskRoles::create(def.roles, invocation.roles, invocation.file, diags)?;

        let duration = match &def.duration {
            Some(d) => Duration::from_def(d, diags),
            None => {
                if roles.is_empty() {
                    diags.warn(format!(
                        "Task \"{}\" has no duration; using 00:00",
                        def.title
                    ));
                }
                roles
                    .iter()
                    .map(|r| r.duration.total_seconds())
                    .max()
                    .map(Duration::from_seconds)
                    .unwrap_or_default()
            }
        };

        let concurrent_steps = def
            .steps
            .into_iter()
            .enumerate()
            .map(|(i, division)| {
                ConcurrentStep::create(division, &roles)
                    .with_context(|| format!("while creating division {} of task \"{}\"", i + 1, def.title))
            })
            .collect::<Result<Vec<_>>>()?;

        let columns = derive_columns(&concurrent_steps, layout)
            .with_context(|| format!("while assigning columns for task \"{}\"", def.title))?;
        let mut column_indexes = HashMap::with_capacity_and_hasher(columns.len(), Hasher::default());
        for (idx, key) in columns.iter().enumerate() {
            column_indexes.insert(key.clone(), idx);
        }

        log::debug!(
            "Task \"{}\" has {} divisions in columns [{}]",
            def.title,
            concurrent_steps.len(),
            columns.join(", ")
        );

        Ok(Self {
            title: def.title,
            file: invocation.file.to_owned(),
            duration,
            roles,
            concurrent_steps,
            columns,
            column_indexes,
        })
    }

    /// Column keys used by this task, in display order.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Zero-based position of the column with the given key.
    #[inline]
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.column_indexes.get(key).copied()
    }

    /// Map of column key -> position.
    #[inline]
    pub fn column_indexes(&self) -> &HashMap<String, usize> {
        &self.column_indexes
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn concurrent_steps(&self) -> &[ConcurrentStep] {
        &self.concurrent_steps
    }

    #[inline]
    pub fn roles(&self) -> &TaskRoles {
        &self.roles
    }
}

/// Collect the distinct column keys of every actor in every division.
fn derive_columns(divisions: &[ConcurrentStep], layout: &ColumnLayout) -> Result<Vec<String>> {
    let mut seen: IndexSet<String> = IndexSet::with_capacity_and_hasher(8, Hasher::default());
    for division in divisions {
        for key in division.actor_keys() {
            for actor in split_joint_key(key) {
                seen.insert(layout.column_key(actor)?.to_owned());
            }
        }
    }

    match layout.ordered_keys() {
        Some(keys) => Ok(keys
            .filter(|k| seen.contains(*k))
            .map(str::to_owned)
            .collect()),
        None => Ok(seen.into_iter().collect()),
    }
}
