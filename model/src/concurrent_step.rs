use anyhow::Result;

use syntax::ast::DivisionDef;
use syntax::JOINT_DELIM;
use util::IndexMap;

use crate::{Error, Step, TaskRoles};

/// Split a joint key like "EV1 + EV2" into its trimmed actor ids.
/// A simple key yields just itself.
pub fn split_joint_key(key: &str) -> impl Iterator<Item = &str> {
    key.split(JOINT_DELIM).map(str::trim)
}

/// One division of a task: the steps each actor (or joint group of actors)
/// performs during the same slice of time.
///
/// Keys are real actor ids or canonical joint keys ("EV1 + EV2"),
/// kept in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcurrentStep {
    series: IndexMap<String, Vec<Step>>,
    simo: bool,
}

impl ConcurrentStep {
    /// Create a division from its parse tree, resolving role names to actors.
    pub fn create(def: DivisionDef, roles: &TaskRoles) -> Result<Self> {
        let (series_defs, simo) = match def {
            DivisionDef::Single { actor, steps } => (vec![(actor, steps)], false),
            DivisionDef::Simo(series) => (series, true),
        };

        let mut series = IndexMap::default();
        series.reserve(series_defs.len());
        for (guess, step_defs) in series_defs {
            let key = roles.resolve_actor_key(&guess)?;
            if series.contains_key(&key) {
                return Err(Error::DuplicateSeries(key).into());
            }
            let steps = step_defs
                .into_iter()
                .map(|def| Step::create(def, &key, roles))
                .collect::<Result<Vec<_>>>()?;
            series.insert(key, steps);
        }

        Ok(Self { series, simo })
    }

    /// Steps for the given actor key, if it is part of this division.
    pub fn get(&self, key: &str) -> Option<&[Step]> {
        self.series.get(key).map(Vec::as_slice)
    }

    /// Actor keys in source order.
    pub fn actor_keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// (actor key, steps) pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Step])> {
        self.series.iter().map(|(k, s)| (k.as_str(), s.as_slice()))
    }

    /// true if this division came from a `simo` block.
    pub fn is_simo(&self) -> bool {
        self.simo
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
