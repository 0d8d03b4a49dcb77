use anyhow::Result;

use syntax::ast::ColumnDef;
use util::{HashMap, Hasher};

use crate::{Actor, Error};

/// Actor name that matches any actor without a column of its own.
pub const WILDCARD_ACTOR: &str = "*";

/// A display column in a procedure's tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub actors: Vec<String>,
    /// Header text for the column
    pub display: String,
}

/// Maps actors to display columns.
///
/// Several actors may share one column. An empty layout maps every
/// actor to a column of the same name, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    columns: Vec<Column>,
    actor_to_column: HashMap<String, usize>,
}

impl ColumnLayout {
    /// A layout with no declared columns: every actor is its own column.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build a layout from a procedure's `columns` section,
    /// or one column per actor if there is none.
    pub fn create(defs: &[ColumnDef], actors: &[Actor]) -> Result<Self> {
        if defs.is_empty() {
            let columns = actors
                .iter()
                .map(|actor| Column {
                    key: actor.role.clone(),
                    actors: vec![actor.role.clone()],
                    display: actor.display(),
                })
                .collect();
            return Self::from_columns(columns);
        }

        let columns = defs
            .iter()
            .map(|def| Column {
                key: def.key.clone(),
                actors: def.actors.clone(),
                display: def.display.clone().unwrap_or_else(|| {
                    display_for(&def.key, &def.actors, actors)
                }),
            })
            .collect();
        Self::from_columns(columns)
    }

    fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut actor_to_column = HashMap::with_capacity_and_hasher(columns.len(), Hasher::default());
        for (idx, column) in columns.iter().enumerate() {
            for actor in &column.actors {
                if actor_to_column.insert(actor.clone(), idx).is_some() {
                    return Err(Error::DuplicateColumnActor(actor.clone()).into());
                }
            }
        }
        Ok(Self {
            columns,
            actor_to_column,
        })
    }

    /// true if no columns were declared.
    pub fn is_identity(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get the key of the column that displays `actor`.
    pub fn column_key<'a>(&'a self, actor: &'a str) -> Result<&'a str> {
        if self.is_identity() {
            return Ok(actor);
        }
        let idx = self
            .actor_to_column
            .get(actor)
            .or_else(|| self.actor_to_column.get(WILDCARD_ACTOR))
            .ok_or_else(|| Error::UnknownActorColumn(actor.to_owned()))?;
        Ok(&self.columns[*idx].key)
    }

    /// Column keys in declaration order, or None for an identity layout.
    pub fn ordered_keys(&self) -> Option<impl Iterator<Item = &str>> {
        if self.is_identity() {
            None
        } else {
            Some(self.columns.iter().map(|c| c.key.as_str()))
        }
    }

    /// Get the column with the given key.
    pub fn get(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Header text for the column with the given key.
    pub fn display<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map_or(key, |c| c.display.as_str())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

// "IV/SSRMS (Jane)" style header text for a column without an explicit `display`.
fn display_for(key: &str, column_actors: &[String], actors: &[Actor]) -> String {
    let names: Vec<&str> = column_actors
        .iter()
        .filter_map(|role| actors.iter().find(|a| &a.role == role))
        .filter_map(|a| a.name.as_deref())
        .collect();
    if names.is_empty() {
        key.to_owned()
    } else {
        format!("{} ({})", key, names.join(", "))
    }
}
