use std::collections::BTreeMap;

use anyhow::Result;

use syntax::ast::RoleDef;
use syntax::JOINT_SEPARATOR;
use util::{HashMap, Hasher};

use crate::{split_joint_key, Diagnostics, Duration, Error};

/// A role placeholder in a task file (e.g. "crewA"), bound to the
/// actor (e.g. "EV1") that fills it in a particular procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRole {
    pub name: String,
    pub description: String,
    pub duration: Duration,
    /// Id of the actor bound to this role. This is a lookup result, not a link to an `Actor`.
    pub actor: String,
}

impl TaskRole {
    /// Create a role, looking up its actor in the procedure's bindings for this task.
    pub fn create(
        def: RoleDef,
        bindings: &BTreeMap<String, String>,
        task_file: &str,
        diags: &mut Diagnostics,
    ) -> Result<Self> {
        let actor = bindings
            .get(&def.name)
            .ok_or_else(|| Error::UnboundRole(task_file.to_owned(), def.name.clone()))?
            .clone();

        let duration = match &def.duration {
            Some(d) => Duration::from_def(d, diags),
            None => {
                diags.warn(format!("Role \"{}\" has no duration; using 00:00", def.name));
                Duration::default()
            }
        };

        Ok(Self {
            name: def.name,
            description: def.description.unwrap_or_default(),
            duration,
            actor,
        })
    }
}

/// The roles of one task, in declaration order and by name.
#[derive(Debug, Clone, Default)]
pub struct TaskRoles {
    roles: Vec<TaskRole>,
    by_name: HashMap<String, usize>,
}

impl TaskRoles {
    /// Create roles for a task from their definitions.
    /// Fails if any role is not bound to an actor.
    pub fn create(
        defs: Vec<RoleDef>,
        bindings: &BTreeMap<String, String>,
        task_file: &str,
        diags: &mut Diagnostics,
    ) -> Result<Self> {
        let mut roles = Self {
            roles: Vec::with_capacity(defs.len()),
            by_name: HashMap::with_capacity_and_hasher(defs.len(), Hasher::default()),
        };
        for def in defs {
            roles.push(TaskRole::create(def, bindings, task_file, diags)?);
        }
        Ok(roles)
    }

    fn push(&mut self, role: TaskRole) {
        self.by_name.insert(role.name.clone(), self.roles.len());
        self.roles.push(role);
    }

    /// Get a role by name.
    pub fn get(&self, name: &str) -> Option<&TaskRole> {
        self.by_name.get(name).map(|idx| &self.roles[*idx])
    }

    /// Iterate through roles in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, TaskRole> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// If `guess` names a role, get the actor bound to it;
    /// otherwise it is already an actor id.
    pub fn resolve_actor_id<'a>(&'a self, guess: &'a str) -> &'a str {
        match self.get(guess) {
            Some(role) => &role.actor,
            None => guess,
        }
    }

    /// Resolve a single or joint ("crewA + crewB") key to real actor ids.
    /// Joint keys are re-joined in canonical "A + B" form.
    /// Fails if any part of a joint key is empty, e.g. "EV1 +".
    pub fn resolve_actor_key(&self, guess: &str) -> Result<String, Error> {
        if !guess.contains(syntax::JOINT_DELIM) {
            return Ok(self.resolve_actor_id(guess.trim()).to_owned());
        }
        let mut actors = Vec::with_capacity(2);
        for actor in split_joint_key(guess) {
            if actor.is_empty() {
                return Err(Error::EmptyJointActor(guess.to_owned()));
            }
            actors.push(self.resolve_actor_id(actor));
        }
        Ok(actors.join(JOINT_SEPARATOR))
    }
}

#[cfg(test)]
impl TaskRoles {
    /// Roles bound as (name, actor) pairs, with no durations.
    pub fn for_test(pairs: &[(&str, &str)]) -> Self {
        let mut roles = Self::default();
        for (name, actor) in pairs {
            roles.push(TaskRole {
                name: name.to_string(),
                description: String::new(),
                duration: Duration::default(),
                actor: actor.to_string(),
            });
        }
        roles
    }
}
