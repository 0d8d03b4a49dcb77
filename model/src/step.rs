use anyhow::Result;
use syntax::ast::{ImageDef, StepDef};

use crate::TaskRoles;

/// An image attached to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl From<ImageDef> for ImageRef {
    fn from(def: ImageDef) -> Self {
        Self {
            path: def.path,
            width: def.width,
            height: def.height,
        }
    }
}

/// One instruction in a task, possibly with nested substeps.
/// Empty strings and vecs mean the field was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    pub title: String,
    pub text: String,
    /// Actor key this step is attributed to
    pub actor: String,
    pub images: Vec<ImageRef>,
    pub checkboxes: Vec<String>,
    pub warnings: Vec<String>,
    pub cautions: Vec<String>,
    pub comments: Vec<String>,
    pub notes: Vec<String>,
    pub substeps: Vec<Step>,
}

impl Step {
    /// Create a step from its parse tree.
    ///
    /// The step is attributed to `actor` unless it names its own actor,
    /// which is resolved through `roles` like a division key.
    pub fn create(def: StepDef, actor: &str, roles: &TaskRoles) -> Result<Self> {
        let actor = match &def.actor {
            Some(guess) => roles.resolve_actor_key(guess)?,
            None => actor.to_owned(),
        };
        let substeps = def
            .substeps
            .into_iter()
            .map(|sub| Step::create(sub, &actor, roles))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            title: def.title.unwrap_or_default(),
            text: def.text.unwrap_or_default(),
            images: def.images.into_iter().map(ImageRef::from).collect(),
            checkboxes: def.checkboxes,
            warnings: def.warnings,
            cautions: def.cautions,
            comments: def.comments,
            notes: def.notes,
            substeps,
            actor,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_actor_attribution() -> Result<()> {
        let roles = TaskRoles::for_test(&[("crewA", "EV1")]);
        let def: StepDef = serde_yaml::from_str(
            "
step: Tether swap
substeps:
  - Verify hook
  - step: Hand over bag
    actor: crewA
",
        )?;
        let step = Step::create(def, "EV2", &roles)?;
        assert_eq!(step.actor, "EV2");
        assert_eq!(step.substeps.len(), 2);
        assert_eq!(step.substeps[0].actor, "EV2");
        assert_eq!(step.substeps[1].actor, "EV1");
        assert!(step.title.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_joint_actor_in_substep() -> Result<()> {
        let roles = TaskRoles::for_test(&[]);
        let def: StepDef = serde_yaml::from_str(
            "
step: Tether swap
substeps:
  - step: Hand over bag
    actor: EV1 + + EV2
",
        )?;
        let err = Step::create(def, "EV1", &roles).unwrap_err();
        assert!(err.to_string().contains("EV1 + + EV2"), "{err}");
        Ok(())
    }
}
