use anyhow::Result;

use syntax::ast::ActorDef;

use crate::Error;

/// A crew role (e.g. "EV1"), optionally with the name of the person filling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub role: String,
    pub name: Option<String>,
}

impl Actor {
    /// Create a new actor from its procedure definition.
    pub fn create(def: ActorDef) -> Result<Self> {
        if def.role.is_empty() {
            return Err(Error::MissingRole.into());
        }
        Ok(Self {
            role: def.role,
            name: def.name.filter(|name| !name.is_empty()),
        })
    }

    /// Role plus name if there is one, e.g. "EV1 (Drew)".
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", self.role, name),
            None => self.role.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn test_create() -> Result<()> {
        let actor = Actor::create(ActorDef {
            role: "EV1".to_owned(),
            name: Some("Drew".to_owned()),
        })?;
        assert_eq!(actor.display(), "EV1 (Drew)");

        let actor = Actor::create(ActorDef {
            role: "IV".to_owned(),
            name: None,
        })?;
        assert_eq!(actor.display(), "IV");

        assert!(Actor::create(ActorDef {
            role: String::new(),
            name: None
        })
        .is_err());
        Ok(())
    }
}
