use anyhow::{Context, Result};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;

const PROCEDURE_SCHEMA: &str = include_str!("../schema/procedure.json");
const TASK_SCHEMA: &str = include_str!("../schema/task.json");

/// Compiled once, on first use.
static PROCEDURE_COMPILED: Lazy<Result<JSONSchema, Error>> =
    Lazy::new(|| Schema::Procedure.compile());
static TASK_COMPILED: Lazy<Result<JSONSchema, Error>> = Lazy::new(|| Schema::Task.compile());

/// The bundled schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Procedure,
    Task,
}

impl Schema {
    pub fn name(self) -> &'static str {
        match self {
            Self::Procedure => "procedure",
            Self::Task => "task",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Self::Procedure => PROCEDURE_SCHEMA,
            Self::Task => TASK_SCHEMA,
        }
    }

    fn compile(self) -> Result<JSONSchema, Error> {
        let json: serde_json::Value = serde_json::from_str(self.source())
            .map_err(|e| Error::BadSchema(self.name(), e.to_string()))?;
        JSONSchema::compile(&json).map_err(|e| Error::BadSchema(self.name(), e.to_string()))
    }

    /// The compiled schema, shared by every validation.
    fn compiled(self) -> Result<&'static JSONSchema> {
        let compiled = match self {
            Self::Procedure => &*PROCEDURE_COMPILED,
            Self::Task => &*TASK_COMPILED,
        };
        compiled.as_ref().map_err(|e| e.clone().into())
    }
}

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("Bundled {0} schema is invalid: {1}")]
    BadSchema(&'static str, String),
}

/// A file did not match its schema. Holds one line per violation.
#[derive(Debug, thiserror::Error)]
#[error("{schema} file failed schema validation:\n  {}", .violations.join("\n  "))]
pub struct ValidationError {
    pub schema: &'static str,
    pub violations: Vec<String>,
}

/// Validate a parsed YAML document against one of the bundled schemas.
pub fn validate(schema: Schema, value: &serde_yaml::Value) -> Result<()> {
    let instance = serde_json::to_value(value)
        .with_context(|| format!("{} file cannot be represented as JSON", schema.name()))?;
    let compiled = schema.compiled()?;

    if let Err(errors) = compiled.validate(&instance) {
        let violations: Vec<String> = errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    format!("(root): {e}")
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect();
        log::debug!("{} violations of {} schema", violations.len(), schema.name());
        return Err(ValidationError {
            schema: schema.name(),
            violations,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn yaml(text: &str) -> serde_yaml::Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_bundled_schemas_compile() -> Result<()> {
        Schema::Procedure.compile()?;
        Schema::Task.compile()?;
        Ok(())
    }

    #[test]
    fn test_compiled_once() -> Result<()> {
        for schema in [Schema::Procedure, Schema::Task] {
            assert!(std::ptr::eq(schema.compiled()?, schema.compiled()?));
        }
        assert!(!std::ptr::eq(Schema::Procedure.compiled()?, Schema::Task.compiled()?));

        let doc = yaml("{procedure_name: P, actors: [{role: EV1}], tasks: [{file: a.yml}]}");
        for _ in 0..3 {
            validate(Schema::Procedure, &doc)?;
        }
        assert!(validate(Schema::Task, &yaml("{title: Egress}")).is_err());
        assert!(validate(Schema::Task, &yaml("{title: Egress}")).is_err());
        Ok(())
    }

    #[test]
    fn test_valid_procedure() -> Result<()> {
        let doc = yaml("{procedure_name: P, actors: [{role: EV1}], tasks: [{file: a.yml}]}");
        validate(Schema::Procedure, &doc)
    }

    #[test]
    fn test_violations_are_listed() {
        let doc = yaml("{procedure_name: P, actors: [], tasks: [{file: a.yml, url: b}]}");
        let err = validate(Schema::Procedure, &doc).unwrap_err();
        let err = err
            .downcast_ref::<ValidationError>()
            .expect("should be a validation error");
        assert_eq!(err.schema, "procedure");
        assert_eq!(err.violations.len(), 2);
        assert!(err.violations.iter().any(|v| v.starts_with("/actors")));
        assert!(err.violations.iter().any(|v| v.starts_with("/tasks/0")));
    }

    #[test]
    fn test_task_requires_steps() {
        let doc = yaml("{title: Egress}");
        assert!(validate(Schema::Task, &doc).is_err());
    }
}
