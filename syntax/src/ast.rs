//! Parse trees for procedure and task files.
//!
//! These types mirror the YAML layout closely; scalar-or-array fields are
//! already normalized to vecs, and the two division shapes are told apart
//! once, here, so later stages never have to re-inspect raw YAML.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top level of a procedure file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcedureDef {
    pub procedure_name: String,
    pub actors: Vec<ActorDef>,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    pub tasks: Vec<TaskRef>,
    #[serde(default)]
    pub css: Option<String>,
}

/// `{role: EV1, name: Drew}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorDef {
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A display column, holding one or more actors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    pub key: String,
    #[serde(deserialize_with = "de_string_or_vec")]
    pub actors: Vec<String>,
    #[serde(default)]
    pub display: Option<String>,
}

/// Where a task file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSource {
    /// Path relative to the procedure's sibling `tasks/` dir.
    File(String),
    Url(String),
}

/// One entry in a procedure's `tasks` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTaskRef")]
pub struct TaskRef {
    pub source: TaskSource,
    /// role name in the task file -> actor id in this procedure
    pub roles: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTaskRef {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    roles: BTreeMap<String, String>,
}

impl TryFrom<RawTaskRef> for TaskRef {
    type Error = crate::Error;
    fn try_from(raw: RawTaskRef) -> Result<Self, Self::Error> {
        let source = match (raw.file, raw.url) {
            (Some(file), None) => TaskSource::File(file),
            (None, Some(url)) => TaskSource::Url(url),
            (file, url) => {
                return Err(crate::Error::InvalidTaskRef(format!(
                    "file: {file:?}, url: {url:?}"
                )))
            }
        };
        Ok(Self {
            source,
            roles: raw.roles,
        })
    }
}

/// Raw duration fields. Values are kept as YAML so that non-integer
/// input can be reported (and tolerated) by the model layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationDef {
    #[serde(default)]
    pub hours: Option<serde_yaml::Value>,
    #[serde(default)]
    pub minutes: Option<serde_yaml::Value>,
    #[serde(default)]
    pub seconds: Option<serde_yaml::Value>,
    #[serde(default)]
    pub offset: Option<Box<DurationDef>>,
}

/// Top level of a task file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskDef {
    pub title: String,
    #[serde(default)]
    pub duration: Option<DurationDef>,
    #[serde(default)]
    pub roles: Vec<RoleDef>,
    pub steps: Vec<DivisionDef>,
}

/// A role placeholder declared by a task file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoleDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<DurationDef>,
}

/// One time-slice of a task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "serde_yaml::Value")]
pub enum DivisionDef {
    /// `{EV1: [...]}`
    Single { actor: String, steps: Vec<StepDef> },
    /// `{simo: {IV: [...], EV1: [...]}}`, in source order
    Simo(Vec<(String, Vec<StepDef>)>),
}

/// An image attached to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDef {
    pub path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A single instruction. Absent (or falsy) fields are `None`/empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "serde_yaml::Value")]
pub struct StepDef {
    pub title: Option<String>,
    pub text: Option<String>,
    pub actor: Option<String>,
    pub images: Vec<ImageDef>,
    pub checkboxes: Vec<String>,
    pub warnings: Vec<String>,
    pub cautions: Vec<String>,
    pub comments: Vec<String>,
    pub notes: Vec<String>,
    pub substeps: Vec<StepDef>,
}

impl StepDef {
    /// A step built from a bare string.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

fn de_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    crate::parse_array(&value).map_err(serde::de::Error::custom)
}
