use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};

use crate::ast::{DivisionDef, ImageDef, ProcedureDef, StepDef, TaskDef};
use crate::schema::{self, Schema};
use crate::{Error, SIMO_KEY};

/// Parse and validate the text of a procedure file.
pub fn parse_procedure(text: &str) -> Result<ProcedureDef> {
    let value: Value = serde_yaml::from_str(text).context("while reading procedure YAML")?;
    schema::validate(Schema::Procedure, &value)?;
    let def = serde_yaml::from_value(value).context("while building procedure parse tree")?;
    Ok(def)
}

/// Parse and validate the text of a task file.
pub fn parse_task(text: &str) -> Result<TaskDef> {
    let value: Value = serde_yaml::from_str(text).context("while reading task YAML")?;
    schema::validate(Schema::Task, &value)?;
    let def = serde_yaml::from_value(value).context("while building task parse tree")?;
    Ok(def)
}

/// Loose truthiness of a YAML node: null, false, 0 and "" count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

/// Normalize a scalar-or-array field to a vec of strings.
pub fn parse_array(value: &Value) -> Result<Vec<String>, Error> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Sequence(seq) => seq.iter().map(scalar_string).collect(),
        _ => Err(Error::NotStringOrArray(fragment(value))),
    }
}

/// Normalize a scalar-or-array field to a vec of nested steps.
pub fn parse_substeps(value: &Value) -> Result<Vec<StepDef>, Error> {
    match value {
        Value::String(s) => Ok(vec![StepDef::from_text(s.as_str())]),
        Value::Sequence(seq) => seq.iter().map(parse_step).collect(),
        _ => Err(Error::NotStringOrArray(fragment(value))),
    }
}

fn parse_step(value: &Value) -> Result<StepDef, Error> {
    let map = match value {
        // a bare string is only text; nothing else is touched.
        Value::String(s) => return Ok(StepDef::from_text(s.as_str())),
        Value::Mapping(map) => map,
        _ => return Err(Error::InvalidStep(fragment(value))),
    };

    let mut step = StepDef::default();
    if let Some(v) = field(map, "title") {
        step.title = Some(scalar_string(v)?);
    }
    if let Some(v) = field(map, "step") {
        step.text = Some(scalar_string(v)?);
    }
    if let Some(v) = field(map, "actor") {
        step.actor = Some(scalar_string(v)?);
    }
    if let Some(v) = field(map, "images") {
        step.images = parse_images(v)?;
    }
    if let Some(v) = field(map, "checkboxes") {
        step.checkboxes = parse_array(v)?;
    }
    if let Some(v) = field(map, "warning") {
        step.warnings = parse_array(v)?;
    }
    if let Some(v) = field(map, "caution") {
        step.cautions = parse_array(v)?;
    }
    if let Some(v) = field(map, "comment") {
        step.comments = parse_array(v)?;
    }
    if let Some(v) = field(map, "note") {
        step.notes = parse_array(v)?;
    }
    if let Some(v) = field(map, "substeps") {
        step.substeps = parse_substeps(v)?;
    }
    Ok(step)
}

fn parse_images(value: &Value) -> Result<Vec<ImageDef>, Error> {
    match value {
        Value::Sequence(seq) => seq.iter().map(parse_image).collect(),
        _ => Ok(vec![parse_image(value)?]),
    }
}

fn parse_image(value: &Value) -> Result<ImageDef, Error> {
    match value {
        Value::String(path) => Ok(ImageDef {
            path: path.clone(),
            width: None,
            height: None,
        }),
        Value::Mapping(map) => {
            let path = map
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::InvalidImage(fragment(value)))?;
            let dimension = |key: &str| {
                map.get(key)
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
            };
            Ok(ImageDef {
                path: path.to_owned(),
                width: dimension("width"),
                height: dimension("height"),
            })
        }
        _ => Err(Error::InvalidImage(fragment(value))),
    }
}

fn parse_division(value: &Value) -> Result<DivisionDef, Error> {
    let map = value
        .as_mapping()
        .ok_or_else(|| Error::InvalidDivision(fragment(value)))?;

    if let Some(simo) = map.get(SIMO_KEY) {
        let simo = match simo.as_mapping() {
            Some(simo) if map.len() == 1 && !simo.is_empty() => simo,
            _ => return Err(Error::InvalidDivision(fragment(value))),
        };
        let mut series = Vec::with_capacity(simo.len());
        for (k, v) in simo {
            let actor = scalar_string(k)?;
            let steps = parse_series(&actor, v)?;
            series.push((actor, steps));
        }
        return Ok(DivisionDef::Simo(series));
    }

    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((k, v)), None) => {
            let actor = scalar_string(k)?;
            let steps = parse_series(&actor, v)?;
            Ok(DivisionDef::Single { actor, steps })
        }
        (None, _) => Err(Error::InvalidDivision(fragment(value))),
        (Some(_), Some(_)) => Err(Error::MultipleActorsNotSimo(fragment(value))),
    }
}

fn parse_series(actor: &str, value: &Value) -> Result<Vec<StepDef>, Error> {
    match value {
        Value::String(s) => Ok(vec![StepDef::from_text(s.as_str())]),
        Value::Sequence(seq) => seq.iter().map(parse_step).collect(),
        _ => Err(Error::InvalidSeries(actor.to_owned(), fragment(value))),
    }
}

impl TryFrom<Value> for DivisionDef {
    type Error = Error;
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        parse_division(&value)
    }
}

impl TryFrom<Value> for StepDef {
    type Error = Error;
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        parse_step(&value)
    }
}

/// Get a field only if it is present and truthy.
fn field<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| is_truthy(v))
}

fn scalar_string(value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(Error::NotString(fragment(value))),
    }
}

/// Render a node as compact JSON for error messages.
fn fragment(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_parse_array() -> Result<()> {
        assert_eq!(parse_array(&yaml("hook A"))?, vec!["hook A"]);
        assert_eq!(
            parse_array(&yaml("[hook B, hook A, hook C]"))?,
            vec!["hook B", "hook A", "hook C"]
        );
        assert!(parse_array(&yaml("{not: list}")).is_err());
        assert!(parse_array(&yaml("~")).is_err());
        Ok(())
    }

    #[test]
    fn test_bare_string_step() -> Result<()> {
        let step = StepDef::try_from(yaml("Close gates"))?;
        assert_eq!(step, StepDef::from_text("Close gates"));
        Ok(())
    }

    #[test]
    fn test_full_step() -> Result<()> {
        let step = StepDef::try_from(yaml(
            "
title: Egress
step: Close gates
checkboxes: [hook A, hook B]
warning: Sharp edge
images:
  - path: gate.png
    width: 200
  - hatch.png
substeps:
  - Verify closed
  - step: Report
    note: to IV
",
        ))?;
        assert_eq!(step.title.as_deref(), Some("Egress"));
        assert_eq!(step.text.as_deref(), Some("Close gates"));
        assert_eq!(step.checkboxes, vec!["hook A", "hook B"]);
        assert_eq!(step.warnings, vec!["Sharp edge"]);
        assert!(step.cautions.is_empty());
        assert_eq!(step.images.len(), 2);
        assert_eq!(step.images[0].width, Some(200));
        assert_eq!(step.images[0].height, None);
        assert_eq!(step.images[1].path, "hatch.png");
        assert_eq!(step.substeps.len(), 2);
        assert_eq!(step.substeps[0].text.as_deref(), Some("Verify closed"));
        assert_eq!(step.substeps[1].notes, vec!["to IV"]);
        Ok(())
    }

    #[test]
    fn test_empty_string_fields_are_absent() -> Result<()> {
        let step = StepDef::try_from(yaml("{step: '', warning: '', note: [''], title: ''}"))?;
        assert_eq!(step.text, None);
        assert_eq!(step.title, None);
        assert!(step.warnings.is_empty());
        // an array is present even if its contents are empty strings:
        assert_eq!(step.notes, vec![""]);
        Ok(())
    }

    #[test]
    fn test_single_division() -> Result<()> {
        let div = DivisionDef::try_from(yaml("{EV1: Egress airlock}"))?;
        assert_eq!(
            div,
            DivisionDef::Single {
                actor: "EV1".to_owned(),
                steps: vec![StepDef::from_text("Egress airlock")],
            }
        );
        Ok(())
    }

    #[test]
    fn test_simo_division_keeps_order() -> Result<()> {
        let div = DivisionDef::try_from(yaml(
            "
simo:
  IV: Record PET start time
  EV2: [Open hatch]
  EV1:
    - step: Close gates
      checkboxes: [hook A, hook B]
",
        ))?;
        if let DivisionDef::Simo(series) = &div {
            let actors: Vec<&str> = series.iter().map(|(actor, _)| actor.as_str()).collect();
            assert_eq!(actors, vec!["IV", "EV2", "EV1"]);
            assert_eq!(series[2].1[0].checkboxes, vec!["hook A", "hook B"]);
        } else {
            panic!("expected simo division");
        }
        Ok(())
    }

    #[test]
    fn test_bad_divisions() {
        assert!(matches!(
            parse_division(&yaml("{EV1: a, EV2: b}")),
            Err(Error::MultipleActorsNotSimo(_))
        ));
        assert!(matches!(
            parse_division(&yaml("[EV1]")),
            Err(Error::InvalidDivision(_))
        ));
        assert!(matches!(
            parse_division(&yaml("{simo: {EV1: a}, EV2: b}")),
            Err(Error::InvalidDivision(_))
        ));
        assert!(matches!(
            parse_division(&yaml("{EV1: {step: a}}")),
            Err(Error::InvalidSeries(_, _))
        ));
    }

    #[test]
    fn test_parse_task() -> Result<()> {
        let task = parse_task(
            "
title: Egress
roles:
  - name: crewA
    description: Leads
    duration:
      minutes: 25
steps:
  - crewA: Egress
  - simo:
      IV: Record PET start time
      crewA + crewB: Check suits
",
        )?;
        assert_eq!(task.title, "Egress");
        assert_eq!(task.roles[0].name, "crewA");
        assert_eq!(task.steps.len(), 2);
        Ok(())
    }

    #[test]
    fn test_task_missing_title_fails() {
        assert!(parse_task("steps:\n  - EV1: Egress\n").is_err());
    }

    #[test]
    fn test_parse_procedure() -> Result<()> {
        let proc = parse_procedure(
            "
procedure_name: EVA 1
actors:
  - role: IV
  - role: EV1
    name: Drew
columns:
  - key: IV
    actors: [IV, SSRMS]
  - key: EV1
    actors: EV1
tasks:
  - file: egress.yml
    roles:
      crewA: EV1
  - url: https://example.com/ingress.yml
",
        )?;
        assert_eq!(proc.procedure_name, "EVA 1");
        assert_eq!(proc.actors[1].name.as_deref(), Some("Drew"));
        assert_eq!(proc.columns[0].actors, vec!["IV", "SSRMS"]);
        assert_eq!(proc.columns[1].actors, vec!["EV1"]);
        assert_eq!(
            proc.tasks[0].source,
            crate::ast::TaskSource::File("egress.yml".to_owned())
        );
        assert_eq!(proc.tasks[0].roles["crewA"], "EV1");
        assert!(matches!(
            proc.tasks[1].source,
            crate::ast::TaskSource::Url(_)
        ));
        Ok(())
    }
}
