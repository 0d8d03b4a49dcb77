use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use syntax::ast::{ProcedureDef, TaskSource};

use crate::{Actor, ColumnLayout, Diagnostics, Error, Source, Task, TaskInvocation};

/// The top-level document: actors, the columns they appear in,
/// and the tasks they perform.
#[derive(Debug)]
pub struct Procedure {
    pub name: String,
    /// `name`, made safe for use as a file name
    pub filename: String,
    actors: Vec<Actor>,
    layout: ColumnLayout,
    tasks: Vec<Task>,
    css: Option<String>,
    diagnostics: Diagnostics,
}

impl Procedure {
    /// Load a procedure file, and all the tasks it refers to, through `source`.
    pub fn from_file(path: &Path, source: &mut dyn Source) -> Result<Self> {
        let text = source.read_procedure(path)?;
        let def = syntax::parse_procedure(&text)
            .with_context(|| format!("while parsing procedure file {:?}", path))?;
        Self::load(def, path, source)
    }

    /// Create a procedure from its parse tree.
    /// `path` is used to find the task and css files it refers to.
    ///
    /// Tasks are loaded one at a time, in the order they are declared.
    pub fn load(def: ProcedureDef, path: &Path, source: &mut dyn Source) -> Result<Self> {
        let mut diagnostics = Diagnostics::default();

        let mut actors: Vec<Actor> = Vec::with_capacity(def.actors.len());
        for actor_def in def.actors {
            let actor = Actor::create(actor_def)?;
            if actors.iter().any(|a| a.role == actor.role) {
                return Err(Error::DuplicateActor(actor.role).into());
            }
            actors.push(actor);
        }

        let layout = ColumnLayout::create(&def.columns, &actors)
            .context("while creating procedure columns")?;

        let mut tasks = Vec::with_capacity(def.tasks.len());
        for task_ref in &def.tasks {
            let file = match &task_ref.source {
                TaskSource::File(file) => file.as_str(),
                TaskSource::Url(url) => url.as_str(),
            };
            let text = source.read_task(path, &task_ref.source)?;
            let task_def = syntax::parse_task(&text)
                .with_context(|| format!("while parsing task file \"{file}\""))?;

            let mut task_diags = Diagnostics::default();
            let invocation = TaskInvocation {
                file,
                roles: &task_ref.roles,
            };
            let task = Task::create(task_def, invocation, &layout, &mut task_diags)
                .with_context(|| format!("while loading task file \"{file}\""))?;
            diagnostics.absorb(task_diags, file);
            tasks.push(task);
        }

        let css = match &def.css {
            Some(css) => Some(source.read_css(path, css)?),
            None => None,
        };

        log::info!(
            "Loaded procedure \"{}\" with {} actors and {} tasks",
            def.procedure_name,
            actors.len(),
            tasks.len()
        );

        Ok(Self {
            filename: sanitize_filename(&def.procedure_name),
            name: def.procedure_name,
            actors,
            layout,
            tasks,
            css,
            diagnostics,
        })
    }

    /// Key of the column that displays `actor`.
    pub fn get_actor_column_key<'a>(&'a self, actor: &'a str) -> Result<&'a str> {
        self.layout.column_key(actor)
    }

    #[inline]
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    #[inline]
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    #[inline]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Contents of the procedure's stylesheet, if it has one.
    #[inline]
    pub fn css(&self) -> Option<&str> {
        self.css.as_deref()
    }

    /// Non-fatal problems found while loading.
    #[inline]
    pub fn warnings(&self) -> &[String] {
        self.diagnostics.warnings()
    }
}

/// Runs of characters that can't appear in an output filename.
static FILENAME_UNSAFE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").expect("Filename pattern should always compile"));

/// Replace each run of characters other than letters, digits, '_' and '-' with '_'.
pub fn sanitize_filename(name: &str) -> String {
    FILENAME_UNSAFE.replace_all(name, "_").into_owned()
}
