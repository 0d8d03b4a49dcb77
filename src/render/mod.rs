//! Turning a loaded `Procedure` into documents.
//!
//! [`ProcedureWriter`] walks procedure -> task -> resolved division -> step and
//! drives a [`DocumentSink`]; the sinks only know how to lay out what they're given.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use layout::{Cell, StepCounter};
use model::{ImageRef, Procedure, Step, Task, TASKS_DIR};

use crate::args::Format;

/// markup + markdown formatting of step text
mod format;

mod html;
pub use html::HtmlSink;

mod text;
pub use text::TextSink;

/// Name of the directory holding step images, next to the tasks directory.
pub const IMAGES_DIR: &str = "images";

/// Kinds of paragraph a writer can add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paragraph<'a> {
    ProcedureTitle,
    TaskTitle,
    Duration,
    /// Actor key shown at the top of a merged or shared cell
    Actor,
    StepTitle { depth: usize },
    Step { label: &'a str, depth: usize },
    Checkbox { depth: usize },
}

/// Call-out blocks attached to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Warning,
    Caution,
    Comment,
    Note,
}

impl BlockKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Caution => "CAUTION",
            Self::Comment => "COMMENT",
            Self::Note => "NOTE",
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Caution => "caution",
            Self::Comment => "comment",
            Self::Note => "note",
        }
    }
}

/// Where a cell sits in its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellInfo {
    /// First column covered
    pub anchor: usize,
    pub colspan: usize,
    /// Position once merged columns are collapsed
    pub position: usize,
    pub empty: bool,
}

/// Receives document content in reading order.
///
/// Paragraphs, blocks and images added after `add_cell` belong to that cell
/// until the next cell, row or `end_table`.
pub trait DocumentSink {
    fn add_paragraph(&mut self, kind: Paragraph, text: &str) -> Result<()>;
    fn add_block(&mut self, kind: BlockKind, text: &str) -> Result<()>;
    fn add_image(&mut self, src: &str, image: &ImageRef) -> Result<()>;
    fn start_table(&mut self, headers: &[&str]) -> Result<()>;
    fn add_row(&mut self, simo: bool) -> Result<()>;
    fn add_cell(&mut self, cell: CellInfo) -> Result<()>;
    fn end_table(&mut self) -> Result<()>;
    /// Close the document and take its text.
    fn finish(&mut self) -> Result<String>;
}

/// Per-procedure output settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Directory step image paths are relative to
    pub images_dir: PathBuf,
    /// Pattern for task durations, see `model::Duration::format`
    pub duration_pattern: String,
}

impl RenderConfig {
    /// Images live in `<procedure dir>/../images`, next to the tasks directory.
    pub fn for_procedure(path: &Path) -> Self {
        let procedure_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let sibling = procedure_dir.join("..");
        let project_dir = if sibling.join(TASKS_DIR).is_dir() {
            sibling
        } else {
            procedure_dir.to_path_buf()
        };
        Self {
            images_dir: project_dir.join(IMAGES_DIR),
            duration_pattern: "H:M".to_owned(),
        }
    }

    fn image_src(&self, image: &ImageRef) -> String {
        self.images_dir.join(&image.path).display().to_string()
    }
}

/// Render `procedure` in the given format.
pub fn render(procedure: &Procedure, format: Format, config: &RenderConfig) -> Result<String> {
    let writer = ProcedureWriter::new(procedure, config);
    match format {
        Format::Html => writer.write(&mut HtmlSink::new(&procedure.name, procedure.css())),
        Format::Text => writer.write(&mut TextSink::default()),
    }
}

/// Walks a procedure and sends its content to a sink.
pub struct ProcedureWriter<'a> {
    procedure: &'a Procedure,
    config: &'a RenderConfig,
}

impl<'a> ProcedureWriter<'a> {
    pub fn new(procedure: &'a Procedure, config: &'a RenderConfig) -> Self {
        Self { procedure, config }
    }

    /// Write the whole procedure, returning the finished document.
    pub fn write(&self, sink: &mut dyn DocumentSink) -> Result<String> {
        sink.add_paragraph(Paragraph::ProcedureTitle, &self.procedure.name)?;
        let mut counter = StepCounter::default();
        for task in self.procedure.tasks() {
            self.write_task(task, &mut counter, sink)
                .with_context(|| format!("while writing task \"{}\"", task.title))?;
        }
        sink.finish()
    }

    fn write_task(&self, task: &Task, counter: &mut StepCounter, sink: &mut dyn DocumentSink) -> Result<()> {
        let layout = self.procedure.layout();
        let rows = layout::resolve_task(task, layout)?;

        sink.add_paragraph(Paragraph::TaskTitle, &task.title)?;
        sink.add_paragraph(
            Paragraph::Duration,
            &task.duration.format(&self.config.duration_pattern),
        )?;

        let headers: Vec<&str> = task.columns().iter().map(|key| layout.display(key)).collect();
        sink.start_table(&headers)?;

        // numbering restarts for every task:
        counter.reset(task.num_cols());
        for row in &rows {
            sink.add_row(row.simo)?;
            for cell in &row.cells {
                sink.add_cell(CellInfo {
                    anchor: cell.anchor,
                    colspan: cell.colspan,
                    position: row.remap[cell.anchor],
                    empty: cell.is_empty(),
                })?;
                self.write_cell(cell, counter, sink)?;
            }
        }
        sink.end_table()
    }

    fn write_cell(&self, cell: &Cell, counter: &mut StepCounter, sink: &mut dyn DocumentSink) -> Result<()> {
        let show_actor = cell.is_merged() || cell.series.len() > 1;
        for series in &cell.series {
            if show_actor {
                sink.add_paragraph(Paragraph::Actor, series.actor_key)?;
            }
            for step in series.steps {
                let label = step_label(counter.next(cell), 0);
                self.write_step(step, &label, 0, sink)?;
            }
        }
        Ok(())
    }

    fn write_step(&self, step: &Step, label: &str, depth: usize, sink: &mut dyn DocumentSink) -> Result<()> {
        if !step.title.is_empty() {
            sink.add_paragraph(Paragraph::StepTitle { depth }, &step.title)?;
        }
        for warning in &step.warnings {
            sink.add_block(BlockKind::Warning, warning)?;
        }
        for caution in &step.cautions {
            sink.add_block(BlockKind::Caution, caution)?;
        }
        sink.add_paragraph(Paragraph::Step { label, depth }, &step.text)?;
        for image in &step.images {
            sink.add_image(&self.config.image_src(image), image)?;
        }
        for checkbox in &step.checkboxes {
            sink.add_paragraph(Paragraph::Checkbox { depth }, checkbox)?;
        }
        for note in &step.notes {
            sink.add_block(BlockKind::Note, note)?;
        }
        for comment in &step.comments {
            sink.add_block(BlockKind::Comment, comment)?;
        }
        for (i, substep) in step.substeps.iter().enumerate() {
            let label = step_label(i + 1, depth + 1);
            self.write_step(substep, &label, depth + 1, sink)?;
        }
        Ok(())
    }
}

/// "1." at even depths, "a." at odd depths.
fn step_label(n: usize, depth: usize) -> String {
    if depth % 2 == 0 {
        format!("{n}.")
    } else {
        let mut letters = String::new();
        let mut n = n;
        while n > 0 {
            n -= 1;
            letters.insert(0, (b'a' + (n % 26) as u8) as char);
            n /= 26;
        }
        format!("{letters}.")
    }
}
