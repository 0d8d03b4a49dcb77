use std::fmt::Write;

use anyhow::Result;

use model::ImageRef;

use super::format::to_plain;
use super::{BlockKind, CellInfo, DocumentSink, Paragraph};

/// Writes a plain-text outline of the document.
/// Empty cells are left out.
#[derive(Default)]
pub struct TextSink {
    out: String,
    headers: Vec<String>,
}

impl TextSink {
    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
    }

    fn underline(&mut self, text: &str, ch: char) {
        self.out.push_str(text);
        self.out.push('\n');
        self.out.extend(std::iter::repeat(ch).take(text.chars().count()));
        self.out.push('\n');
    }
}

impl DocumentSink for TextSink {
    fn add_paragraph(&mut self, kind: Paragraph, text: &str) -> Result<()> {
        match kind {
            Paragraph::ProcedureTitle => self.underline(text, '='),
            Paragraph::TaskTitle => {
                self.out.push('\n');
                self.underline(text, '-');
            }
            Paragraph::Duration => writeln!(self.out, "Duration: {text}")?,
            Paragraph::Actor => {
                self.indent(1);
                writeln!(self.out, "({text})")?;
            }
            Paragraph::StepTitle { depth } => {
                self.indent(depth + 1);
                writeln!(self.out, "{}", to_plain(text)?.to_uppercase())?;
            }
            Paragraph::Step { label, depth } => {
                self.indent(depth + 1);
                writeln!(self.out, "{label} {}", to_plain(text)?)?;
            }
            Paragraph::Checkbox { depth } => {
                self.indent(depth + 2);
                writeln!(self.out, "[ ] {}", to_plain(text)?)?;
            }
        }
        Ok(())
    }

    fn add_block(&mut self, kind: BlockKind, text: &str) -> Result<()> {
        self.indent(1);
        writeln!(self.out, "{}: {}", kind.label(), to_plain(text)?)?;
        Ok(())
    }

    fn add_image(&mut self, src: &str, _image: &ImageRef) -> Result<()> {
        self.indent(1);
        writeln!(self.out, "[image: {src}]")?;
        Ok(())
    }

    fn start_table(&mut self, headers: &[&str]) -> Result<()> {
        self.headers = headers.iter().map(|h| h.to_string()).collect();
        writeln!(self.out, "Columns: {}", self.headers.join(" | "))?;
        Ok(())
    }

    fn add_row(&mut self, simo: bool) -> Result<()> {
        self.out.push_str(if simo { "\n--- simultaneous ---\n" } else { "\n---\n" });
        Ok(())
    }

    fn add_cell(&mut self, cell: CellInfo) -> Result<()> {
        if cell.empty {
            return Ok(());
        }
        let end = (cell.anchor + cell.colspan).min(self.headers.len());
        let header = self.headers[cell.anchor.min(end)..end].join(" + ");
        writeln!(self.out, "[{header}]")?;
        Ok(())
    }

    fn end_table(&mut self) -> Result<()> {
        self.headers.clear();
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        Ok(std::mem::take(&mut self.out))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::render::test::{load, project, EGRESS, PROCEDURE};
    use crate::render::{ProcedureWriter, RenderConfig};

    #[test]
    fn test_outline() -> Result<()> {
        let (_dir, path) = project(PROCEDURE, EGRESS)?;
        let procedure = load(&path)?;
        let config = RenderConfig::for_procedure(&path);
        let text = ProcedureWriter::new(&procedure, &config).write(&mut TextSink::default())?;

        let expected = "\
EVA 1
=====

Egress
------
Duration: 00:25
Columns: IV | EV1 (Drew) | EV2

--- simultaneous ---
[IV]
  1. Record PET start time
[EV1 (Drew)]
  WARNING: Watch the hatch
  1. Close gates
    [ ] hook A
    [ ] hook B
  2. Egress airlock

---
[EV1 (Drew) + EV2]
  (EV1 + EV2)
  3. Lift ✓
    a. first
    b. second

---
[EV2]
  4. Follow EV1 out
";
        assert_eq!(text, expected);
        Ok(())
    }
}
