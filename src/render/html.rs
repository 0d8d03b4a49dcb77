use std::fmt::Write;

use anyhow::Result;
use html_escape::{encode_double_quoted_attribute, encode_text};

use model::ImageRef;

use super::format::to_html;
use super::{BlockKind, CellInfo, DocumentSink, Paragraph};

const BASE_CSS: &str = "\
body { font-family: sans-serif; }
table.task { border-collapse: collapse; width: 100%; }
table.task th, table.task td { border: 1px solid #444; vertical-align: top; padding: 4px; }
tr.simo td { border-top: 3px double #444; }
td.empty { background: #f4f4f4; }
.step-title { font-weight: bold; }
.actor { font-style: italic; }
.checkbox { margin-left: 2em; }
.warning, .caution { border: 1px solid; padding: 2px 4px; }
.warning { background: #fdd; }
.caution { background: #ffd; }
";

/// Writes a complete html page. The procedure's css is inlined after the base styles.
pub struct HtmlSink {
    out: String,
    in_table: bool,
    in_row: bool,
    in_cell: bool,
}

impl HtmlSink {
    pub fn new(title: &str, css: Option<&str>) -> Self {
        let mut out = String::with_capacity(16 * 1024);
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str("<title>");
        out.push_str(&encode_text(title));
        out.push_str("</title>\n<style>\n");
        out.push_str(BASE_CSS);
        if let Some(css) = css {
            out.push_str(css);
            out.push('\n');
        }
        out.push_str("</style>\n</head>\n<body>\n");
        Self {
            out,
            in_table: false,
            in_row: false,
            in_cell: false,
        }
    }

    fn close_cell(&mut self) {
        if self.in_cell {
            self.out.push_str("</td>\n");
            self.in_cell = false;
        }
    }

    fn close_row(&mut self) {
        self.close_cell();
        if self.in_row {
            self.out.push_str("</tr>\n");
            self.in_row = false;
        }
    }

    fn close_table(&mut self) {
        self.close_row();
        if self.in_table {
            self.out.push_str("</tbody>\n</table>\n");
            self.in_table = false;
        }
    }
}

impl DocumentSink for HtmlSink {
    fn add_paragraph(&mut self, kind: Paragraph, text: &str) -> Result<()> {
        let out = &mut self.out;
        match kind {
            Paragraph::ProcedureTitle => writeln!(out, "<h1>{}</h1>", encode_text(text))?,
            Paragraph::TaskTitle => writeln!(out, "<h2>{}</h2>", encode_text(text))?,
            Paragraph::Duration => {
                writeln!(out, "<p class=\"duration\">Duration: {}</p>", encode_text(text))?
            }
            Paragraph::Actor => writeln!(out, "<div class=\"actor\">{}</div>", encode_text(text))?,
            Paragraph::StepTitle { depth } => writeln!(
                out,
                "<div class=\"step-title depth-{depth}\">{}</div>",
                to_html(text)?
            )?,
            Paragraph::Step { label, depth } => writeln!(
                out,
                "<div class=\"step depth-{depth}\"><span class=\"label\">{}</span> {}</div>",
                encode_text(label),
                to_html(text)?
            )?,
            Paragraph::Checkbox { depth } => writeln!(
                out,
                "<div class=\"checkbox depth-{depth}\">☐ {}</div>",
                to_html(text)?
            )?,
        }
        Ok(())
    }

    fn add_block(&mut self, kind: BlockKind, text: &str) -> Result<()> {
        writeln!(
            self.out,
            "<div class=\"{}\"><strong>{}</strong> {}</div>",
            kind.class(),
            kind.label(),
            to_html(text)?
        )?;
        Ok(())
    }

    fn add_image(&mut self, src: &str, image: &ImageRef) -> Result<()> {
        write!(self.out, "<img src=\"{}\"", encode_double_quoted_attribute(src))?;
        if let Some(width) = image.width {
            write!(self.out, " width=\"{width}\"")?;
        }
        if let Some(height) = image.height {
            write!(self.out, " height=\"{height}\"")?;
        }
        self.out.push_str(">\n");
        Ok(())
    }

    fn start_table(&mut self, headers: &[&str]) -> Result<()> {
        self.close_table();
        self.out.push_str("<table class=\"task\">\n<thead>\n<tr>");
        for header in headers {
            write!(self.out, "<th>{}</th>", encode_text(header))?;
        }
        self.out.push_str("</tr>\n</thead>\n<tbody>\n");
        self.in_table = true;
        Ok(())
    }

    fn add_row(&mut self, simo: bool) -> Result<()> {
        self.close_row();
        self.out.push_str(if simo { "<tr class=\"simo\">\n" } else { "<tr>\n" });
        self.in_row = true;
        Ok(())
    }

    fn add_cell(&mut self, cell: CellInfo) -> Result<()> {
        self.close_cell();
        self.out.push_str("<td");
        if cell.colspan > 1 {
            write!(self.out, " colspan=\"{}\"", cell.colspan)?;
        }
        write!(self.out, " class=\"col-{}", cell.position)?;
        if cell.empty {
            self.out.push_str(" empty");
        }
        self.out.push_str("\">\n");
        self.in_cell = true;
        Ok(())
    }

    fn end_table(&mut self) -> Result<()> {
        self.close_table();
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        self.close_table();
        self.out.push_str("</body>\n</html>\n");
        Ok(std::mem::take(&mut self.out))
    }
}
