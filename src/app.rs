use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use model::{DirSource, Errors, Fetch, Procedure};

use crate::fs::Fs;
use crate::render::{self, RenderConfig};
use crate::settings::Settings;
use crate::ui::Ui;

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// Filesystem interface
    fs: Fs,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let fs = Fs::new(&settings.output, settings.dry_run);
        let ui = Ui::new(&settings);
        Self { settings, fs, ui }
    }

    /// Load and render every procedure named in the settings.
    /// Each procedure stands alone: a failure is reported in the
    /// recap at the end, and doesn't stop the others.
    pub fn run(mut self) -> Result<()> {
        if self.ui.verbose {
            eprintln!("Using output directory {:?}", self.settings.output);
        }
        self.fs.ensure_output_dir_exists(self.ui.verbose)?;

        let fetcher = self.fetcher()?;

        let mut errors = Errors::default();
        let procedures = std::mem::take(&mut self.settings.procedures);
        for path in &procedures {
            if let Err(e) = self.build_procedure(path, fetcher.as_deref()) {
                errors.add_context(e, format!("while building procedure {:?}", path));
            }
        }

        let built = procedures.len() - errors.len();
        errors.print_recap("building procedures")?;
        if built > 0 && !self.settings.dry_run {
            eprintln!("{} {} procedure(s).", "Built".green(), built);
        }
        Ok(())
    }

    #[cfg(feature = "fetch")]
    fn fetcher(&self) -> Result<Option<Box<dyn Fetch>>> {
        match self.settings.fetch_timeout {
            Some(timeout) => Ok(Some(Box::new(crate::fetch::HttpFetcher::new(timeout)?))),
            None => Ok(None),
        }
    }

    #[cfg(not(feature = "fetch"))]
    fn fetcher(&self) -> Result<Option<Box<dyn Fetch>>> {
        log::debug!("built without the 'fetch' feature; url tasks will not load");
        Ok(None)
    }

    fn build_procedure(&mut self, path: &Path, fetcher: Option<&dyn Fetch>) -> Result<()> {
        self.ui.verbose_progress_debug("Loading procedure", path);
        self.ui.start_timer();
        let mut source = DirSource::new(fetcher);
        let procedure = Procedure::from_file(path, &mut source)?;
        self.ui.done();
        self.ui.print_elapsed("Loading procedure");
        self.ui.warnings(&procedure.name, procedure.warnings());

        let config = RenderConfig::for_procedure(path);
        for format in &self.settings.formats {
            self.ui.verbose_progress_debug("Rendering", format);
            let doc = render::render(&procedure, *format, &config)
                .with_context(|| format!("while rendering {:?} output", format))?;
            self.ui.done();

            let file = self.output_file(&procedure, format.extension());
            if self.settings.dry_run {
                eprintln!("Dry run. Not writing {:?}", file);
                println!("{doc}");
            } else {
                self.fs.write_file(&file, &doc)?;
                self.ui.verbose_msg(&format!("Wrote {:?}", file));
            }
        }
        Ok(())
    }

    fn output_file(&self, procedure: &Procedure, extension: &str) -> PathBuf {
        self.fs
            .output_dir()
            .join(format!("{}.{}", procedure.filename, extension))
    }
}
