use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use syntax::ast::TaskSource;

use crate::Error;

/// Name of the directory holding task files, next to the procedures directory.
pub const TASKS_DIR: &str = "tasks";

/// Fetches the text of a remote task definition.
///
/// Implementations are expected to enforce their own timeout.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Provides the text of the files a procedure refers to.
///
/// Every call blocks until the text is available; a procedure's tasks
/// are requested one at a time, in declaration order.
pub trait Source {
    /// Read the procedure file itself.
    fn read_procedure(&mut self, path: &Path) -> Result<String>;

    /// Read a task file referenced by the procedure at `procedure`.
    fn read_task(&mut self, procedure: &Path, task: &TaskSource) -> Result<String>;

    /// Read a stylesheet referenced by the procedure at `procedure`.
    fn read_css(&mut self, procedure: &Path, css: &str) -> Result<String>;
}

/// Reads files from a project directory laid out as
/// `procedures/*.yml` + `tasks/*.yml`, and fetches url tasks with an optional `Fetch`.
pub struct DirSource<'a> {
    fetcher: Option<&'a dyn Fetch>,
}

impl<'a> DirSource<'a> {
    /// Create a new `DirSource`. Without a fetcher, url tasks fail to load.
    pub fn new(fetcher: Option<&'a dyn Fetch>) -> Self {
        Self { fetcher }
    }

    /// Path to a task file: `<procedure dir>/../tasks/<file>`, or
    /// `<procedure dir>/tasks/<file>` if the former doesn't exist.
    pub fn task_path(procedure: &Path, file: &str) -> PathBuf {
        let procedure_dir = procedure.parent().unwrap_or_else(|| Path::new("."));
        let sibling = procedure_dir.join("..").join(TASKS_DIR).join(file);
        if sibling.exists() {
            return sibling;
        }
        let nested = procedure_dir.join(TASKS_DIR).join(file);
        if nested.exists() {
            log::debug!("using task file {:?} next to the procedure", nested);
            return nested;
        }
        sibling
    }

    fn read_file(kind: &'static str, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(Error::ItemNotFound(kind, path.display().to_string()).into());
        }
        log::debug!("reading {kind} file {:?}", path);
        std::fs::read_to_string(path).with_context(|| format!("while reading {kind} file {:?}", path))
    }
}

impl Source for DirSource<'_> {
    fn read_procedure(&mut self, path: &Path) -> Result<String> {
        Self::read_file("Procedure file", path)
    }

    fn read_task(&mut self, procedure: &Path, task: &TaskSource) -> Result<String> {
        match task {
            TaskSource::File(file) => Self::read_file("Task file", &Self::task_path(procedure, file)),
            TaskSource::Url(url) => match self.fetcher {
                Some(fetcher) => {
                    log::info!("fetching task from {url}");
                    fetcher
                        .fetch(url)
                        .with_context(|| format!("while fetching task from {url}"))
                }
                None => Err(Error::FetchDisabled(url.clone()).into()),
            },
        }
    }

    fn read_css(&mut self, procedure: &Path, css: &str) -> Result<String> {
        let procedure_dir = procedure.parent().unwrap_or_else(|| Path::new("."));
        Self::read_file("Stylesheet", &procedure_dir.join(css))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    struct StaticFetch;
    impl Fetch for StaticFetch {
        fn fetch(&self, url: &str) -> Result<String> {
            Ok(format!("fetched {url}"))
        }
    }

    #[test]
    fn test_task_paths() -> Result<()> {
        let dir = tempdir()?;
        std::fs::create_dir_all(dir.path().join("procedures"))?;
        std::fs::create_dir_all(dir.path().join("tasks"))?;
        std::fs::write(dir.path().join("tasks/egress.yml"), "sibling")?;
        let procedure = dir.path().join("procedures/eva.yml");

        let mut source = DirSource::new(None);
        let text = source.read_task(&procedure, &TaskSource::File("egress.yml".to_owned()))?;
        assert_eq!(text, "sibling");

        let missing = source.read_task(&procedure, &TaskSource::File("nope.yml".to_owned()));
        assert!(missing.is_err());
        Ok(())
    }

    #[test]
    fn test_nested_tasks_dir() -> Result<()> {
        let dir = tempdir()?;
        std::fs::create_dir_all(dir.path().join("flat/tasks"))?;
        std::fs::write(dir.path().join("flat/tasks/egress.yml"), "nested")?;
        let procedure = dir.path().join("flat/eva.yml");

        let mut source = DirSource::new(None);
        let text = source.read_task(&procedure, &TaskSource::File("egress.yml".to_owned()))?;
        assert_eq!(text, "nested");
        Ok(())
    }

    #[test]
    fn test_url_tasks() -> Result<()> {
        let procedure = Path::new("procedures/eva.yml");
        let url = TaskSource::Url("https://example.com/t.yml".to_owned());

        let mut no_fetch = DirSource::new(None);
        assert!(no_fetch.read_task(procedure, &url).is_err());

        let fetcher = StaticFetch;
        let mut source = DirSource::new(Some(&fetcher));
        assert_eq!(source.read_task(procedure, &url)?, "fetched https://example.com/t.yml");
        Ok(())
    }
}
