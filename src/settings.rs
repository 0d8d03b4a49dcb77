use std::path::PathBuf;
use std::time::Duration;

use crate::args::{Args, Format};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Procedure file does not exist: \"{0}\"")]
    ProcedureNotFound(String),
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. paths are canonicalized and duplicates removed.
#[derive(Debug)]
pub struct Settings {
    pub procedures: Vec<PathBuf>,
    pub output: PathBuf,
    pub formats: Vec<Format>,
    pub verbose: u8,
    pub dry_run: bool,
    /// None if url tasks may not be fetched
    pub fetch_timeout: Option<Duration>,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let mut procedures = Vec::with_capacity(args.procedures.len());
        for procedure in &args.procedures {
            let path = PathBuf::from(procedure);
            if !path.exists() {
                return Err(Error::ProcedureNotFound(procedure.clone()).into());
            }
            procedures.push(path.canonicalize()?);
        }

        let mut formats = Vec::with_capacity(args.formats.len());
        for format in args.formats {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            formats.push(Format::Html);
        }

        let fetch_timeout = if args.no_fetch {
            None
        } else {
            Some(Duration::from_secs(args.fetch_timeout))
        };

        Ok(Self {
            procedures,
            output: PathBuf::from(&args.output),
            formats,
            verbose: args.verbose,
            dry_run: args.dry_run,
            fetch_timeout,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_settings_from_args() -> Result<()> {
        let dir = tempdir()?;
        let procedure = dir.path().join("eva.yml");
        std::fs::write(&procedure, "procedure_name: EVA")?;
        let procedure = procedure.to_str().unwrap().to_owned();

        let args = Args::try_parse_from([
            "maestro", &procedure, "-f", "text", "-f", "text", "-f", "html", "-vv", "--no-fetch",
        ])?;
        let settings = Settings::try_from(args)?;
        assert_eq!(settings.procedures.len(), 1);
        assert!(settings.procedures[0].is_absolute());
        assert_eq!(settings.formats, vec![Format::Text, Format::Html]);
        assert_eq!(settings.verbose, 2);
        assert!(settings.fetch_timeout.is_none());
        assert_eq!(settings.output, PathBuf::from("build"));
        Ok(())
    }

    #[test]
    fn test_missing_procedure() -> Result<()> {
        let args = Args::try_parse_from(["maestro", "/no/such/procedure.yml"])?;
        let err = Settings::try_from(args).unwrap_err();
        assert!(err.to_string().contains("/no/such/procedure.yml"));
        Ok(())
    }
}
