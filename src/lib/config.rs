//! Job parameters: `jobname`, the `\input` search path, and anything else
//! a caller supplies once before building an [`Environment`] and running
//! the pipeline. This is the ambient "configuration" layer the engine
//! itself has no opinion about. Real TeX defaults `jobname` to `texput`
//! when reading from the terminal, or to the first input file's stem
//! otherwise; this layer leaves the choice to the caller.

use crate::env::Environment;
use std::path::{Path, PathBuf};

/// The name TeX uses when no input file gives it one, e.g. reading from
/// standard input.
pub const DEFAULT_JOBNAME: &str = "texput";

/// Parameters collected once, before the pipeline runs: which job this is,
/// and where `\input` should look for files it can't find relative to the
/// current directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// This job's name, used for default output filenames.
    pub jobname: String,
    /// Additional directories `\input`/`\openin` should search, in order,
    /// after the current directory.
    pub input_path: Vec<PathBuf>,
}

impl Config {
    /// A config named `jobname`, with no extra search path.
    #[must_use]
    pub fn new(jobname: impl Into<String>) -> Self {
        Self {
            jobname: jobname.into(),
            input_path: Vec::new(),
        }
    }

    /// Derives a config from the first input filename, following real
    /// TeX's rule: `jobname` is that file's stem, or [`DEFAULT_JOBNAME`]
    /// when reading from standard input.
    #[must_use]
    pub fn from_first_input(filename: Option<&Path>) -> Self {
        let jobname = filename
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_JOBNAME);
        Self::new(jobname)
    }

    #[must_use]
    pub fn with_input_path(mut self, path: Vec<PathBuf>) -> Self {
        self.input_path = path;
        self
    }

    /// Builds a fresh [`Environment`] for this job. Category-code and
    /// lccode/uccode defaults come from `Environment::new` itself
    /// (IniTeX's defaults); `Config` supplies the job name and the
    /// `\input` search path.
    #[must_use]
    pub fn build_environment(&self) -> Environment {
        let mut env = Environment::new(self.jobname.clone());
        env.input_path = self.input_path.clone();
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobname_defaults_to_texput_without_a_file() {
        assert_eq!(Config::from_first_input(None).jobname, DEFAULT_JOBNAME);
    }

    #[test]
    fn jobname_is_the_input_files_stem() {
        let config = Config::from_first_input(Some(Path::new("chapter1.tex")));
        assert_eq!(config.jobname, "chapter1");
    }
}
