use crate::Result;
use camino::Utf8Path;
use cel_interpreter::Program;
use core::fmt;
use ohno::{IntoAppError, app_err};
use std::fs;

/// An externally authored policy, compiled once and reused for every
/// evaluation.
pub struct PolicyDocument {
    program: Program,
    source: String,
}

impl PolicyDocument {
    /// Read and compile a policy document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not compile.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let source =
            fs::read_to_string(path).into_app_err_with(|| format!("reading policy document '{path}'"))?;
        Self::from_source(source)
    }

    /// Compile a policy document from source text.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not compile.
    pub fn from_source(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let program =
            Program::compile(&source).map_err(|e| app_err!("could not compile policy document: {e}"))?;

        Ok(Self { program, source })
    }

    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for PolicyDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyDocument")
            .field("source_len", &self.source.len())
            .finish_non_exhaustive()
    }
}
