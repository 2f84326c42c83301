//! Key/value configuration read from an environment file, layered with the process
//! environment.
//!
//! Nothing here writes to the process environment. The file's values are kept in an
//! `Environment` and consulted alongside `std::env`.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Which side wins when a key is set both in the process and in the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precedence {
    /// Values already in the process environment are kept, like dotenv loaders do.
    #[default]
    Process,
    /// Values from the file replace the process environment.
    File,
}

/// The variables of an environment file on top of the process environment.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    path: Option<PathBuf>,
    vars: HashMap<String, String>,
    precedence: Precedence,
}

impl Environment {
    /// Load the file at `path`. With `None` no file is read and only the process
    /// environment is visible.
    ///
    /// Lines that cannot be parsed are skipped with a warning. Failing to read the
    /// file is an error.
    ///
    /// Unquoted and double-quoted values go through `$VAR` and `${VAR}` substitution,
    /// with unknown variables replaced by nothing. A token containing `$` must be
    /// single-quoted to be read as written.
    pub fn load(path: Option<&Path>) -> Result<Environment> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Environment::default()),
        };

        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path)? {
            match item {
                Ok((key, value)) => {
                    vars.insert(key, value);
                }
                Err(dotenvy::Error::LineParse(line, index)) => {
                    warn!("skipping unparsable line in {} at {}: {}", path.display(), index, line);
                }
                Err(err) => return Err(err.into()),
            }
        }
        debug!("loaded {} variables from {}", vars.len(), path.display());

        Ok(Environment {
            path: Some(path.to_owned()),
            vars,
            precedence: Precedence::default(),
        })
    }

    /// Build an `Environment` from pairs instead of a file.
    pub fn from_pairs<I, K, V>(pairs: I) -> Environment
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Environment {
            path: None,
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            precedence: Precedence::default(),
        }
    }

    /// Choose which side wins on conflicting keys.
    pub fn with_precedence(mut self, precedence: Precedence) -> Environment {
        self.precedence = precedence;
        self
    }

    /// The file these variables were read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of variables read from the file.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the file provided no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Look up `key`, consulting the process environment and the file in precedence order.
    pub fn get(&self, key: &str) -> Option<String> {
        let from_file = || self.vars.get(key).cloned();
        let from_process = || env::var(key).ok();

        match self.precedence {
            Precedence::Process => from_process().or_else(from_file),
            Precedence::File => from_file().or_else(from_process),
        }
    }

    /// Look up `key`, rendering a missing value as an empty string.
    pub fn get_or_empty(&self, key: &str) -> String {
        self.get(key).unwrap_or_default()
    }
}
