use crate::config::DaemonConfig;
use crate::domain::model::Request;
use crate::utils::error::{ControlError, Result};
use std::path::{Component, Path, PathBuf};

/// Allow-list the daemon checks before touching the filesystem or spawning
/// anything. An empty list denies every request of that kind.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    write_prefixes: Vec<PathBuf>,
    programs: Vec<String>,
}

impl Policy {
    pub fn new<P, S>(write_prefixes: P, programs: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<PathBuf>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            write_prefixes: write_prefixes.into_iter().map(Into::into).collect(),
            programs: programs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &DaemonConfig) -> Self {
        Self::new(
            config.allowed_write_prefixes.iter().cloned(),
            config.allowed_programs.iter().cloned(),
        )
    }

    pub fn check(&self, request: &Request) -> Result<()> {
        match request {
            Request::Write { path, .. } => self.check_write(path),
            Request::Run { program, .. } => self.check_program(program),
        }
    }

    fn check_write(&self, path: &str) -> Result<()> {
        let normalized = normalize(Path::new(path)).ok_or_else(|| ControlError::PolicyDenied {
            target: format!("write to {} (relative or contains '..')", path),
        })?;

        if self
            .write_prefixes
            .iter()
            .any(|prefix| normalized.starts_with(prefix))
        {
            Ok(())
        } else {
            Err(ControlError::PolicyDenied {
                target: format!("write to {}", path),
            })
        }
    }

    fn check_program(&self, program: &str) -> Result<()> {
        if !program.contains('/') && self.programs.iter().any(|p| p == program) {
            Ok(())
        } else {
            Err(ControlError::PolicyDenied {
                target: format!("run {}", program),
            })
        }
    }
}

/// Lexical normalization: absolute paths only, `.` dropped, any `..` rejected.
fn normalize(path: &Path) -> Option<PathBuf> {
    if !path.is_absolute() {
        return None;
    }
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push("/"),
            Component::CurDir => {}
            Component::Normal(part) => out.push(part),
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}
