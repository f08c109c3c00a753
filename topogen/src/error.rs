// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Error {
    /// Unknown topology token, wrong parameter count, or bad geometry/config values.
    Configuration { descriptor: String, reason: String },
    /// A loaded layout does not match the graph or the expected rack count.
    GeometryMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A constrained random build could not reach an acceptable edge count.
    DegreeInfeasible {
        requested: usize,
        achieved: usize,
        reason: String,
    },
    /// A malformed line in an edge-list or coordinate file.
    Parse { line: usize, content: String },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    pub fn configuration(descriptor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            descriptor: descriptor.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Configuration { descriptor, reason } => {
                write!(f, "invalid configuration '{}': {}", descriptor, reason)
            }
            Self::GeometryMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "layout mismatch: expected {} {}, found {}",
                expected, what, found
            ),
            Self::DegreeInfeasible {
                requested,
                achieved,
                reason,
            } => write!(
                f,
                "random wiring infeasible for degree {} ({} edges built): {}",
                requested, achieved, reason
            ),
            Self::Parse { line, content } => {
                write!(f, "cannot parse line {}: '{}'", line, content)
            }
            Self::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn infeasible_message() {
        let error = Error::DegreeInfeasible {
            requested: 4,
            achieved: 3,
            reason: "best of 10 trials reached 3 of 16 edges".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "random wiring infeasible for degree 4 (3 edges built): best of 10 trials reached 3 of 16 edges"
        );
    }

    #[test]
    fn configuration_message() {
        let error = Error::configuration("db-2-3", "expected 8 nodes");
        assert_eq!(error.to_string(), "invalid configuration 'db-2-3': expected 8 nodes");
        assert!(std::error::Error::source(&error).is_none());
    }
}
