use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a type environment.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("failed to read stub file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed stub JSON in {origin}: {message}")]
    MalformedStub { origin: String, message: String },

    #[error("class {fqn} is declared both as {first} and as {second}")]
    ConflictingClassKind {
        fqn: String,
        first: String,
        second: String,
    },

    #[error("class {fqn} extends unknown type {supertype}")]
    UnknownSupertype { fqn: String, supertype: String },

    #[error("member {member} added to unknown class {owner}")]
    UnknownOwner { owner: String, member: String },
}
