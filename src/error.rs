use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("missing table {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("cannot parse {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("id {id} has no entry in the name table")]
    UnresolvedIdentifier { id: i64 },

    #[error("cannot list instances under {}: {source}", path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("drawing failed: {0}")]
    Render(String),

    #[error("cannot write PDF {}: {reason}", path.display())]
    PdfWrite { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("instance `{instance}` failed at {}: {source}", file.display())]
    Instance {
        instance: String,
        file: PathBuf,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    /// Attaches the instance folder and the file being processed.
    pub fn in_instance(self, instance: &str, file: impl Into<PathBuf>) -> Self {
        ReportError::Instance {
            instance: instance.to_string(),
            file: file.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, unwrapping instance context.
    pub fn root(&self) -> &ReportError {
        match self {
            ReportError::Instance { source, .. } => source.root(),
            other => other,
        }
    }
}
