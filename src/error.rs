use derive_more::{Display, From};
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, From)]
pub enum Error {
    #[from]
    Io(std::io::Error),

    #[display("{}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[display("Configuration error: {msg}")]
    Config { msg: String },

    #[display("Template error: {msg}")]
    Template { msg: String },

    #[display("Index request failed: {_0}")]
    #[from]
    Http(reqwest::Error),

    #[display("Malformed index response for {package}: {msg}")]
    MalformedResponse { package: String, msg: String },

    #[display("Failed to write snapshot: {_0}")]
    #[from]
    Yaml(serde_yaml::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::File { source, .. } => Some(source),
            Error::Http(e) => Some(e),
            Error::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tera::Error> for Error {
    fn from(e: tera::Error) -> Self {
        // tera keeps the useful part (line/column) in the source chain
        let mut msg = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            msg.push_str(": ");
            msg.push_str(&cause.to_string());
            source = cause.source();
        }
        Error::Template { msg }
    }
}

/// Attach the offending path to an I/O error
pub trait ResultIoExt<T> {
    fn map_io_err(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ResultIoExt<T> for std::result::Result<T, std::io::Error> {
    fn map_io_err(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::File {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}
