use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eyre_reports_become_generic_errors() {
        let err = Error::from(eyre::eyre!("bad grammar"));
        assert_eq!(err.to_string(), "Generic error: bad grammar");
    }
}
