use derive_new::new;
use thiserror::Error;

#[derive(new, Error, Debug, PartialEq, Clone)]
#[error("{msg}")]
/// An error reported by an instrument driver.
pub struct InstrumentError {
    msg: String,
}

impl InstrumentError {
    /// The message of the error.
    #[must_use]
    pub fn msg(&self) -> &str {
        &self.msg
    }
}
