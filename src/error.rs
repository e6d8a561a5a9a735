//! Bus failure taxonomy
//!
//! Every failure on the shared command bus is fatal for the animation: the
//! error is propagated to whoever drives the scheduler and nothing retries.

use embedded_hal::i2c::ErrorKind;

/// Failure reported by a bus transaction to either device
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Addressed device did not acknowledge
    #[display("device did not acknowledge")]
    NoAcknowledge,
    /// Another controller won bus arbitration
    #[display("bus arbitration lost")]
    ArbitrationLoss,
    /// Misplaced start/stop condition or similar electrical fault
    #[display("bus fault")]
    Bus,
    /// Controller could not keep up with the transfer
    #[display("transfer overrun")]
    Overrun,
    /// Payload does not fit into a single transaction
    #[display("payload exceeds transaction capacity")]
    Capacity,
    /// Anything the transport could not classify
    #[display("unclassified bus error")]
    Other,
}

impl BusError {
    /// Classify an `embedded-hal` I2C error
    pub fn from_hal<E: embedded_hal::i2c::Error>(error: &E) -> Self {
        Self::from(error.kind())
    }
}

impl From<ErrorKind> for BusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::NoAcknowledge,
            ErrorKind::ArbitrationLoss => Self::ArbitrationLoss,
            ErrorKind::Bus => Self::Bus,
            ErrorKind::Overrun => Self::Overrun,
            _ => Self::Other,
        }
    }
}

/// Result of a bus-touching operation
pub type Result<T, E = BusError> = core::result::Result<T, E>;
