// bicflow-core/src/ports/mod.rs

pub mod persistence;
pub mod predictor;

pub use persistence::{PairingReport, PersistenceGateway, Transaction};
pub use predictor::{Prediction, Predictor};
