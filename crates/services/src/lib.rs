#![forbid(unsafe_code)]

pub mod error;
pub mod transfer_service;

pub use error::TransferError;
pub use transfer_service::{MediaTransferService, TransferReport};
