//! File upload: the transfer executor and the authorize-then-transfer pipeline.

pub mod pipeline;
pub mod transfer;

pub use pipeline::{access_url, upload_file, UploadError, UploadOutcome};
pub use transfer::{HttpTransfer, TransferError, TransferExecutor};
