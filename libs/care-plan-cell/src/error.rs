use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarePlanError {
    #[error("Storage error: {0}")]
    Store(#[from] shared_store::StoreError),

    #[error("Corrupt partition document: {0}")]
    Corrupt(#[from] serde_json::Error),
}
