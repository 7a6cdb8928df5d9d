use thiserror::Error;

use crate::catalog::CatalogError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to load course catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("server i/o error: {0}")]
    Io(#[from] std::io::Error),
}
