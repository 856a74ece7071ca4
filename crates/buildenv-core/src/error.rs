use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("invalid image name {0}")]
    InvalidImageName(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
