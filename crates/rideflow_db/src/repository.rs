//! Repository factory trait
//!
//! A small seam that lets the backend construct repositories without
//! knowing their concrete constructor shapes.

/// A trait for database repository factories
///
/// Generic over the repository type and the configuration (usually the
/// database client) it is built from.
pub trait RepositoryFactory<R, C> {
    /// Create a new repository instance.
    fn create_repository(&self, config: C) -> R;
}
