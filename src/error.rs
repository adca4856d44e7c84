use thiserror::Error;

/// Errors reported by [`TreeInspector`](crate::TreeInspector) operations.
///
/// Most operations degrade silently instead; only calls that name a specific
/// item can be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum InspectorError {
    /// The item has no children, so it cannot be collapsed.
    #[error("item has no children and cannot be collapsed")]
    NotCollapsible,

    /// The id is not part of the current snapshot.
    #[error("item is not part of the current snapshot")]
    UnknownItem,

    /// The item exists but is not shown, so it cannot be scrolled to.
    #[error("item is hidden by the current view")]
    Hidden,

    /// The item is not a nested host.
    #[error("item is not a nested host")]
    NotSubHost,
}

pub type Result<T, E = InspectorError> = std::result::Result<T, E>;
