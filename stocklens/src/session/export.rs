use stocklens_core::{ExportFormat, ExportRequest, ValidationError};

use super::selection::SelectionState;

/// Derives download requests from the live selection.
///
/// The request wraps exactly the [`HistoryQuery`](stocklens_core::HistoryQuery)
/// a fetch of the same selection sends. Fetched results are never consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportBuilder {
    format: ExportFormat,
}

impl ExportBuilder {
    /// Builder for the given format.
    #[must_use]
    pub const fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Export request for `selection`.
    ///
    /// # Errors
    /// `NoSymbol` without a symbol, `MissingRange` in custom mode without both dates.
    pub fn build(&self, selection: &SelectionState) -> Result<ExportRequest, ValidationError> {
        Ok(ExportRequest {
            query: selection.query()?,
            format: self.format,
        })
    }
}
