//! Error types.
//!
//! Layout is pure computation: the only failures come from the measurement
//! collaborators, and they are propagated unchanged to the caller of
//! `layout()` (or of a query that had to re-run it).

use thiserror::Error;

use crate::object::{ComponentId, FontId, ImageId};

/// A measurement collaborator could not answer a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// The font handle is not registered with the measurer.
    #[error("unknown font {0:?}")]
    UnknownFont(FontId),
    /// The image handle is not registered with the sizer.
    #[error("unknown image {0:?}")]
    UnknownImage(ImageId),
    /// The component handle is not registered with the sizer.
    #[error("unknown component {0:?}")]
    UnknownComponent(ComponentId),
    /// The font has no glyph for a character and the measurer has no fallback.
    #[error("font {font:?} has no glyph for {ch:?}")]
    MissingGlyph {
        /// Font that was queried.
        font: FontId,
        /// Character without a glyph.
        ch: char,
    },
}

/// Failure while laying out a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Measuring an inline object failed.
    #[error("failed to measure object #{object}: {source}")]
    Measure {
        /// Index of the object in document order.
        object: usize,
        /// Underlying measurement error.
        #[source]
        source: MeasureError,
    },
}

impl LayoutError {
    /// Attach the index of the object being measured to a [`MeasureError`].
    #[must_use]
    pub const fn measure(object: usize, source: MeasureError) -> Self {
        Self::Measure { object, source }
    }
}
