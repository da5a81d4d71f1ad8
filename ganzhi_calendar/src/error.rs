//! Error surface of the calendar crate.

use thiserror::Error;

/// Errors raised while turning timestamp text into calendar values.
///
/// The two variants are deliberately distinct: `Parse` means the text did not
/// match any accepted layout at all, `InvalidDate` means the layout matched
/// but a calendar component was out of range (month 13, February 30, hour 25).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// The input matched none of the accepted timestamp layouts.
    #[error("unrecognized datetime layout: {input:?}")]
    Parse {
        /// The offending input text.
        input: String,
    },

    /// A component parsed but names an impossible calendar value.
    #[error("invalid calendar value in {input:?}: {detail}")]
    InvalidDate {
        /// The offending input text.
        input: String,
        /// Which component was rejected and why.
        detail: String,
    },
}
