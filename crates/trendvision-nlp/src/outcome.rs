//! Per-record model results.

/// Why a model result fell back to its default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultReason {
    /// The input text was empty or had nothing to work with.
    EmptyInput,
    /// The model call failed.
    ModelError(String),
}

/// Result of one model call on one record: either a real value or the
/// documented default for this model together with the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome<T> {
    Value(T),
    Defaulted { value: T, reason: DefaultReason },
}

impl<T> ModelOutcome<T> {
    pub fn defaulted(value: T, reason: DefaultReason) -> Self {
        Self::Defaulted { value, reason }
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Value(v) | Self::Defaulted { value: v, .. } => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Value(v) | Self::Defaulted { value: v, .. } => v,
        }
    }
}
