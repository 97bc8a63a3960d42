use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid plot configuration: {0}")]
    Configuration(String),

    #[error("series name `{name}` is already registered")]
    DuplicateName { name: String },

    #[error("no series matches selector `{selector}`")]
    NotFound { selector: String },

    #[error("series `{name}` has payload kind `{kind}`, which {operation} does not accept")]
    TypeMismatch {
        name: String,
        kind: &'static str,
        operation: &'static str,
    },

    #[error("series `{name}` is a stacked aggregate and cannot join another stack")]
    NestedStack { name: String },

    #[error("series `{name}` is a stacked aggregate and cannot be read as a distribution")]
    StackedRead { name: String },

    #[error("series `{name}` is a stacked aggregate and cannot be normalized")]
    StackedNormalize { name: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
