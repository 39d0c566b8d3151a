use crate::resolver::Operation;

/// Wrong number or wrong runtime type of arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("insufficient arguments: {operation} requires at least {required}, got {supplied}")]
    Insufficient {
        operation: Operation,
        required: usize,
        supplied: usize,
    },

    #[error("too many arguments: {operation} accepts at most {allowed}, got {supplied}")]
    TooMany {
        operation: Operation,
        allowed: usize,
        supplied: usize,
    },

    #[error("invalid type: {0}")]
    InvalidType(&'static str),
}

/// Input that has the right type but does not follow its grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("primary input must be a concept URI or term-list path, got `{0}`")]
    Input(String),

    #[error("filter must be a valid concept URI, got `{0}`")]
    Filter(String),
}

/// Any failure raised while turning caller input into a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
