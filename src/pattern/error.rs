use thiserror::Error;

/// Reasons the pattern parser (component A) rejects a pattern string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("control character (byte {byte:#04x}) at offset {offset} in pattern '{pattern}'")]
    ControlByte {
        pattern: String,
        offset: usize,
        byte: u8,
    },
    #[error("path must start with '/': '{pattern}'")]
    PathMustStartWithSlash { pattern: String },
    #[error("hostname label exceeds 63 bytes: '{label}'")]
    HostLabelTooLong { label: String },
    #[error("hostname exceeds 255 bytes (excluding placeholders): '{host}'")]
    HostTooLong { host: String },
    #[error("hostname label '{label}' is empty")]
    HostLabelEmpty { label: String },
    #[error("hostname label '{label}' violates the letter-digit-hyphen rule")]
    HostLabelNotLdh { label: String },
    #[error("hostname '{host}' has a leading or trailing dot")]
    HostDotPlacement { host: String },
    #[error("parameter '{{{name}}}' is not the last thing in its segment: '{pattern}'")]
    ParamNotSegmentSuffix { pattern: String, name: String },
    #[error("'*' not immediately followed by '{{' in pattern '{pattern}'")]
    MalformedWildcard { pattern: String },
    #[error("empty parameter name in pattern '{pattern}'")]
    EmptyParamName { pattern: String },
    #[error("unterminated parameter (missing '}}') in pattern '{pattern}'")]
    UnterminatedParam { pattern: String },
    #[error("catch-all '*{{{name}}}' is only valid on the path side")]
    WildcardOnHostSide { name: String },
    #[error("two consecutive catch-alls in pattern '{pattern}'")]
    ConsecutiveWildcards { pattern: String },
    #[error(
        "byte after closing '}}' must be the segment delimiter or end of string, found {found:?} in '{pattern}'"
    )]
    UnexpectedByteAfterPlaceholder { pattern: String, found: char },
    #[error("pattern declares {count} parameters, exceeding the limit of {limit}")]
    TooManyParameters { count: u16, limit: u16 },
    #[error("parameter name '{name}' ({len} bytes) exceeds the limit of {limit} bytes")]
    ParamKeyTooLarge { name: String, len: usize, limit: u16 },
}

pub type PatternResult<T> = Result<T, PatternError>;
