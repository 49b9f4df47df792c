use super::error::{PatternError, PatternResult};
use super::host::{self, MAX_HOST_BYTES, MAX_LABEL_BYTES};
use std::sync::Arc;

use super::token::{ParsedPattern, Token};

/// Quotas enforced by the parser, per spec §4.A "Numeric semantics".
#[derive(Debug, Clone, Copy)]
pub struct ParserLimits {
    pub max_params_per_route: u16,
    pub max_param_key_bytes: u16,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_params_per_route: 16,
            max_param_key_bytes: 64,
        }
    }
}

/// Parses a `[host]/path` pattern string into a token stream.
///
/// See spec.md §4.A for the full grammar; this function implements it as a
/// single left-to-right scan rather than a separate lexer + parser pass,
/// since the grammar has no lookahead beyond "what's the next byte after a
/// closing brace".
#[tracing::instrument(level = "trace", skip(limits), fields(pattern_len = pattern.len()))]
pub fn parse_pattern(pattern: &str, limits: &ParserLimits) -> PatternResult<ParsedPattern> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }

    let (host_part, path_part, host_path_split) = if pattern.starts_with('/') {
        ("", pattern, 0)
    } else {
        match pattern.find('/') {
            Some(idx) => (&pattern[..idx], &pattern[idx..], idx),
            None => {
                return Err(PatternError::PathMustStartWithSlash {
                    pattern: pattern.to_string(),
                });
            }
        }
    };

    let mut tokens = Vec::new();
    let mut param_names = Vec::new();

    if !host_part.is_empty() {
        parse_host(host_part, &mut tokens, &mut param_names)?;
    }
    parse_path(path_part, pattern, &mut tokens, &mut param_names)?;

    let param_count = param_names.len() as u16;
    if param_count > limits.max_params_per_route {
        return Err(PatternError::TooManyParameters {
            count: param_count,
            limit: limits.max_params_per_route,
        });
    }
    for name in &param_names {
        if name.len() > limits.max_param_key_bytes as usize {
            return Err(PatternError::ParamKeyTooLarge {
                name: name.to_string(),
                len: name.len(),
                limit: limits.max_param_key_bytes,
            });
        }
    }

    Ok(ParsedPattern {
        tokens,
        param_count,
        host_path_split,
        param_names,
    })
}

fn parse_host(
    host_part: &str,
    tokens: &mut Vec<Token>,
    param_names: &mut Vec<Arc<str>>,
) -> PatternResult<()> {
    let labels = host::split_labels(host_part)?;
    let mut measured_len = 0usize;

    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            tokens.push(Token::Static {
                text: ".".into(),
                host_side: true,
            });
            measured_len += 1;
        }

        if label.contains('*') {
            return Err(PatternError::WildcardOnHostSide {
                name: label.to_string(),
            });
        }

        match label.find('{') {
            None => {
                host::validate_ldh_label(label, label)?;
                if label.len() > MAX_LABEL_BYTES {
                    return Err(PatternError::HostLabelTooLong {
                        label: label.to_string(),
                    });
                }
                measured_len += label.len();
                tokens.push(Token::Static {
                    text: (*label).into(),
                    host_side: true,
                });
            }
            Some(brace_idx) => {
                let prefix = &label[..brace_idx];
                let rest = &label[brace_idx..];
                if !rest.ends_with('}') {
                    return Err(PatternError::ParamNotSegmentSuffix {
                        pattern: label.to_string(),
                        name: rest.to_string(),
                    });
                }
                let name = &rest[1..rest.len() - 1];
                if name.is_empty() {
                    return Err(PatternError::EmptyParamName {
                        pattern: label.to_string(),
                    });
                }
                if name.contains('{') || name.contains('}') {
                    return Err(PatternError::ParamNotSegmentSuffix {
                        pattern: label.to_string(),
                        name: name.to_string(),
                    });
                }
                host::validate_ldh_label(prefix, label)?;
                if prefix.len() + 1 > MAX_LABEL_BYTES {
                    return Err(PatternError::HostLabelTooLong {
                        label: label.to_string(),
                    });
                }
                measured_len += prefix.len();
                if !prefix.is_empty() {
                    tokens.push(Token::Static {
                        text: prefix.into(),
                        host_side: true,
                    });
                }
                tokens.push(Token::Param {
                    name: name.into(),
                    host_side: true,
                });
                param_names.push(name.into());
            }
        }
    }

    if measured_len > MAX_HOST_BYTES {
        return Err(PatternError::HostTooLong {
            host: host_part.to_string(),
        });
    }

    Ok(())
}

fn parse_path(
    path_part: &str,
    full_pattern: &str,
    tokens: &mut Vec<Token>,
    param_names: &mut Vec<Arc<str>>,
) -> PatternResult<()> {
    if !path_part.starts_with('/') {
        return Err(PatternError::PathMustStartWithSlash {
            pattern: full_pattern.to_string(),
        });
    }

    let bytes = path_part.as_bytes();
    let mut literal_start = 0usize;
    let mut i = 0usize;
    let mut last_was_wildcard_with_no_gap = false;

    while i < bytes.len() {
        let b = bytes[i];
        if b < 0x20 || b == 0x7f {
            return Err(PatternError::ControlByte {
                pattern: full_pattern.to_string(),
                offset: i,
                byte: b,
            });
        }

        if b == b'{' {
            flush_static(&path_part[literal_start..i], tokens);
            let had_literal_gap = i > literal_start;
            let close = find_close_brace(bytes, i, full_pattern)?;
            let name = &path_part[i + 1..close];
            if name.is_empty() {
                return Err(PatternError::EmptyParamName {
                    pattern: full_pattern.to_string(),
                });
            }
            check_byte_after_close(bytes, close, full_pattern)?;
            tokens.push(Token::Param {
                name: name.into(),
                host_side: false,
            });
            param_names.push(name.into());
            i = close + 1;
            literal_start = i;
            last_was_wildcard_with_no_gap = false;
            let _ = had_literal_gap;
            continue;
        }

        if b == b'*' {
            flush_static(&path_part[literal_start..i], tokens);
            let had_literal_gap = i > literal_start;
            if last_was_wildcard_with_no_gap && !had_literal_gap {
                return Err(PatternError::ConsecutiveWildcards {
                    pattern: full_pattern.to_string(),
                });
            }
            if i + 1 >= bytes.len() || bytes[i + 1] != b'{' {
                return Err(PatternError::MalformedWildcard {
                    pattern: full_pattern.to_string(),
                });
            }
            let close = find_close_brace(bytes, i + 1, full_pattern)?;
            let name = &path_part[i + 2..close];
            if name.is_empty() {
                return Err(PatternError::EmptyParamName {
                    pattern: full_pattern.to_string(),
                });
            }
            check_byte_after_close(bytes, close, full_pattern)?;
            let infix = close + 1 < bytes.len();
            tokens.push(Token::Wildcard {
                name: name.into(),
                infix,
            });
            param_names.push(name.into());
            i = close + 1;
            literal_start = i;
            last_was_wildcard_with_no_gap = true;
            continue;
        }

        i += 1;
    }

    flush_static(&path_part[literal_start..], tokens);
    Ok(())
}

fn flush_static(text: &str, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        tokens.push(Token::Static {
            text: text.into(),
            host_side: false,
        });
    }
}

fn find_close_brace(bytes: &[u8], open_brace_idx: usize, full_pattern: &str) -> PatternResult<usize> {
    memchr::memchr(b'}', &bytes[open_brace_idx..])
        .map(|rel| open_brace_idx + rel)
        .ok_or_else(|| PatternError::UnterminatedParam {
            pattern: full_pattern.to_string(),
        })
}

fn check_byte_after_close(bytes: &[u8], close_idx: usize, full_pattern: &str) -> PatternResult<()> {
    match bytes.get(close_idx + 1) {
        None => Ok(()),
        Some(b'/') => Ok(()),
        Some(&other) => Err(PatternError::UnexpectedByteAfterPlaceholder {
            pattern: full_pattern.to_string(),
            found: other as char,
        }),
    }
}
