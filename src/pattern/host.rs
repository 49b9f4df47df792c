use super::error::{PatternError, PatternResult};

pub const MAX_LABEL_BYTES: usize = 63;
pub const MAX_HOST_BYTES: usize = 255;

/// Validates a literal hostname label (or the literal prefix of a label that
/// ends in a `{name}` placeholder) against the letter-digit-hyphen rule.
/// Placeholder text itself is exempt, per spec §4.A / §6.
pub fn validate_ldh_label(label: &str, whole_label_for_errors: &str) -> PatternResult<()> {
    if label.is_empty() {
        return Ok(());
    }
    let bytes = label.as_bytes();
    if bytes[0] == b'-' || bytes[bytes.len() - 1] == b'-' {
        return Err(PatternError::HostLabelNotLdh {
            label: whole_label_for_errors.to_string(),
        });
    }
    for &b in bytes {
        let ok = b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-';
        if !ok {
            return Err(PatternError::HostLabelNotLdh {
                label: whole_label_for_errors.to_string(),
            });
        }
    }
    Ok(())
}

/// Splits a hostname on `.`, validating dot placement (no leading/trailing
/// dot, no consecutive dots / empty labels).
pub fn split_labels(host: &str) -> PatternResult<Vec<&str>> {
    if host.starts_with('.') || host.ends_with('.') {
        return Err(PatternError::HostDotPlacement {
            host: host.to_string(),
        });
    }
    let labels: Vec<&str> = host.split('.').collect();
    for label in &labels {
        if label.is_empty() {
            return Err(PatternError::HostDotPlacement {
                host: host.to_string(),
            });
        }
    }
    Ok(labels)
}
