//! Shared range-validation helpers used by the domain validators.

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(
    errors: &mut Vec<String>,
    name: &str,
    value: u32,
    (min, max): (u32, u32),
) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
