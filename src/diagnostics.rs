//! Shared message formatting for errors and warnings.

/// Normalize an error message: trimmed, no trailing period.
pub fn error_message(msg: impl Into<String>) -> String {
    let msg = msg.into();
    msg.trim().trim_end_matches('.').to_string()
}

/// Emit a non-fatal warning through the tracing subscriber.
pub fn warn(msg: impl Into<String>) {
    tracing::warn!("{}", error_message(msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_trims_whitespace_and_trailing_period() {
        assert_eq!(error_message("  no nodes found.\n"), "no nodes found");
        assert_eq!(error_message("kube.json"), "kube.json");
    }
}
