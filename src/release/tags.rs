// src/release/tags.rs

//! Required-tag matching

/// Whether the provided tags satisfy a content's required tags
///
/// No required tags means no constraint. Otherwise some provided tag must be
/// a prefix of some required tag: installed products advertise short tags
/// (`rhel-11`) while content asks for more specific ones (`rhel-11-x86_64`).
pub fn is_any_required_tag_provided<R, P>(required: &[R], provided: &[P]) -> bool
where
    R: AsRef<str>,
    P: AsRef<str>,
{
    if required.is_empty() {
        return true;
    }

    required.iter().any(|required| {
        provided
            .iter()
            .any(|provided| required.as_ref().starts_with(provided.as_ref()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn test_no_required_tags() {
        assert!(is_any_required_tag_provided(NONE, NONE));
        assert!(is_any_required_tag_provided(NONE, &["rhel-11"]));
    }

    #[test]
    fn test_nothing_provided() {
        assert!(!is_any_required_tag_provided(&["rhel-11"], NONE));
    }

    #[test]
    fn test_prefix_match() {
        assert!(is_any_required_tag_provided(&["rhel-11", "rhel-11-x86_64"], &["rhel-11"]));
        assert!(is_any_required_tag_provided(&["rhel-11-x86_64"], &["rhel-11"]));
        assert!(is_any_required_tag_provided(
            &["rhel-12".to_string()],
            &["rhel-9".to_string(), "rhel-12".to_string()]
        ));
    }

    #[test]
    fn test_match_is_not_reversed() {
        // A required tag shorter than the provided one does not match
        assert!(!is_any_required_tag_provided(&["rhel-11"], &["rhel-11-x86_64"]));
    }

    #[test]
    fn test_no_match() {
        assert!(!is_any_required_tag_provided(&["rhel-12"], &["rhel-11"]));
    }
}
