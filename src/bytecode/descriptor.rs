//! Type descriptor parsing.
//!
//! Class references hide in two textual forms: raw Class constants (internal
//! names or array descriptors) and field/method descriptors. Internal `/`
//! separators are translated to `.`; primitives and `void` are no references.

use crate::error::{AnalysisError, Result};
use std::collections::BTreeSet;

/// Extracts the class name from a raw Class constant value.
///
/// The value is either an internal name like `a/b/C` or an array descriptor
/// starting with `[`. Arrays of primitives yield `None`.
pub fn class_constant_name(raw: &str) -> Option<String> {
    if let Some(stripped) = raw.strip_prefix('[') {
        let element = stripped.trim_start_matches('[');
        return element
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
            .map(|name| name.replace('/', "."));
    }
    Some(raw.replace('/', "."))
}

/// Collects every `Lname;` object type mentioned in a field or method
/// descriptor into `out`.
pub fn collect_descriptor_names(descriptor: &str, out: &mut BTreeSet<String>) -> Result<()> {
    let bytes = descriptor.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'L' {
            let end = descriptor[pos + 1..].find(';').ok_or_else(|| {
                AnalysisError::bad_class_file(format!("unterminated object type in {descriptor:?}"))
            })?;
            out.insert(descriptor[pos + 1..pos + 1 + end].replace('/', "."));
            pos += end + 2;
        } else {
            pos += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_in(descriptor: &str) -> Vec<String> {
        let mut out = BTreeSet::new();
        collect_descriptor_names(descriptor, &mut out).unwrap();
        out.into_iter().collect()
    }

    #[test]
    fn test_internal_name() {
        assert_eq!(class_constant_name("a/b/C"), Some("a.b.C".to_string()));
    }

    #[test]
    fn test_array_of_objects() {
        assert_eq!(class_constant_name("[La/B;"), Some("a.B".to_string()));
        assert_eq!(class_constant_name("[[La/B;"), Some("a.B".to_string()));
    }

    #[test]
    fn test_array_of_primitives_is_discarded() {
        assert_eq!(class_constant_name("[I"), None);
        assert_eq!(class_constant_name("[[D"), None);
    }

    #[test]
    fn test_method_descriptor() {
        assert_eq!(
            names_in("(ILjava/lang/String;[La/B;)La/C;"),
            vec!["a.B", "a.C", "java.lang.String"]
        );
    }

    #[test]
    fn test_primitive_only_descriptor() {
        assert!(names_in("(IJZ)V").is_empty());
        assert!(names_in("D").is_empty());
    }

    #[test]
    fn test_unterminated_descriptor_is_an_error() {
        let mut out = BTreeSet::new();
        let result = collect_descriptor_names("(La/B)V", &mut out);
        assert!(matches!(result, Err(AnalysisError::BadClassFile { .. })));
    }
}
