//! Ordered header multimap shared by requests, responses and serdes contexts.

/// HTTP headers as insertion-ordered (name, value) pairs.
///
/// Name lookup is case-insensitive; stored names keep their original casing.
/// `Clone` produces the deep, isolated copy that serialization contexts rely
/// on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing values for the same name.
    pub fn set(&mut self, name: &str, value: &str) {
        self.entries
            .retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.entries.push((name.to_string(), value.to_string()));
    }

    /// Add a header value without touching existing values for the name.
    pub fn append(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_string(), value.to_string()));
    }

    /// First value for `name`, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_case_insensitively() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        headers.set("content-type", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_append_keeps_all_values() {
        let mut headers = Headers::new();
        headers.append("Accept", "application/json");
        headers.append("Accept", "application/xml");
        let values: Vec<&str> = headers.get_all("accept").collect();
        assert_eq!(values, vec!["application/json", "application/xml"]);
        assert_eq!(headers.get("Accept"), Some("application/json"));
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let mut headers = Headers::new();
        headers.set("B", "2");
        headers.set("A", "1");
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_clone_is_isolated() {
        let mut original = Headers::new();
        original.set("X-Trace", "abc");
        let copy = original.clone();
        original.set("X-Trace", "def");
        assert_eq!(copy.get("X-Trace"), Some("abc"));
    }
}
