/// Keywords recognized as suite and test declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub suite_keywords: Vec<String>,
    pub test_keywords: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            suite_keywords: vec!["describe".to_string(), "context".to_string()],
            test_keywords: vec!["it".to_string(), "specify".to_string()],
        }
    }
}

impl ScanOptions {
    /// Also treat `keyword(...)` as a suite declaration.
    pub fn with_suite_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !self.suite_keywords.contains(&keyword) {
            self.suite_keywords.push(keyword);
        }
        self
    }

    /// Also treat `keyword(...)` as a test declaration.
    pub fn with_test_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !self.test_keywords.contains(&keyword) {
            self.test_keywords.push(keyword);
        }
        self
    }

    pub(crate) fn is_suite_keyword(&self, name: &str) -> bool {
        self.suite_keywords.iter().any(|k| k == name)
    }

    pub(crate) fn is_test_keyword(&self, name: &str) -> bool {
        self.test_keywords.iter().any(|k| k == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_mocha_aliases() {
        let opts = ScanOptions::default();
        assert!(opts.is_suite_keyword("describe"));
        assert!(opts.is_suite_keyword("context"));
        assert!(opts.is_test_keyword("it"));
        assert!(opts.is_test_keyword("specify"));
        assert!(!opts.is_test_keyword("test"));
    }

    #[test]
    fn extra_keywords_are_added_once() {
        let opts = ScanOptions::default()
            .with_test_keyword("test")
            .with_test_keyword("test")
            .with_suite_keyword("suite");
        assert!(opts.is_test_keyword("test"));
        assert!(opts.is_suite_keyword("suite"));
        assert_eq!(opts.test_keywords.len(), 3);
    }
}
