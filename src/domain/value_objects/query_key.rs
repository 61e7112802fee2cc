use serde::{Deserialize, Serialize};
use std::fmt;

/// 読み取りキャッシュのキー（例: `["orders", "pending"]`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// `prefix` の全要素が先頭に一致するか
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matching() {
        let key = QueryKey::new(["orders", "pending"]);
        assert!(key.starts_with(&QueryKey::new(["orders"])));
        assert!(key.starts_with(&QueryKey::new(Vec::<String>::new())));
        assert!(!key.starts_with(&QueryKey::new(["menu"])));
        assert!(!QueryKey::new(["orders"]).starts_with(&key));
    }
}
