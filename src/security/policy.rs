/// Access
///
/// What a request must present before it may reach a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No credential check at all.
    Public,
    /// Valid credentials resolving to a principal.
    Authenticated,
}

/// PathPattern
///
/// Ant-style request matcher. Supports exact paths and a trailing `/**`,
/// which matches the prefix itself and everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
    Any,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == "/**" {
            return PathPattern::Any;
        }
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => exact == path,
            // "/a/**" matches "/a", "/a/" and "/a/b", never "/ab".
            PathPattern::Prefix(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
            PathPattern::Any => true,
        }
    }
}

/// RouteRule
///
/// A single (pattern, access) pair of the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub access: Access,
}

/// SecurityPolicy
///
/// Ordered list of route rules. The first rule whose pattern matches the request
/// path decides; paths no rule matches get the `any_request` access, which is
/// `Authenticated` unless configured otherwise.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    rules: Vec<RouteRule>,
    any_request: Access,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityPolicy {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            any_request: Access::Authenticated,
        }
    }

    /// Appends rules letting every request to `patterns` through unchecked.
    pub fn permit_all<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_rules(patterns, Access::Public)
    }

    /// Appends rules requiring authentication for `patterns`.
    pub fn authenticated<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_rules(patterns, Access::Authenticated)
    }

    /// Sets the access applied when no rule matches.
    pub fn any_request(mut self, access: Access) -> Self {
        self.any_request = access;
        self
    }

    fn with_rules<I, S>(mut self, patterns: I, access: Access) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rules.extend(patterns.into_iter().map(|pattern| RouteRule {
            pattern: PathPattern::parse(pattern.as_ref()),
            access,
        }));
        self
    }

    pub fn required_access(&self, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.access)
            .unwrap_or(self.any_request)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}
