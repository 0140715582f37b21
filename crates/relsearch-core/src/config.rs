///
/// SearchConfig
///
/// Recognized runtime options (§6). Plain field setters, not a typestate
/// builder — unlike `ConditionBuilder`, configuration has no sequencing
/// constraint to encode.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SearchConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub batch_fetch_size: u32,
    pub nested_join_depth_limit: u8,
    pub two_phase_always_on: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 1000,
            batch_fetch_size: 100,
            nested_join_depth_limit: 3,
            two_phase_always_on: false,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_default_page_size(mut self, n: u32) -> Self {
        self.default_page_size = n;
        self
    }

    #[must_use]
    pub const fn with_max_page_size(mut self, n: u32) -> Self {
        self.max_page_size = n;
        self
    }

    #[must_use]
    pub const fn with_batch_fetch_size(mut self, n: u32) -> Self {
        self.batch_fetch_size = n;
        self
    }

    #[must_use]
    pub const fn with_nested_join_depth_limit(mut self, n: u8) -> Self {
        self.nested_join_depth_limit = n;
        self
    }

    #[must_use]
    pub const fn with_two_phase_always_on(mut self, on: bool) -> Self {
        self.two_phase_always_on = on;
        self
    }

    /// Clamp a requested page size into `[1, max_page_size]`, falling back to
    /// `default_page_size` for a non-positive request (builder rule: "size(n)
    /// uses the value if >0 else the default").
    #[must_use]
    pub const fn clamp_size(&self, requested: i64) -> u32 {
        if requested <= 0 {
            self.default_page_size
        } else if requested as u64 > self.max_page_size as u64 {
            self.max_page_size
        } else {
            requested as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SearchConfig;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.default_page_size, 20);
        assert_eq!(cfg.max_page_size, 1000);
        assert_eq!(cfg.batch_fetch_size, 100);
        assert_eq!(cfg.nested_join_depth_limit, 3);
        assert!(!cfg.two_phase_always_on);
    }

    #[test]
    fn clamp_size_falls_back_to_default_for_non_positive() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.clamp_size(0), 20);
        assert_eq!(cfg.clamp_size(-5), 20);
    }

    #[test]
    fn clamp_size_caps_at_max() {
        let cfg = SearchConfig::default().with_max_page_size(50);
        assert_eq!(cfg.clamp_size(10_000), 50);
        assert_eq!(cfg.clamp_size(30), 30);
    }
}
