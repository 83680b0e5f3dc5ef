// src/resolve/rules.rs

/// How a rule turns its matching columns into one canonical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Leftmost matching column only (identifiers, single metrics).
    First,
    /// Every matching column, summed row-wise (additive sub-categories).
    Sum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
}

/// Positional guesses used only when no keyword matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The right-most unclaimed column that is not entirely numeric or blank.
    LastTextColumn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule {
    pub canonical: String,
    /// Keyword groups tried in order; the next group is consulted only when
    /// no column matches the previous one.
    pub tiers: Vec<Vec<String>>,
    pub policy: Policy,
    pub kind: ColumnKind,
    pub fallback: Option<Fallback>,
    /// Unresolved optional rules are left out instead of failing.
    pub optional: bool,
    /// Rows with no value in this column are dropped.
    pub drop_blank: bool,
}

impl KeywordRule {
    fn new(canonical: &str, keywords: &[&str], policy: Policy, kind: ColumnKind) -> Self {
        Self {
            canonical: canonical.to_string(),
            tiers: vec![keywords.iter().map(|k| k.to_string()).collect()],
            policy,
            kind,
            fallback: None,
            optional: false,
            drop_blank: false,
        }
    }

    /// Take-first text column.
    pub fn first(canonical: &str, keywords: &[&str]) -> Self {
        Self::new(canonical, keywords, Policy::First, ColumnKind::Text)
    }

    /// Take-all-and-sum numeric column.
    pub fn sum(canonical: &str, keywords: &[&str]) -> Self {
        Self::new(canonical, keywords, Policy::Sum, ColumnKind::Number)
    }

    pub fn number(mut self) -> Self {
        self.kind = ColumnKind::Number;
        self
    }

    pub fn or_keywords(mut self, keywords: &[&str]) -> Self {
        self.tiers
            .push(keywords.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn drop_blank(mut self) -> Self {
        self.drop_blank = true;
        self
    }

    /// Keyword tiers as matched, with the canonical name added to the first
    /// tier so that canonical output resolves to itself.
    pub fn keyword_tiers(&self) -> Vec<Vec<&str>> {
        self.tiers
            .iter()
            .enumerate()
            .map(|(i, tier)| {
                let mut kws: Vec<&str> = tier.iter().map(String::as_str).collect();
                if i == 0 {
                    kws.push(&self.canonical);
                }
                kws
            })
            .collect()
    }
}

/// An ordered rule table with a stable name (used as a cache identity).
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub name: String,
    pub rules: Vec<KeywordRule>,
}

impl RuleSet {
    pub fn new(name: &str, rules: Vec<KeywordRule>) -> Self {
        Self {
            name: name.to_string(),
            rules,
        }
    }
}
