/// Keyword groups the classifier has one flag column for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Login,
    Secure,
    Bank,
    Payment,
    Support,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Login,
        Category::Secure,
        Category::Bank,
        Category::Payment,
        Category::Support,
    ];

    /// Name of the flag column in the feature record.
    pub fn column(&self) -> &'static str {
        match self {
            Category::Login => "has_login",
            Category::Secure => "has_secure",
            Category::Bank => "has_bank",
            Category::Payment => "has_payment",
            Category::Support => "has_support",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

const DEFAULT_KEYWORDS: [(Category, &[&str]); 5] = [
    (Category::Login, &["login", "signin", "account"]),
    (Category::Secure, &["secure", "verify", "update"]),
    (Category::Bank, &["bank", "paypal", "chase", "wellsfargo"]),
    (Category::Payment, &["payment", "billing", "invoice"]),
    (Category::Support, &["support", "helpdesk"]),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuspicionFlags {
    flags: [bool; 5],
}

impl SuspicionFlags {
    pub fn has(&self, category: Category) -> bool {
        self.flags[category.index()]
    }

    /// Number of categories with at least one keyword present.
    pub fn categories_hit(&self) -> usize {
        self.flags.iter().filter(|hit| **hit).count()
    }

    /// Column name / 0-1 value pairs in column order, followed by the
    /// category count.
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        Category::ALL
            .iter()
            .map(|category| (category.column(), self.has(*category) as i64))
            .chain(std::iter::once((
                "num_suspicious_keywords",
                self.categories_hit() as i64,
            )))
    }
}

/// Fixed keyword table shared by feature extraction and the risk blend.
#[derive(Debug, Clone)]
pub struct SuspicionLexicon {
    groups: Vec<(Category, Vec<String>)>,
}

impl SuspicionLexicon {
    pub fn keywords(&self, category: Category) -> &[String] {
        self.groups
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, words)| words.as_slice())
            .unwrap_or_default()
    }

    /// Per-category presence flags, searched case-insensitively over the
    /// whole URL.
    pub fn score(&self, url: &str) -> SuspicionFlags {
        let lowered = url.to_lowercase();
        let mut flags = SuspicionFlags::default();
        for (category, words) in &self.groups {
            flags.flags[category.index()] = words.iter().any(|w| lowered.contains(w.as_str()));
        }
        flags
    }

    /// Number of distinct keywords, across every category, that occur in
    /// the URL. Unlike [`SuspicionFlags::categories_hit`] a category can
    /// contribute more than once.
    pub fn keyword_hits(&self, url: &str) -> usize {
        let lowered = url.to_lowercase();
        self.groups
            .iter()
            .flat_map(|(_, words)| words.iter())
            .filter(|w| lowered.contains(w.as_str()))
            .count()
    }
}

impl Default for SuspicionLexicon {
    fn default() -> Self {
        let groups = DEFAULT_KEYWORDS
            .iter()
            .map(|(category, words)| (*category, words.iter().map(|w| w.to_string()).collect()))
            .collect();
        Self { groups }
    }
}
