//! Resolution of the effective route filter.
//!
//! Three sources can bias the query: a filter type handed over at entry, a
//! diagnosis grade handed over at entry, and the latest diagnosis record
//! fetched from history when no entry grade exists. The active tab always
//! contributes its category. The first manual tab selection closes the
//! diagnosis latch for the rest of the session.

use shared::{Category, DiagnosisGrade, DiagnosisRecord, FilterType};

/// Filter tabs in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    All,
    Flat,
    Short,
    Long,
    Slope,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::All, Tab::Flat, Tab::Short, Tab::Long, Tab::Slope];

    pub fn label(self) -> &'static str {
        match self {
            Tab::All => "All",
            Tab::Flat => "Mostly flat",
            Tab::Short => "Short",
            Tab::Long => "Long",
            Tab::Slope => "With slopes",
        }
    }

    /// Tabs flagged as recommended for dogs with joint problems.
    pub fn recommended(self) -> bool {
        matches!(self, Tab::Flat | Tab::Short)
    }

    pub fn filter_type(self) -> FilterType {
        match self {
            Tab::Flat => FilterType::Easy,
            Tab::All | Tab::Short | Tab::Long | Tab::Slope => FilterType::Normal,
        }
    }

    pub fn category(self) -> Option<Category> {
        match self {
            Tab::All => None,
            Tab::Flat => Some(Category::Flat),
            Tab::Short => Some(Category::Short),
            Tab::Long => Some(Category::Long),
            Tab::Slope => Some(Category::Slope),
        }
    }
}

/// Bias supplied by whoever navigated to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryBias {
    pub filter_type: Option<FilterType>,
    pub grade: Option<DiagnosisGrade>,
}

impl EntryBias {
    /// Reads `filter_type` and `grade` from query pairs, ignoring unknown
    /// values.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut bias = Self::default();
        for (key, value) in pairs {
            match key {
                "filter_type" => bias.filter_type = FilterType::parse(value),
                "grade" | "diagnosis_grade" => bias.grade = DiagnosisGrade::parse(value),
                _ => {}
            }
        }
        bias
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveFilter {
    pub filter_type: FilterType,
    pub category: Option<Category>,
    pub grade: Option<DiagnosisGrade>,
}

#[derive(Debug, Clone)]
pub struct FilterResolver {
    entry_filter_type: Option<FilterType>,
    entry_grade: Option<DiagnosisGrade>,
    history_grade: Option<DiagnosisGrade>,
    use_diagnosis: bool,
    user_picked: bool,
    active_tab: Tab,
}

impl FilterResolver {
    pub fn new(entry: EntryBias) -> Self {
        Self {
            entry_filter_type: entry.filter_type,
            entry_grade: entry.grade,
            history_grade: None,
            use_diagnosis: entry.grade.is_some(),
            user_picked: false,
            active_tab: Tab::default(),
        }
    }

    /// History is only consulted when no grade came with the entry.
    pub fn needs_history(&self) -> bool {
        self.entry_grade.is_none()
    }

    /// Applies the most recent history record. Returns whether the effective
    /// filter changed.
    pub fn apply_history(&mut self, records: &[DiagnosisRecord]) -> bool {
        if !self.needs_history() {
            return false;
        }
        let Some(grade) = records.first().and_then(DiagnosisRecord::known_grade) else {
            return false;
        };
        let before = self.effective();
        self.history_grade = Some(grade);
        if !self.user_picked {
            self.use_diagnosis = true;
        }
        self.effective() != before
    }

    /// Manual tab selection: drops every automatic bias for the session.
    pub fn select_tab(&mut self, tab: Tab) {
        self.user_picked = true;
        self.entry_filter_type = None;
        self.use_diagnosis = false;
        self.active_tab = tab;
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn uses_diagnosis(&self) -> bool {
        self.use_diagnosis
    }

    /// Grade known for the pet, whether or not it still biases the query.
    pub fn resolved_grade(&self) -> Option<DiagnosisGrade> {
        self.entry_grade.or(self.history_grade)
    }

    pub fn effective(&self) -> EffectiveFilter {
        EffectiveFilter {
            filter_type: self
                .entry_filter_type
                .unwrap_or_else(|| self.active_tab.filter_type()),
            category: self.active_tab.category(),
            grade: if self.use_diagnosis {
                self.resolved_grade()
            } else {
                None
            },
        }
    }
}
