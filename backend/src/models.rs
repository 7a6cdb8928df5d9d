use serde::Deserialize;
use shared::{Category, Coordinate, DiagnosisGrade, FilterType};

pub const DEFAULT_LIMIT: usize = 100;

/// Query string of `GET /api/walk-routes`. Values that do not parse are
/// treated as absent rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct WalkRoutesParams {
    pub filter_type: Option<String>,
    pub limit: Option<usize>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub category: Option<String>,
    pub diagnosis_grade: Option<String>,
}

impl WalkRoutesParams {
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
            .as_deref()
            .and_then(FilterType::parse)
            .unwrap_or_default()
    }

    pub fn category(&self) -> Option<Category> {
        self.category.as_deref().and_then(Category::parse)
    }

    pub fn grade(&self) -> Option<DiagnosisGrade> {
        self.diagnosis_grade.as_deref().and_then(DiagnosisGrade::parse)
    }

    /// Both halves present and finite.
    pub fn origin(&self) -> Option<Coordinate> {
        let (lat, lon) = (self.latitude?, self.longitude?);
        Some(Coordinate::new(lat, lon)).filter(|c| c.is_finite())
    }

    pub fn limit(&self, max: usize) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(max)
    }
}
