//! Course catalog: public parks and walking trails, loaded once at start-up.

use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use serde::Deserialize;
use shared::{Category, Coordinate, FilterType, RouteItem, RouteSource};
use thiserror::Error;

use crate::distance::{haversine_km, round_km};

pub const EASY: &str = "쉬움";
pub const MODERATE: &str = "보통";
pub const HARD: &str = "어려움";

/// Difficulty labels from gentlest to hardest.
const DIFFICULTY_ORDER: [&str; 3] = [EASY, MODERATE, HARD];

const FLAT_KEYWORDS: [&str; 4] = ["평지", "수변", "공원", "무장애"];
const SLOPE_KEYWORDS: [&str; 4] = ["산", "고개", "오르막", "계단"];
const SHORT_BELOW_KM: f64 = 3.0;
const LONG_FROM_KM: f64 = 5.0;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid catalog definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no course with a usable position")]
    Empty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub length_km: Option<f64>,
    pub lat: f64,
    pub lon: f64,
    /// Short text shown on the card.
    #[serde(default)]
    pub description: String,
    /// Longer text searched by the keyword predicates.
    #[serde(default)]
    pub description_full: Option<String>,
    pub source: RouteSource,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// Park classification, e.g. 근린공원 or 어린이공원. Empty for trails.
    #[serde(default)]
    pub park_type: String,
}

fn default_difficulty() -> String {
    MODERATE.to_string()
}

impl Course {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    fn search_text(&self) -> &str {
        self.description_full
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| self.description.trim())
    }

    fn mentions(&self, keywords: &[&str]) -> bool {
        let text = self.search_text();
        keywords.iter().any(|kw| text.contains(kw))
    }

    pub fn difficulty(&self) -> &str {
        self.difficulty.trim()
    }

    pub fn difficulty_rank(&self) -> Option<usize> {
        difficulty_rank(self.difficulty())
    }

    /// Anything harder than easy is assumed to include slopes.
    pub fn has_slope(&self) -> bool {
        self.difficulty() != EASY
    }

    pub fn is_flat(&self) -> bool {
        self.difficulty() == EASY || self.mentions(&FLAT_KEYWORDS)
    }

    pub fn is_short(&self) -> bool {
        self.length_km.is_some_and(|km| km < SHORT_BELOW_KM)
    }

    pub fn is_long(&self) -> bool {
        self.length_km.is_some_and(|km| km >= LONG_FROM_KM)
    }

    pub fn is_slope(&self) -> bool {
        self.difficulty() == HARD || self.mentions(&SLOPE_KEYWORDS)
    }

    pub fn matches(&self, category: Category) -> bool {
        match category {
            Category::Flat => self.is_flat(),
            Category::Short => self.is_short(),
            Category::Long => self.is_long(),
            Category::Slope => self.is_slope(),
        }
    }

    /// Feature tags shown on the route card.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = [
            (self.is_flat(), "평지"),
            (self.is_short(), "단거리"),
            (self.is_long(), "장거리"),
            (self.is_slope(), "경사"),
        ]
        .into_iter()
        .filter(|(matched, _)| *matched)
        .map(|(_, tag)| tag.to_string())
        .collect();
        if tags.is_empty() {
            tags.push("산책로".to_string());
        }
        tags
    }

    /// Number of `keywords` found in the park type or the full description.
    pub fn preference_score(&self, keywords: &[&str]) -> usize {
        let text = format!("{} {}", self.park_type, self.search_text());
        keywords.iter().filter(|kw| text.contains(*kw)).count()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    courses: Vec<Course>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_reader(reader)?;
        Self::from_courses(file.courses)
    }

    /// Drops courses without a usable position (non-finite or the 0,0
    /// placeholder used by the public data sets).
    pub fn from_courses(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let total = courses.len();
        let courses: Vec<Course> = courses
            .into_iter()
            .filter(|c| c.position().is_finite() && !(c.lat == 0.0 && c.lon == 0.0))
            .collect();
        if courses.len() < total {
            tracing::warn!(
                skipped = total - courses.len(),
                "ignoring courses without a position"
            );
        }
        if courses.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { courses })
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Wire form of the course at `index`.
    pub fn route_item(&self, index: usize, distance_km: Option<f64>) -> RouteItem {
        let course = &self.courses[index];
        RouteItem {
            id: format!("{}_{index}", course.source.as_str()),
            name: course.name.clone(),
            region: course
                .address
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            difficulty: course.difficulty().to_string(),
            distance: course.length_km.map(|km| format!("{km}km")),
            duration: None,
            description: course.description.clone(),
            address: course.address.clone(),
            lat: Some(course.lat),
            lon: Some(course.lon),
            source: course.source,
            distance_from_user_km: distance_km.map(round_km),
            tags: course.tags(),
        }
    }

    /// Plain listing: difficulty allowed by `filter_type`, optional category,
    /// nearest first when `origin` is known, catalog order otherwise.
    pub fn walk_routes(
        &self,
        filter_type: FilterType,
        category: Option<Category>,
        origin: Option<Coordinate>,
        limit: usize,
    ) -> Vec<RouteItem> {
        let allowed = allowed_difficulties(filter_type);
        let matching = self.courses.iter().enumerate().filter(|(_, c)| {
            allowed.contains(&c.difficulty()) && category.is_none_or(|cat| c.matches(cat))
        });

        match origin {
            Some(origin) => {
                let mut by_distance: Vec<(usize, f64)> = matching
                    .map(|(i, c)| (i, haversine_km(origin, c.position())))
                    .collect();
                by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
                by_distance
                    .into_iter()
                    .take(limit)
                    .map(|(i, km)| self.route_item(i, Some(km)))
                    .collect()
            }
            None => matching
                .take(limit)
                .map(|(i, _)| self.route_item(i, None))
                .collect(),
        }
    }
}

/// Position in the easy → hard scale; `None` for an unknown label.
pub fn difficulty_rank(label: &str) -> Option<usize> {
    DIFFICULTY_ORDER.iter().position(|d| *d == label.trim())
}

pub fn allowed_difficulties(filter_type: FilterType) -> &'static [&'static str] {
    match filter_type {
        FilterType::Easy | FilterType::Rehab => &[EASY],
        FilterType::Normal => &[EASY, MODERATE],
    }
}
