//! Grade-specific route recommendation.
//!
//! Each diagnosis grade comes with a search radius, preferred place
//! keywords and slope/difficulty ceilings. Courses inside the radius are
//! ranked by keyword matches, then by distance. While fewer than `limit`
//! courses qualify the radius grows in fixed steps; if nothing qualifies at
//! all the nearest courses are returned instead.

use shared::{Coordinate, DiagnosisGrade, RouteItem};

use crate::{
    catalog::{Catalog, Course, EASY, MODERATE, difficulty_rank},
    distance::haversine_km,
};

pub const RADIUS_STEP_KM: f64 = 0.5;
pub const MAX_RADIUS_TRIES: usize = 10;

/// Seoul city hall, used when a grade arrives without a position.
pub const DEFAULT_ORIGIN: Coordinate = Coordinate {
    lat: 37.5667,
    lon: 126.9784,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeCriteria {
    pub max_radius_km: f64,
    pub preferred_keywords: &'static [&'static str],
    pub allow_slope: bool,
    pub max_difficulty: Option<&'static str>,
    pub reason: &'static str,
}

pub fn criteria(grade: DiagnosisGrade) -> GradeCriteria {
    match grade {
        DiagnosisGrade::Stage3 => GradeCriteria {
            max_radius_km: 1.0,
            preferred_keywords: &["소공원", "어린이공원", "어린이"],
            allow_slope: false,
            max_difficulty: Some(EASY),
            reason: "Nearby flat parks keep the strain on the joints to a minimum.",
        },
        DiagnosisGrade::Stage1 => GradeCriteria {
            max_radius_km: 2.0,
            preferred_keywords: &["근린공원", "수변공원", "수변"],
            allow_slope: true,
            max_difficulty: Some(MODERATE),
            reason: "Keeping muscle strength up matters at this stage, so these routes have gentle slopes.",
        },
        DiagnosisGrade::Normal => GradeCriteria {
            max_radius_km: 3.0,
            preferred_keywords: &["대형공원", "산림공원", "체육공원", "공원"],
            allow_slope: true,
            max_difficulty: None,
            reason: "Healthy joints! These large parks leave plenty of room to stay active.",
        },
    }
}

impl GradeCriteria {
    fn admits(&self, course: &Course) -> bool {
        let slope_ok = self.allow_slope || !course.has_slope();
        let difficulty_ok = match self.max_difficulty {
            None => true,
            Some(max) => match (course.difficulty_rank(), difficulty_rank(max)) {
                (Some(rank), Some(ceiling)) => rank <= ceiling,
                _ => course.difficulty() == max,
            },
        };
        slope_ok && difficulty_ok
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub reason: &'static str,
    pub routes: Vec<RouteItem>,
}

pub fn recommend(
    catalog: &Catalog,
    grade: DiagnosisGrade,
    origin: Coordinate,
    limit: usize,
) -> Recommendation {
    let criteria = criteria(grade);
    let distances: Vec<f64> = catalog
        .courses()
        .iter()
        .map(|c| haversine_km(origin, c.position()))
        .collect();

    let mut radius = criteria.max_radius_km;
    let mut selected: Vec<usize> = Vec::new();
    for _ in 0..MAX_RADIUS_TRIES {
        let mut in_radius: Vec<(usize, usize)> = catalog
            .courses()
            .iter()
            .enumerate()
            .filter(|(i, c)| distances[*i] <= radius && criteria.admits(c))
            .map(|(i, c)| (i, c.preference_score(criteria.preferred_keywords)))
            .collect();
        in_radius.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| distances[a.0].total_cmp(&distances[b.0]))
        });
        let found = in_radius.len();
        selected = in_radius.into_iter().take(limit).map(|(i, _)| i).collect();
        if found >= limit {
            break;
        }
        radius += RADIUS_STEP_KM;
    }

    if selected.is_empty() {
        tracing::debug!(grade = grade.as_str(), "no course meets the grade criteria, using nearest");
        let mut nearest: Vec<usize> = (0..catalog.len()).collect();
        nearest.sort_by(|a, b| distances[*a].total_cmp(&distances[*b]));
        selected = nearest.into_iter().take(limit).collect();
    }

    tracing::debug!(
        grade = grade.as_str(),
        radius_km = radius,
        picked = selected.len(),
        "recommendation computed"
    );

    Recommendation {
        reason: criteria.reason,
        routes: selected
            .into_iter()
            .map(|i| catalog.route_item(i, Some(distances[i])))
            .collect(),
    }
}
