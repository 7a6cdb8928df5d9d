use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RouteBounds {
    /// Smallest box containing every point, `None` for an empty slice.
    pub fn enclosing(points: &[Coordinate]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        Some(points[1..].iter().fold(init, |acc, p| Self {
            min_lat: acc.min_lat.min(p.lat),
            max_lat: acc.max_lat.max(p.lat),
            min_lon: acc.min_lon.min(p.lon),
            max_lon: acc.max_lon.max(p.lon),
        }))
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }

    pub fn south_west(&self) -> Coordinate {
        Coordinate::new(self.min_lat, self.min_lon)
    }

    pub fn north_east(&self) -> Coordinate {
        Coordinate::new(self.max_lat, self.max_lon)
    }
}

/// Coarse walking-intensity profile the server biases its selection with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Easy,
    #[default]
    Normal,
    Rehab,
}

impl FilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Rehab => "rehab",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "rehab" => Some(Self::Rehab),
            _ => None,
        }
    }
}

/// Route-shape bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "평지위주")]
    Flat,
    #[serde(alias = "단거리")]
    Short,
    #[serde(alias = "장거리")]
    Long,
    #[serde(alias = "경사")]
    Slope,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Short => "short",
            Self::Long => "long",
            Self::Slope => "slope",
        }
    }

    /// Accepts the English query value or the Korean catalog label.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "flat" => return Some(Self::Flat),
            "short" => return Some(Self::Short),
            "long" => return Some(Self::Long),
            "slope" => return Some(Self::Slope),
            _ => {}
        }
        match raw {
            "평지위주" => Some(Self::Flat),
            "단거리" => Some(Self::Short),
            "장거리" => Some(Self::Long),
            "경사" => Some(Self::Slope),
            _ => None,
        }
    }
}

/// Patella luxation grade from a prior diagnosis.
///
/// The wire labels are the ones the diagnosis store writes (`정상`, `1기`,
/// `3기`); the English names are accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosisGrade {
    #[serde(rename = "정상", alias = "normal")]
    Normal,
    #[serde(rename = "1기", alias = "stage1")]
    Stage1,
    #[serde(rename = "3기", alias = "stage3")]
    Stage3,
}

impl DiagnosisGrade {
    pub const ALL: [Self; 3] = [Self::Normal, Self::Stage1, Self::Stage3];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "정상",
            Self::Stage1 => "1기",
            Self::Stage3 => "3기",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "정상" | "normal" => Some(Self::Normal),
            "1기" | "stage1" => Some(Self::Stage1),
            "3기" | "stage3" => Some(Self::Stage3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    Park,
    Walk,
}

impl RouteSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Park => "park",
            Self::Walk => "walk",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Park => "Park",
            Self::Walk => "Walking trail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    pub source: RouteSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_user_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl RouteItem {
    /// Map position, only when both coordinates are present and finite.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let coord = Coordinate::new(self.lat?, self.lon?);
        coord.is_finite().then_some(coord)
    }
}

/// Body of `GET /api/walk-routes`: a bare list, or a list with the reason a
/// diagnosis-driven recommendation was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WalkRoutesPayload {
    Plain(Vec<RouteItem>),
    Recommended {
        recommendation_reason: String,
        #[serde(default)]
        routes: Vec<RouteItem>,
    },
}

impl WalkRoutesPayload {
    pub fn into_parts(self) -> (Vec<RouteItem>, Option<String>) {
        match self {
            Self::Plain(routes) => (routes, None),
            Self::Recommended {
                recommendation_reason,
                routes,
            } => (routes, Some(recommendation_reason)),
        }
    }
}

/// One entry of `GET /api/diagnosis-history`, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub id: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub grade: String,
    #[serde(default)]
    pub score: f64,
}

impl DiagnosisRecord {
    pub fn known_grade(&self) -> Option<DiagnosisGrade> {
        DiagnosisGrade::parse(&self.grade)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
