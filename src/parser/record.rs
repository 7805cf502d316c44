use super::date::GameYear;

/// Column order of every pop table.
pub const COLUMNS: [&str; 9] = [
    "year",
    "workforce",
    "dependents",
    "wealth",
    "loyalists_and_radicals",
    "literacy",
    "job_satisfaction",
    "profession",
    "is_discriminated",
];

pub const NO_PROFESSION: &str = "none";

/// A pop block as it is being read. `None` means the key never appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPopRecord {
    pub year: Option<f64>,
    pub workforce: Option<i64>,
    pub dependents: Option<i64>,
    pub wealth: Option<f64>,
    pub loyalists_and_radicals: Option<f64>,
    pub literacy: Option<f64>,
    pub job_satisfaction: Option<f64>,
    pub profession: Option<String>,
    pub is_discriminated: Option<u8>,
}

impl RawPopRecord {
    pub fn starting_in(year: GameYear) -> Self {
        Self {
            year: Some(year.value()),
            ..Default::default()
        }
    }
}

/// One fully populated table row.
#[derive(Debug, Clone, PartialEq)]
pub struct PopRecord {
    pub year: f64,
    pub workforce: i64,
    pub dependents: i64,
    pub wealth: f64,
    pub loyalists_and_radicals: f64,
    pub literacy: f64,
    pub job_satisfaction: f64,
    pub profession: String,
    pub is_discriminated: u8,
}

impl PopRecord {
    /// Cells in `COLUMNS` order. Floats keep a fractional digit (`2200.0`).
    pub fn to_row(&self) -> [String; 9] {
        [
            format!("{:?}", self.year),
            self.workforce.to_string(),
            self.dependents.to_string(),
            format!("{:?}", self.wealth),
            format!("{:?}", self.loyalists_and_radicals),
            format!("{:?}", self.literacy),
            format!("{:?}", self.job_satisfaction),
            self.profession.clone(),
            self.is_discriminated.to_string(),
        ]
    }
}

impl From<PopRecord> for RawPopRecord {
    fn from(p: PopRecord) -> Self {
        Self {
            year: Some(p.year),
            workforce: Some(p.workforce),
            dependents: Some(p.dependents),
            wealth: Some(p.wealth),
            loyalists_and_radicals: Some(p.loyalists_and_radicals),
            literacy: Some(p.literacy),
            job_satisfaction: Some(p.job_satisfaction),
            profession: Some(p.profession),
            is_discriminated: Some(p.is_discriminated),
        }
    }
}

/// Fill every key the block never set: profession becomes "none",
/// everything else 0.
pub fn normalize(raw: RawPopRecord) -> PopRecord {
    PopRecord {
        year: raw.year.unwrap_or(0.0),
        workforce: raw.workforce.unwrap_or(0),
        dependents: raw.dependents.unwrap_or(0),
        wealth: raw.wealth.unwrap_or(0.0),
        loyalists_and_radicals: raw.loyalists_and_radicals.unwrap_or(0.0),
        literacy: raw.literacy.unwrap_or(0.0),
        job_satisfaction: raw.job_satisfaction.unwrap_or(0.0),
        profession: raw.profession.unwrap_or_else(|| NO_PROFESSION.to_string()),
        is_discriminated: raw.is_discriminated.unwrap_or(0),
    }
}
