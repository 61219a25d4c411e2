use std::sync::LazyLock;

use regex::Regex;

// Thousands separators only when they form real groups, so "100, of which"
// never swallows the comma that follows the number.
macro_rules! num {
    () => {
        r"\d{1,3}(?:,\d{3})+|\d+"
    };
}

static COUNTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?P<country>[^\d\s(].*?)\s+[-–—]\s+(?P<total>",
        num!(),
        r")\s*,\s*of which:?\s*(?P<rest>[^()]*)$"
    ))
    .unwrap()
});
static CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?P<label>[^\d\s(].*?)\s*\(\s*(?P<total>",
        num!(),
        r")\s*,\s*of which:?\s*(?P<rest>[^()]*)\)\s*$"
    ))
    .unwrap()
});
static STATUS_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?P<status>destroyed|damaged|abandoned|captured)\s*:\s*(?P<n>",
        num!(),
        r")"
    ))
    .unwrap()
});
static EQUIPMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<count>",
        num!(),
        r")\s+(?P<name>[^:]+?)\s*:(?P<tail>.*)$"
    ))
    .unwrap()
});
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\((?P<nums>\d+(?:\s*(?:,|and)\s*\d+)*)\s*,\s*(?P<status>destroyed|damaged|abandoned|captured)\b[^)]*\)",
    )
    .unwrap()
});
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Destroyed,
    Damaged,
    Abandoned,
    Captured,
}

impl Status {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "destroyed" => Some(Status::Destroyed),
            "damaged" => Some(Status::Damaged),
            "abandoned" => Some(Status::Abandoned),
            "captured" => Some(Status::Captured),
            _ => None,
        }
    }
}

/// Raw status numbers; an absent field stays `None` and defaults to 0 later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFields<'a> {
    pub destroyed: Option<&'a str>,
    pub damaged: Option<&'a str>,
    pub abandoned: Option<&'a str>,
    pub captured: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCapture<'a> {
    pub line: &'a str,
    pub country: &'a str,
    pub total: &'a str,
    pub status: StatusFields<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCapture<'a> {
    pub line: &'a str,
    pub label: &'a str,
    pub total: &'a str,
    pub status: StatusFields<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentCapture<'a> {
    pub line: &'a str,
    pub count: &'a str,
    pub type_name: &'a str,
    /// Everything after the colon (status markers, if any).
    pub tail: &'a str,
}

/// One `(n, m and k, status)` marker: `pieces` is how many numbers it lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub pieces: u32,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit<'a> {
    Country(CountryCapture<'a>),
    Category(CategoryCapture<'a>),
    Equipment(EquipmentCapture<'a>),
}

/// First matcher to recognize the line wins: country, category, equipment.
pub fn classify(line: &str) -> Option<Hit<'_>> {
    if let Some(c) = match_country(line) {
        return Some(Hit::Country(c));
    }
    if let Some(c) = match_category(line) {
        return Some(Hit::Category(c));
    }
    match_equipment(line).map(Hit::Equipment)
}

/// `Russia - 4412, of which: destroyed: 3045, damaged: 142, ...`
pub fn match_country(line: &str) -> Option<CountryCapture<'_>> {
    let caps = COUNTRY_RE.captures(line)?;
    Some(CountryCapture {
        line,
        country: caps.name("country")?.as_str(),
        total: caps.name("total")?.as_str(),
        status: status_fields(caps.name("rest")?.as_str()),
    })
}

/// `Tanks (1041, of which destroyed: 667, damaged: 32, ...)`
pub fn match_category(line: &str) -> Option<CategoryCapture<'_>> {
    let caps = CATEGORY_RE.captures(line)?;
    Some(CategoryCapture {
        line,
        label: caps.name("label")?.as_str(),
        total: caps.name("total")?.as_str(),
        status: status_fields(caps.name("rest")?.as_str()),
    })
}

/// `154 T-62M: (1, destroyed) (2, captured)`
pub fn match_equipment(line: &str) -> Option<EquipmentCapture<'_>> {
    let caps = EQUIPMENT_RE.captures(line)?;
    Some(EquipmentCapture {
        line,
        count: caps.name("count")?.as_str(),
        type_name: caps.name("name")?.as_str(),
        tail: caps.name("tail")?.as_str(),
    })
}

pub fn match_markers(tail: &str) -> Vec<Marker> {
    MARKER_RE
        .captures_iter(tail)
        .filter_map(|caps| {
            let status = Status::parse(caps.name("status")?.as_str())?;
            let pieces = DIGITS_RE.find_iter(caps.name("nums")?.as_str()).count() as u32;
            Some(Marker { pieces, status })
        })
        .collect()
}

fn status_fields(rest: &str) -> StatusFields<'_> {
    let mut fields = StatusFields::default();
    for caps in STATUS_FIELD_RE.captures_iter(rest) {
        let (Some(status), Some(n)) = (caps.name("status"), caps.name("n")) else {
            continue;
        };
        let slot = match Status::parse(status.as_str()) {
            Some(Status::Destroyed) => &mut fields.destroyed,
            Some(Status::Damaged) => &mut fields.damaged,
            Some(Status::Abandoned) => &mut fields.abandoned,
            Some(Status::Captured) => &mut fields.captured,
            None => continue,
        };
        slot.get_or_insert(n.as_str());
    }
    fields
}
