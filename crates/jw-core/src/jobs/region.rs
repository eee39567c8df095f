use std::fmt;

/// Country hint passed to the aggregation service (`country_indeed`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Region {
    #[default]
    Usa,
    Canada,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Usa => "usa",
            Region::Canada => "canada",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CANADIAN_PROVINCES: &[&str] = &[
    "on",
    "ontario",
    "bc",
    "british columbia",
    "ab",
    "alberta",
    "qc",
    "quebec",
    "ns",
    "nova scotia",
    "nb",
    "new brunswick",
    "mb",
    "manitoba",
    "sk",
    "saskatchewan",
    "pe",
    "prince edward island",
    "nl",
    "newfoundland",
    "yt",
    "yukon",
    "nt",
    "northwest territories",
    "nu",
    "nunavut",
];

/// True when a comma-separated location part starts with a province or
/// territory: `on`, `on.`, `on m5v 2t6`, `british columbia v6b 1a1`.
fn names_province(part: &str) -> bool {
    let words: Vec<&str> = part
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|w| !w.is_empty())
        .collect();

    CANADIAN_PROVINCES.iter().any(|province| {
        let len = province.split_whitespace().count();
        words.len() >= len && words[..len].join(" ") == *province
    })
}

/// Pick the region for a free-text location.
///
/// Canada wins when the text mentions `canada`/`canadian`, or when a
/// comma-separated part (after the first) begins with a province or territory,
/// optionally followed by a postal code. Everything else, including no
/// location, is the USA.
pub fn detect_region(location: Option<&str>) -> Region {
    let Some(location) = location else {
        return Region::Usa;
    };
    let lower = location.to_lowercase();

    if lower.contains("canada") || lower.contains("canadian") {
        return Region::Canada;
    }

    let has_province = lower
        .split(',')
        .skip(1)
        .any(names_province);

    if has_province {
        Region::Canada
    } else {
        Region::Usa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn province_abbreviation_selects_canada() {
        assert_eq!(detect_region(Some("Toronto, ON")), Region::Canada);
        assert_eq!(detect_region(Some("vancouver,bc")), Region::Canada);
        assert_eq!(detect_region(Some("Halifax, Nova Scotia")), Region::Canada);
        assert_eq!(detect_region(Some("Toronto, ON M5V 2T6")), Region::Canada);
        assert_eq!(detect_region(Some("Vancouver, BC V6B 1A1")), Region::Canada);
        assert_eq!(detect_region(Some("Toronto, ON.")), Region::Canada);
        assert_eq!(
            detect_region(Some("Victoria, British Columbia V8W 1P6")),
            Region::Canada
        );
    }

    #[test]
    fn country_name_selects_canada() {
        assert_eq!(detect_region(Some("Remote in Canada")), Region::Canada);
        assert_eq!(detect_region(Some("Canadian remote")), Region::Canada);
    }

    #[test]
    fn us_locations_stay_usa() {
        assert_eq!(detect_region(Some("Austin, TX")), Region::Usa);
        assert_eq!(detect_region(Some("Philadelphia, Pennsylvania")), Region::Usa);
        assert_eq!(detect_region(Some("Ontario")), Region::Usa);
        assert_eq!(detect_region(Some("Portland, OR 97201")), Region::Usa);
        assert_eq!(detect_region(Some("New York, NY, USA")), Region::Usa);
        assert_eq!(detect_region(None), Region::Usa);
    }

    #[test]
    fn region_codes() {
        assert_eq!(Region::Usa.as_str(), "usa");
        assert_eq!(Region::Canada.to_string(), "canada");
    }
}
