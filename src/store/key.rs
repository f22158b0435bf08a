// store/key.rs

//! Payroll table keys: `(institute, staff type, month, year)` and the table
//! names derived from them (`somaiya_teaching_jan_2024`).

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::TABLE_PATTERN;

use super::StoreError;

static TABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(TABLE_PATTERN).expect("valid table pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Institute {
    Somaiya,
    Svv,
}

impl Institute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Institute::Somaiya => "somaiya",
            Institute::Svv => "svv",
        }
    }
}

impl FromStr for Institute {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "somaiya" => Ok(Institute::Somaiya),
            "svv" => Ok(Institute::Svv),
            other => Err(StoreError::InvalidKey(format!("unknown institute '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StaffType {
    Teaching,
    NonTeaching,
    Temporary,
    Svv,
}

impl StaffType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffType::Teaching => "teaching",
            StaffType::NonTeaching => "nonteaching",
            StaffType::Temporary => "temporary",
            StaffType::Svv => "svv",
        }
    }
}

impl FromStr for StaffType {
    type Err = StoreError;

    /// Accepts `Non-Teaching`, `non teaching` and `nonteaching` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match normalized.as_str() {
            "teaching" => Ok(StaffType::Teaching),
            "nonteaching" => Ok(StaffType::NonTeaching),
            "temporary" => Ok(StaffType::Temporary),
            "svv" => Ok(StaffType::Svv),
            _ => Err(StoreError::InvalidKey(format!("unknown staff type '{}'", s.trim()))),
        }
    }
}

/// Calendar months, ordered. September is spelled `sept` in table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sept,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sept,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::Jan => "jan",
            Month::Feb => "feb",
            Month::Mar => "mar",
            Month::Apr => "apr",
            Month::May => "may",
            Month::Jun => "jun",
            Month::Jul => "jul",
            Month::Aug => "aug",
            Month::Sept => "sept",
            Month::Oct => "oct",
            Month::Nov => "nov",
            Month::Dec => "dec",
        }
    }

    /// Display form used on slips and in mail (`Jan`, `Sept`).
    pub fn label(&self) -> String {
        crate::core::utils::capitalize(self.as_str())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Month {
    type Err = StoreError;

    /// Accepts short names (`jan`, `sep`, `sept`) and full names (`January`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let prefix: String = lower.chars().take(3).collect();
        let month = match prefix.as_str() {
            "jan" => Month::Jan,
            "feb" => Month::Feb,
            "mar" => Month::Mar,
            "apr" => Month::Apr,
            "may" => Month::May,
            "jun" => Month::Jun,
            "jul" => Month::Jul,
            "aug" => Month::Aug,
            "sep" => Month::Sept,
            "oct" => Month::Oct,
            "nov" => Month::Nov,
            "dec" => Month::Dec,
            _ => return Err(StoreError::InvalidKey(format!("unknown month '{}'", s.trim()))),
        };
        Ok(month)
    }
}

/// Identifies one stored payroll table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub institute: Institute,
    pub staff_type: StaffType,
    pub month: Month,
    pub year: u32,
}

impl TableKey {
    pub fn new(institute: Institute, staff_type: StaffType, month: Month, year: u32) -> Self {
        Self {
            institute,
            staff_type,
            month,
            year,
        }
    }

    /// Builds a key from user input, validating each part.
    pub fn from_parts(institute: &str, staff_type: &str, month: &str, year: &str) -> Result<Self, StoreError> {
        let year = year
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|_| crate::core::utils::year_check(year.trim()))
            .ok_or_else(|| StoreError::InvalidKey(format!("invalid year '{}'", year.trim())))?;
        Ok(Self::new(institute.parse()?, staff_type.parse()?, month.parse()?, year))
    }

    /// `institute_type_month_year`, always matching the table pattern.
    pub fn table_name(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.institute.as_str(),
            self.staff_type.as_str(),
            self.month.as_str(),
            self.year
        )
    }

    /// Parses a stored table name; `None` when it does not follow the pattern.
    pub fn parse(name: &str) -> Option<Self> {
        let caps = TABLE_RE.captures(name)?;
        Some(Self::new(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
            caps[4].parse().ok()?,
        ))
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_round_trip() {
        let key = TableKey::from_parts("Somaiya", "Non-Teaching", "September", "2024").unwrap();
        assert_eq!(key.table_name(), "somaiya_nonteaching_sept_2024");
        assert_eq!(TableKey::parse(&key.table_name()), Some(key));
    }

    #[test]
    fn test_every_key_matches_pattern() {
        for month in Month::ALL {
            let key = TableKey::new(Institute::Svv, StaffType::Svv, month, 2023);
            assert!(TABLE_RE.is_match(&key.table_name()), "{}", key);
        }
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert_eq!(TableKey::parse("sqlite_sequence"), None);
        assert_eq!(TableKey::parse("somaiya_teaching_sep_2024"), None);
        assert_eq!(TableKey::parse("somaiya_teaching_jan_24"), None);
        assert_eq!(TableKey::parse("somaiya_teaching_jan_2024_old"), None);
    }

    #[test]
    fn test_invalid_parts() {
        assert!(TableKey::from_parts("mit", "teaching", "jan", "2024").is_err());
        assert!(TableKey::from_parts("svv", "staff", "jan", "2024").is_err());
        assert!(TableKey::from_parts("svv", "svv", "smarch", "2024").is_err());
        assert!(TableKey::from_parts("svv", "svv", "jan", "24").is_err());
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(Month::Sept.label(), "Sept");
        assert_eq!("JAN".parse::<Month>().unwrap().to_string(), "Jan");
        assert!(Month::Jan < Month::Dec);
    }
}
