use crate::error::ConfigError;

/// Experience level search filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ExperienceLevel {
    Internship = 1,
    EntryLevel = 2,
    Associate = 3,
    MidSenior = 4,
    Director = 5,
    Executive = 6,
}

impl ExperienceLevel {
    /// Filter code sent in the search query (`f_E`)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Display name used by the site
    pub fn name(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "Internship",
            ExperienceLevel::EntryLevel => "Entry level",
            ExperienceLevel::Associate => "Associate",
            ExperienceLevel::MidSenior => "Mid-Senior level",
            ExperienceLevel::Director => "Director",
            ExperienceLevel::Executive => "Executive",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ExperienceLevel::Internship),
            2 => Some(ExperienceLevel::EntryLevel),
            3 => Some(ExperienceLevel::Associate),
            4 => Some(ExperienceLevel::MidSenior),
            5 => Some(ExperienceLevel::Director),
            6 => Some(ExperienceLevel::Executive),
            _ => None,
        }
    }
}

impl TryFrom<u8> for ExperienceLevel {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(ConfigError::InvalidExperienceLevel(code))
    }
}

impl From<ExperienceLevel> for u8 {
    fn from(level: ExperienceLevel) -> Self {
        level.code()
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_site_names() {
        assert_eq!(ExperienceLevel::from_code(1), Some(ExperienceLevel::Internship));
        assert_eq!(ExperienceLevel::from_code(4).map(|l| l.name()), Some("Mid-Senior level"));
        assert_eq!(ExperienceLevel::from_code(0), None);
        assert_eq!(ExperienceLevel::from_code(7), None);
    }

    #[test]
    fn deserializes_from_number() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            levels: Vec<ExperienceLevel>,
        }

        let parsed: Wrapper = toml::from_str("levels = [2, 3]").unwrap();
        assert_eq!(
            parsed.levels,
            vec![ExperienceLevel::EntryLevel, ExperienceLevel::Associate]
        );

        assert!(toml::from_str::<Wrapper>("levels = [9]").is_err());
    }
}
