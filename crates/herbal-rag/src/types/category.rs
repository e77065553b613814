//! Corpus categories and their naming conventions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Domain category of a source document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Medicinal plant monograph
    Plant,
    /// Disease description
    Disease,
    /// Expert advice article
    Advice,
    /// User / expert profile
    User,
}

impl Category {
    /// Processing order for a full corpus run
    pub const ALL: [Category; 4] = [Self::Plant, Self::Disease, Self::Advice, Self::User];

    /// Lowercase identifier stored in chunk metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plant => "plant",
            Self::Disease => "disease",
            Self::Advice => "advice",
            Self::User => "user",
        }
    }

    /// Label prefixed to every chunk of this category
    pub fn entity_label(&self) -> &'static str {
        match self {
            Self::Plant => "Tên cây",
            Self::Disease => "Tên bệnh",
            Self::Advice => "Tiêu đề",
            Self::User => "Họ tên",
        }
    }

    /// Record key holding the primary name
    pub fn name_key(&self) -> &'static str {
        match self {
            Self::Plant => "Tên - loài",
            Self::Disease => "Tên bệnh",
            Self::Advice => "Tiêu đề",
            Self::User => "Họ tên",
        }
    }

    /// Metadata key carrying the primary name, e.g. `plant_name`
    pub fn name_metadata_key(&self) -> String {
        format!("{}_name", self.as_str())
    }

    /// Human-readable name for logs and CLI output
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Plant => "Cây thuốc",
            Self::Disease => "Bệnh",
            Self::Advice => "Lời khuyên",
            Self::User => "Người dùng",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plant" | "plants" => Ok(Self::Plant),
            "disease" | "diseases" => Ok(Self::Disease),
            "advice" => Ok(Self::Advice),
            "user" | "users" => Ok(Self::User),
            other => Err(Error::config(format!("unknown category '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_metadata_key() {
        assert_eq!(Category::Plant.name_metadata_key(), "plant_name");
        assert_eq!(Category::Advice.name_metadata_key(), "advice_name");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Plants".parse::<Category>().unwrap(), Category::Plant);
        assert_eq!("user".parse::<Category>().unwrap(), Category::User);
        assert!("herb".parse::<Category>().is_err());
    }

    #[test]
    fn test_processing_order() {
        let names: Vec<_> = Category::ALL.iter().map(Category::as_str).collect();
        assert_eq!(names, vec!["plant", "disease", "advice", "user"]);
    }
}
