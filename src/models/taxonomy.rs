use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt::Display, str::FromStr};

/// Dryness/oiliness axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Oiliness {
    Dry,
    Oily,
}

/// Sensitivity axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensitivityAxis {
    Sensitive,
    Resistant,
}

/// Pigmentation axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pigmentation {
    Pigmented,
    NonPigmented,
}

/// Texture axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Texture {
    Wrinkled,
    Tight,
}

/// Four-axis skin classification, rendered as a 4-character code (e.g. `drnt`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaxonomyCode {
    pub oiliness: Oiliness,
    pub sensitivity: SensitivityAxis,
    pub pigmentation: Pigmentation,
    pub texture: Texture,
}

impl TaxonomyCode {
    pub fn new(
        oiliness: Oiliness,
        sensitivity: SensitivityAxis,
        pigmentation: Pigmentation,
        texture: Texture,
    ) -> Self {
        Self {
            oiliness,
            sensitivity,
            pigmentation,
            texture,
        }
    }

    pub fn symbols(&self) -> [char; 4] {
        [
            match self.oiliness {
                Oiliness::Dry => 'd',
                Oiliness::Oily => 'o',
            },
            match self.sensitivity {
                SensitivityAxis::Sensitive => 's',
                SensitivityAxis::Resistant => 'r',
            },
            match self.pigmentation {
                Pigmentation::Pigmented => 'p',
                Pigmentation::NonPigmented => 'n',
            },
            match self.texture {
                Texture::Wrinkled => 'w',
                Texture::Tight => 't',
            },
        ]
    }
}

impl Display for TaxonomyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for symbol in self.symbols() {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

impl FromStr for TaxonomyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 4 {
            return Err(format!("taxonomy code must be 4 characters: {:?}", s));
        }

        let oiliness = match chars[0] {
            'd' => Oiliness::Dry,
            'o' => Oiliness::Oily,
            c => return Err(format!("invalid oiliness symbol {:?}", c)),
        };
        let sensitivity = match chars[1] {
            's' => SensitivityAxis::Sensitive,
            'r' => SensitivityAxis::Resistant,
            c => return Err(format!("invalid sensitivity symbol {:?}", c)),
        };
        let pigmentation = match chars[2] {
            'p' => Pigmentation::Pigmented,
            'n' => Pigmentation::NonPigmented,
            c => return Err(format!("invalid pigmentation symbol {:?}", c)),
        };
        let texture = match chars[3] {
            'w' => Texture::Wrinkled,
            't' => Texture::Tight,
            c => return Err(format!("invalid texture symbol {:?}", c)),
        };

        Ok(Self::new(oiliness, sensitivity, pigmentation, texture))
    }
}

impl Serialize for TaxonomyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaxonomyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_drnt() {
        let code = TaxonomyCode::new(
            Oiliness::Dry,
            SensitivityAxis::Resistant,
            Pigmentation::NonPigmented,
            Texture::Tight,
        );
        assert_eq!(code.to_string(), "drnt");
    }

    #[test]
    fn test_parse_display_agree() {
        for raw in ["ospw", "ornt", "dspt", "drnw"] {
            let code: TaxonomyCode = raw.parse().unwrap();
            assert_eq!(code.to_string(), raw);
        }
    }

    #[test]
    fn test_parse_rejects_bad_codes() {
        assert!("drn".parse::<TaxonomyCode>().is_err());
        assert!("xrnt".parse::<TaxonomyCode>().is_err());
        assert!("drntt".parse::<TaxonomyCode>().is_err());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let code: TaxonomyCode = "orpt".parse().unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, r#""orpt""#);

        let back: TaxonomyCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }
}
