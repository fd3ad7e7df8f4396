use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The color-vision deficiency a correction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deficiency {
    #[default]
    Normal,
    /// Red cones (L) missing.
    Protanopia,
    /// Green cones (M) missing.
    Deuteranopia,
    /// Blue cones (S) missing.
    Tritanopia,
}

/// An RGB channel, used to name the channel a deficiency cannot see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RgbChannel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl RgbChannel {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Deficiency {
    /// Cycle order used by the mode toggle.
    pub const CYCLE: [Deficiency; 4] = [
        Deficiency::Normal,
        Deficiency::Protanopia,
        Deficiency::Deuteranopia,
        Deficiency::Tritanopia,
    ];

    pub fn next(self) -> Deficiency {
        match self {
            Deficiency::Normal => Deficiency::Protanopia,
            Deficiency::Protanopia => Deficiency::Deuteranopia,
            Deficiency::Deuteranopia => Deficiency::Tritanopia,
            Deficiency::Tritanopia => Deficiency::Normal,
        }
    }

    /// Short mode label, also the prefix of the surface filter id.
    pub fn label(self) -> &'static str {
        match self {
            Deficiency::Normal => "normal",
            Deficiency::Protanopia => "protan",
            Deficiency::Deuteranopia => "deutan",
            Deficiency::Tritanopia => "tritan",
        }
    }

    pub fn deficient_channel(self) -> Option<RgbChannel> {
        match self {
            Deficiency::Normal => None,
            Deficiency::Protanopia => Some(RgbChannel::Red),
            Deficiency::Deuteranopia => Some(RgbChannel::Green),
            Deficiency::Tritanopia => Some(RgbChannel::Blue),
        }
    }

    /// The channel outside the pair a deficiency's simulation mixes: red and green
    /// for protan and deutan, green and blue for tritan.
    pub fn unaffected_channel(self) -> Option<RgbChannel> {
        match self {
            Deficiency::Normal => None,
            Deficiency::Protanopia | Deficiency::Deuteranopia => Some(RgbChannel::Blue),
            Deficiency::Tritanopia => Some(RgbChannel::Red),
        }
    }
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Deficiency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" | "none" => Ok(Deficiency::Normal),
            "protan" | "protanopia" => Ok(Deficiency::Protanopia),
            "deutan" | "deuteranopia" => Ok(Deficiency::Deuteranopia),
            "tritan" | "tritanopia" => Ok(Deficiency::Tritanopia),
            other => Err(format!("unknown deficiency '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_visits_every_type_and_returns() {
        let mut current = Deficiency::Normal;
        for expected in Deficiency::CYCLE.iter().cycle().skip(1).take(8) {
            current = current.next();
            assert_eq!(current, *expected);
        }
        assert_eq!(current, Deficiency::Normal);
    }

    #[test]
    fn labels_parse_back() {
        for deficiency in Deficiency::CYCLE {
            assert_eq!(deficiency.label().parse::<Deficiency>().unwrap(), deficiency);
        }
        assert_eq!("Tritanopia".parse::<Deficiency>().unwrap(), Deficiency::Tritanopia);
        assert!("achromat".parse::<Deficiency>().is_err());
    }

    #[test]
    fn deficient_channels() {
        assert_eq!(Deficiency::Normal.deficient_channel(), None);
        assert_eq!(Deficiency::Protanopia.deficient_channel(), Some(RgbChannel::Red));
        assert_eq!(Deficiency::Deuteranopia.deficient_channel(), Some(RgbChannel::Green));
        assert_eq!(Deficiency::Tritanopia.deficient_channel(), Some(RgbChannel::Blue));
        assert_eq!(Deficiency::Protanopia.unaffected_channel(), Some(RgbChannel::Blue));
        assert_eq!(Deficiency::Tritanopia.unaffected_channel(), Some(RgbChannel::Red));
    }
}
