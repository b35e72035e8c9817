use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UrgencyLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
    Emergency => "emergency",
});

impl UrgencyLevel {
    /// Lenient lookup used on backend replies: trimmed, case-insensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        key.trim().to_ascii_lowercase().parse().ok()
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Low => Severity::Mild,
            Self::Medium => Severity::Moderate,
            Self::High => Severity::High,
            Self::Emergency => Severity::Emergency,
        }
    }

    /// Fixed advisory sentence appended to every summary at this urgency.
    pub fn advisory(&self) -> &'static str {
        match self {
            Self::Low => {
                "This is usually manageable with self-care, but keep an eye on how it develops."
            }
            Self::Medium => {
                "Consider booking an appointment with a healthcare provider in the next few days."
            }
            Self::High => "Please contact a healthcare provider as soon as possible.",
            Self::Emergency => {
                "Seek emergency medical care immediately or call your local emergency number."
            }
        }
    }
}

/// Urgency on the canonical 1–4 scale.
///
/// Serialized as the bare integer; any other integer is rejected on
/// deserialization, so a stored result can never carry an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    Mild = 1,
    Moderate = 2,
    High = 3,
    Emergency = 4,
}

impl Severity {
    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Emergency => "emergency",
        }
    }

    pub fn urgency(&self) -> UrgencyLevel {
        match self {
            Self::Mild => UrgencyLevel::Low,
            Self::Moderate => UrgencyLevel::Medium,
            Self::High => UrgencyLevel::High,
            Self::Emergency => UrgencyLevel::Emergency,
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Mild),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::High),
            4 => Ok(Self::Emergency),
            other => Err(ModelError::InvalidSeverity(other)),
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.level()
    }
}
