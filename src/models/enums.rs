use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The literal doubles as the serde wire form and the TEXT column value.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(TimeSlot {
    Morning => "MORNING",
    Afternoon => "AFTERNOON",
    Evening => "EVENING",
    Night => "NIGHT",
});

str_enum!(IntakeStatus {
    Taken => "TAKEN",
    Missed => "MISSED",
});

str_enum!(TimeWindow {
    SevenDays => "7d",
    FourteenDays => "14d",
    ThirtyDays => "30d",
});

impl TimeWindow {
    /// Days subtracted from today to obtain the window start. The resolved
    /// window is inclusive on both ends, so it spans `days() + 1` calendar days.
    pub fn days(&self) -> i64 {
        match self {
            TimeWindow::SevenDays => 7,
            TimeWindow::FourteenDays => 14,
            TimeWindow::ThirtyDays => 30,
        }
    }
}
