use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// Variants are declared in ascending order, so the derived `Ord`
/// ranks the last variant highest.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
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

str_enum!(BloodGroup {
    APos => "A+",
    ANeg => "A-",
    BPos => "B+",
    BNeg => "B-",
    AbPos => "AB+",
    AbNeg => "AB-",
    OPos => "O+",
    ONeg => "O-",
});

// Low < Medium < High < Critical
str_enum!(Urgency {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

str_enum!(RequestStatus {
    Active => "Active",
    Fulfilled => "Fulfilled",
    Cancelled => "Cancelled",
});

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});
