use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

str_enum!(Role {
    Admin => "admin",
    HealthAdmin => "health_admin",
    ClinicManager => "clinic_manager",
    Doctor => "doctor",
    Nurse => "nurse",
    Pharmacist => "pharmacist",
    Receptionist => "receptionist",
    LabStaff => "lab_staff",
});

impl Role {
    /// Fixed permission level per role, used by minimum-level policies.
    /// Higher means broader administrative reach.
    pub fn permission_level(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::HealthAdmin => 80,
            Role::ClinicManager => 60,
            Role::Doctor => 40,
            Role::Nurse => 30,
            Role::Pharmacist => 30,
            Role::LabStaff => 30,
            Role::Receptionist => 20,
        }
    }
}

str_enum!(ClinicType {
    General => "general",
    Dental => "dental",
    Lab => "lab",
    Pharmacy => "pharmacy",
    Other => "other",
});

str_enum!(ActiveStatus {
    Active => "active",
    Inactive => "inactive",
});

str_enum!(ReferralStatus {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
    Completed => "completed",
});

impl ReferralStatus {
    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReferralStatus::Rejected | ReferralStatus::Completed)
    }
}
