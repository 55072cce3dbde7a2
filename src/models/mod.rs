pub mod campus;
pub mod clinic;
pub mod enums;
pub mod patient;
pub mod referral;
pub mod staff;

pub use campus::*;
pub use clinic::*;
pub use enums::*;
pub use patient::*;
pub use referral::*;
pub use staff::*;
