//! Release versions and the windows resolved over them
//!
//! - **version**: catalog versions ordered by identity, build metadata ignored
//! - **license**: editions and the license classes the catalog is queried by
//! - **resolver**: turns a ceiling plus a floor (or N-minus offset) into the
//!   released versions inside that window

pub mod license;
pub mod resolver;
pub mod version;

pub use license::{EDITIONS, LicenseClass};
pub use resolver::{VersionRangeRequest, VersionRangeResult, VersionResolver};
pub use version::Version;
