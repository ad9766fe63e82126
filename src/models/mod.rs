pub mod record;
pub mod release;

pub use record::{FeedItem, PackageRecord, Snapshot};
pub use release::{ReleaseMetadata, ReleaseUrl};
