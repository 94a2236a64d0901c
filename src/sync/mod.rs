pub mod synchronizer;
pub mod timeline;

pub use synchronizer::Synchronizer;
pub use timeline::Timeline;
