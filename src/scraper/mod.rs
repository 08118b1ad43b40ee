pub mod traits;
pub mod fetcher;

pub use fetcher::HttpPortalSession;
pub use traits::PortalSession;
