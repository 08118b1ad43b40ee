pub mod registry;

pub use registry::OfferRegistry;
