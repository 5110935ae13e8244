pub mod loaders;
pub mod resource;

pub use loaders::load_catalog;
pub use resource::{
    build_catalog, reference_catalog, CatalogEntry, ChallengeDescriptor, Resource, UnlockCode,
};
