pub mod covers;

pub use covers::{
    ConfigManager, CoverCacheConfig, CoverCacheError, CoverCacheService, CoverCacheStats,
    CoverPaths,
};
