//! Deep link entry point into the active verification session

mod resolver;


pub use resolver::DeepLinkResolver;
