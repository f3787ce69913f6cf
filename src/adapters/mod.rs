// Adapters layer: concrete mappings for external systems.

pub mod discogs;
