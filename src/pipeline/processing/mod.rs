// Pipeline processing: pure record transformations, composed in order
// normalize -> enrich -> score -> segment -> report

pub mod enrich;
pub mod normalize;
pub mod profile;
pub mod report;
pub mod score;
pub mod segment;
