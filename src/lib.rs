// Tandem: side-by-side research output analytics for two institutions
//
// This is the library root. Records are normalized first, analysis and
// embedding work on the normalized records, and the session/pipeline layer
// ties loading, recomputes and search together for the CLI.

pub mod analysis;
pub mod config;
pub mod embedding;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod session;
pub mod sources;
