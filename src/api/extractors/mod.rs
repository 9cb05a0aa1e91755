//! Custom request extractors.

mod id_path;
mod validated_json;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
