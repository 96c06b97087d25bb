mod json;
mod path;

pub use json::ValidJson;
pub use path::EntityId;
