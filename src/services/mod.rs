pub mod description;

pub use description::{DescriptionGenerator, GenerationError};
