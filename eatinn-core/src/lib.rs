pub mod duration;
pub mod error;
pub mod filters;
pub mod types;
pub mod validation;

pub use duration::Timing;
pub use error::{FormatError, ValidationErrors};
pub use filters::{Direction, Filters, ListQuery, Metadata, SortColumn};
pub use types::{ImageType, IngredientEntry, InstructionStep, Recipe, RecipeSummary};
