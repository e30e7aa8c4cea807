mod accumulator;
mod record;

pub use accumulator::NutritionTotal;
pub use record::{FormattedNutrients, NutrientRecord};
