pub mod engine;
pub mod outcome;
pub mod rules;

pub use engine::{aggregate, AggregateOutput};
pub use outcome::{AggregatedItem, Exclusion, ExclusionDirection, FinalMethod, RawValue};
