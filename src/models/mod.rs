mod report;
mod trial;

pub use report::{ParticipantTable, StrategyReport, VviqScore};
pub use trial::{score_correctness, Block, Dimension, RotationType, Trial};
