pub mod answer;
pub mod keyseq;
pub mod sheet;

pub use answer::{decode_answer, has_answer_variant};
pub use keyseq::decode_keypress_sequence;
pub use sheet::{Row, Sheet};
