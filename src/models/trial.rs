use serde::{Deserialize, Serialize};

/// Stimulus dimensionality of a trial.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Dimension {
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::TwoD => "2D",
            Dimension::ThreeD => "3D",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "2D" => Some(Dimension::TwoD),
            "3D" => Some(Dimension::ThreeD),
            _ => None,
        }
    }
}

/// Rotation axis manipulation, applicable to 3D stimuli only. Raw values
/// outside the recognized set normalize to `NotApplicable`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RotationType {
    #[serde(rename = "p")]
    Picture,
    #[serde(rename = "d")]
    Depth,
    #[serde(rename = "na")]
    NotApplicable,
}

impl RotationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationType::Picture => "p",
            RotationType::Depth => "d",
            RotationType::NotApplicable => "na",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "p" => RotationType::Picture,
            "d" => RotationType::Depth,
            _ => RotationType::NotApplicable,
        }
    }
}

/// Coarse experimental condition bucket: dimensionality crossed with
/// rotation type and working-memory load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Block {
    #[serde(rename = "2D_single")]
    TwoDSingle,
    #[serde(rename = "2D_wm")]
    TwoDWm,
    #[serde(rename = "3Dp_single")]
    ThreeDpSingle,
    #[serde(rename = "3Dp_wm")]
    ThreeDpWm,
    #[serde(rename = "3Dd_single")]
    ThreeDdSingle,
    #[serde(rename = "3Dd_wm")]
    ThreeDdWm,
}

impl Block {
    pub fn as_str(&self) -> &'static str {
        match self {
            Block::TwoDSingle => "2D_single",
            Block::TwoDWm => "2D_wm",
            Block::ThreeDpSingle => "3Dp_single",
            Block::ThreeDpWm => "3Dp_wm",
            Block::ThreeDdSingle => "3Dd_single",
            Block::ThreeDdWm => "3Dd_wm",
        }
    }

    /// Derive the block from the three design flags. Combinations outside
    /// the six-block design are unclassifiable, never an error; such rows
    /// stay in the table without a block.
    pub fn classify(
        dimension: Dimension,
        rot_type: RotationType,
        wm: Option<bool>,
    ) -> Option<Block> {
        match (dimension, rot_type, wm?) {
            (Dimension::TwoD, _, false) => Some(Block::TwoDSingle),
            (Dimension::TwoD, _, true) => Some(Block::TwoDWm),
            (Dimension::ThreeD, RotationType::Picture, false) => Some(Block::ThreeDpSingle),
            (Dimension::ThreeD, RotationType::Picture, true) => Some(Block::ThreeDpWm),
            (Dimension::ThreeD, RotationType::Depth, false) => Some(Block::ThreeDdSingle),
            (Dimension::ThreeD, RotationType::Depth, true) => Some(Block::ThreeDdWm),
            (Dimension::ThreeD, RotationType::NotApplicable, _) => None,
        }
    }
}

/// Score a response against the expected key. A trial without a recorded
/// answer is unscored, never incorrect.
pub fn score_correctness(ans_key: Option<&str>, correct_ans: Option<&str>) -> Option<bool> {
    let ans = ans_key?;
    Some(correct_ans == Some(ans))
}

/// One completed stimulus-response event, normalized. Created once during
/// normalization and immutable afterwards; analysis views derive new tables
/// instead of touching these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    /// Position within this participant's trial stream (dense, 0-based).
    pub idx: usize,
    pub participant: String,
    pub dimension: Option<Dimension>,
    pub rot_type: RotationType,
    pub angle: Option<f64>,
    pub mirror: Option<bool>,
    pub wm: Option<bool>,
    pub pair_id: String,
    pub obj_id: String,
    pub orientation1: String,
    pub orientation2: String,
    pub image_path_1: String,
    pub image_path_2: String,
    pub marker_id: String,
    pub correct_ans: Option<String>,
    pub ans_key: Option<String>,
    pub rt: Option<f64>,
    pub corr: Option<bool>,
    pub block: Option<Block>,
    pub vivid_response: Option<u8>,
    pub vivid_rt: Option<f64>,
    pub strategy_response: Option<u8>,
    pub strategy_rt: Option<f64>,
    /// Sub-grouping of trials sharing one strategy self-report.
    pub mini_block: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_all_six_blocks() {
        assert_eq!(
            Block::classify(Dimension::TwoD, RotationType::NotApplicable, Some(false)),
            Some(Block::TwoDSingle)
        );
        assert_eq!(
            Block::classify(Dimension::TwoD, RotationType::Picture, Some(true)),
            Some(Block::TwoDWm)
        );
        assert_eq!(
            Block::classify(Dimension::ThreeD, RotationType::Picture, Some(false)),
            Some(Block::ThreeDpSingle)
        );
        assert_eq!(
            Block::classify(Dimension::ThreeD, RotationType::Picture, Some(true)),
            Some(Block::ThreeDpWm)
        );
        assert_eq!(
            Block::classify(Dimension::ThreeD, RotationType::Depth, Some(false)),
            Some(Block::ThreeDdSingle)
        );
        assert_eq!(
            Block::classify(Dimension::ThreeD, RotationType::Depth, Some(true)),
            Some(Block::ThreeDdWm)
        );
    }

    #[test]
    fn out_of_taxonomy_combinations_are_unclassifiable() {
        // 3D with an unrecognized rotation type ("x" normalizes to na).
        assert_eq!(
            Block::classify(Dimension::ThreeD, RotationType::parse("x"), Some(false)),
            None
        );
        assert_eq!(
            Block::classify(Dimension::ThreeD, RotationType::NotApplicable, Some(true)),
            None
        );
        // Missing working-memory flag.
        assert_eq!(
            Block::classify(Dimension::TwoD, RotationType::NotApplicable, None),
            None
        );
    }

    #[test]
    fn correctness_requires_an_answer() {
        assert_eq!(score_correctness(None, Some("left")), None);
        assert_eq!(score_correctness(Some("left"), Some("left")), Some(true));
        assert_eq!(score_correctness(Some("right"), Some("left")), Some(false));
        // An answer against a missing expected key scores incorrect.
        assert_eq!(score_correctness(Some("left"), None), Some(false));
    }

    #[test]
    fn unrecognized_rotation_type_normalizes_to_na() {
        assert_eq!(RotationType::parse("p"), RotationType::Picture);
        assert_eq!(RotationType::parse("d"), RotationType::Depth);
        assert_eq!(RotationType::parse("x"), RotationType::NotApplicable);
        assert_eq!(RotationType::parse("na"), RotationType::NotApplicable);
    }
}
