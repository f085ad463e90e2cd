/// Colour class of a displayed match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreClass {
    Success,
    Neutral,
    Warning,
}

impl ScoreClass {
    /// `> 0.85` success, `< 0.7` warning; both bounds are neutral.
    pub fn from_score(score: f64) -> Self {
        if score > 0.85 {
            ScoreClass::Success
        } else if score < 0.7 {
            ScoreClass::Warning
        } else {
            ScoreClass::Neutral
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ScoreClass::Success => "success",
            ScoreClass::Neutral => "neutral",
            ScoreClass::Warning => "warning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_class_cutoffs() {
        assert_eq!(ScoreClass::from_score(0.95), ScoreClass::Success);
        assert_eq!(ScoreClass::from_score(0.8501), ScoreClass::Success);
        assert_eq!(ScoreClass::from_score(0.85), ScoreClass::Neutral);
        assert_eq!(ScoreClass::from_score(0.75), ScoreClass::Neutral);
        assert_eq!(ScoreClass::from_score(0.7), ScoreClass::Neutral);
        assert_eq!(ScoreClass::from_score(0.6999), ScoreClass::Warning);
        assert_eq!(ScoreClass::from_score(0.0), ScoreClass::Warning);
    }

    #[test]
    fn test_css_class_names() {
        assert_eq!(ScoreClass::Success.css_class(), "success");
        assert_eq!(ScoreClass::Neutral.css_class(), "neutral");
        assert_eq!(ScoreClass::Warning.css_class(), "warning");
    }
}
