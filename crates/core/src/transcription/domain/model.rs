use std::fmt;
use std::str::FromStr;

use crate::shared::constants::WHISPER_MODEL_BASE_URL;

/// Whisper model size selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    pub fn all() -> &'static [ModelSize] {
        &[
            ModelSize::Tiny,
            ModelSize::Base,
            ModelSize::Small,
            ModelSize::Medium,
            ModelSize::Large,
        ]
    }

    /// ggml file name as published by the whisper.cpp project.
    pub fn file_name(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "ggml-tiny.bin",
            ModelSize::Base => "ggml-base.bin",
            ModelSize::Small => "ggml-small.bin",
            ModelSize::Medium => "ggml-medium.bin",
            ModelSize::Large => "ggml-large-v3.bin",
        }
    }

    pub fn url(&self) -> String {
        format!("{WHISPER_MODEL_BASE_URL}/{}", self.file_name())
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ModelSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" => Ok(ModelSize::Large),
            other => Err(format!(
                "Model must be one of: tiny, base, small, medium, large, got '{other}'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("tiny", ModelSize::Tiny)]
    #[case("base", ModelSize::Base)]
    #[case("small", ModelSize::Small)]
    #[case("medium", ModelSize::Medium)]
    #[case("large", ModelSize::Large)]
    fn test_parse_valid_sizes(#[case] input: &str, #[case] expected: ModelSize) {
        assert_eq!(input.parse::<ModelSize>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_size_is_error() {
        let err = "huge".parse::<ModelSize>().unwrap_err();
        assert!(err.contains("huge"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for size in ModelSize::all() {
            assert_eq!(size.to_string().parse::<ModelSize>().unwrap(), *size);
        }
    }

    #[test]
    fn test_url_points_at_file_name() {
        let url = ModelSize::Base.url();
        assert!(url.ends_with("ggml-base.bin"));
    }
}
