use serde::Deserialize;

pub const DEFAULT_MARKER_PHRASE: &str = "Total execution time for current run";
pub const DEFAULT_MARKER_SUFFIX: &str = "ms.";

/// The line format the benchmarked program uses to report its own run time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkerFormat {
    /// Text that identifies the timing line.
    pub phrase: String,
    /// Literal suffix glued to the number, e.g. `1234ms.`. Empty means none.
    pub suffix: String,
}

impl Default for MarkerFormat {
    fn default() -> Self {
        Self {
            phrase: DEFAULT_MARKER_PHRASE.to_string(),
            suffix: DEFAULT_MARKER_SUFFIX.to_string(),
        }
    }
}

impl MarkerFormat {
    /// Pull the millisecond timing out of captured program output.
    ///
    /// Only the first line containing the phrase is considered. Its last
    /// whitespace-delimited token must end in the suffix and the rest must be
    /// an unsigned integer; anything else yields `None`.
    pub fn extract(&self, raw_output: &str) -> Option<u64> {
        let line = raw_output.lines().find(|l| l.contains(&self.phrase))?;
        let token = line.split_whitespace().last()?;
        let digits = token.strip_suffix(self.suffix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// Extract using the default marker format.
pub fn extract(raw_output: &str) -> Option<u64> {
    MarkerFormat::default().extract(raw_output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_marker_value() {
        let out = "starting\n... Total execution time for current run: 1234ms.\ndone\n";
        assert_eq!(extract(out), Some(1234));
    }

    #[test]
    fn no_marker_line() {
        assert_eq!(extract("compressed 300MB\nok\n"), None);
        assert_eq!(extract(""), None);
    }

    #[test]
    fn first_matching_line_wins() {
        let out = "Total execution time for current run: 10ms.\n\
                   Total execution time for current run: 20ms.\n";
        assert_eq!(extract(out), Some(10));
    }

    #[test]
    fn first_match_malformed_does_not_fall_through() {
        let out = "Total execution time for current run: soon\n\
                   Total execution time for current run: 20ms.\n";
        assert_eq!(extract(out), None);
    }

    #[test]
    fn missing_suffix_is_none() {
        assert_eq!(extract("Total execution time for current run: 1234"), None);
        assert_eq!(extract("Total execution time for current run: 1234ms"), None);
    }

    #[test]
    fn non_numeric_is_none() {
        assert_eq!(extract("Total execution time for current run: abcms."), None);
        assert_eq!(extract("Total execution time for current run: -5ms."), None);
        assert_eq!(extract("Total execution time for current run:"), None);
    }

    #[test]
    fn signs_and_bare_suffix_are_none() {
        assert_eq!(extract("Total execution time for current run: +5ms."), None);
        assert_eq!(extract("Total execution time for current run: ms."), None);
        assert_eq!(extract("Total execution time for current run: 1_000ms."), None);
    }

    #[test]
    fn handles_crlf_and_tabs() {
        let out = "x\r\nTotal execution time for current run:\t42ms.\r\n";
        assert_eq!(extract(out), Some(42));
    }

    #[test]
    fn zero_is_a_valid_sample() {
        assert_eq!(extract("Total execution time for current run: 0ms."), Some(0));
    }

    #[test]
    fn empty_suffix_accepts_bare_number() {
        let marker = MarkerFormat {
            phrase: "Total execution time for current run".to_string(),
            suffix: String::new(),
        };
        assert_eq!(
            marker.extract("Total execution time for current run (millis): 987"),
            Some(987)
        );
    }

    #[test]
    fn custom_phrase() {
        let marker = MarkerFormat {
            phrase: "elapsed".to_string(),
            suffix: "ms".to_string(),
        };
        assert_eq!(marker.extract("run 3 elapsed 55ms"), Some(55));
        assert_eq!(marker.extract("Total execution time for current run: 5ms."), None);
    }
}
