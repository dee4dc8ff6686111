use tracing::warn;

/// One labelled interval from a TextGrid tier.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    /// Interval start in seconds.
    pub xmin: f64,
    /// The raw interval mark, quotes already decoded.
    pub text: String,
}

/// Extract the intervals of the "Speaker" tier from a long-format Praat
/// TextGrid. Files without a Speaker tier yield no intervals; individual
/// intervals that cannot be decoded are skipped with a warning rather than
/// failing the file.
pub fn parse_speaker_tier(content: &str) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut in_speaker_tier = false;
    let mut in_interval = false;
    let mut pending_xmin: Option<f64> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        if line.starts_with("item [") {
            // A new tier begins; its name arrives on a following line.
            in_speaker_tier = false;
            in_interval = false;
            pending_xmin = None;
        } else if let Some(value) = field_value(line, "name") {
            in_speaker_tier = unquote(value).as_deref() == Some("Speaker");
        } else if line.starts_with("intervals [") {
            in_interval = in_speaker_tier;
            pending_xmin = None;
        } else if in_interval {
            if let Some(value) = field_value(line, "xmin") {
                match value.parse::<f64>() {
                    Ok(xmin) => pending_xmin = Some(xmin),
                    Err(_) => warn!("Skipping interval with unreadable xmin '{}'", value),
                }
            } else if let Some(value) = field_value(line, "text") {
                match (pending_xmin.take(), unquote(value)) {
                    (Some(xmin), Some(text)) => intervals.push(Interval { xmin, text }),
                    _ => warn!("Skipping interval with unreadable text line '{}'", line),
                }
            }
        }
    }

    intervals
}

/// `xmin = 0.5` -> `0.5`; returns None when the line is for another key.
fn field_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?.trim_start();
    let rest = rest.strip_prefix('=')?;
    Some(rest.trim())
}

/// Strip the surrounding quotes of a TextGrid string and decode the doubled
/// quote escape Praat uses.
fn unquote(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.replace("\"\"", "\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"File type = "ooTextFile"
Object class = "TextGrid"

xmin = 0
xmax = 4.2
tiers? <exists>
size = 2
item []:
    item [1]:
        class = "IntervalTier"
        name = "Noise"
        xmin = 0
        xmax = 4.2
        intervals: size = 1
        intervals [1]:
            xmin = 0
            xmax = 4.2
            text = "background hum"
    item [2]:
        class = "IntervalTier"
        name = "Speaker"
        xmin = 0
        xmax = 4.2
        intervals: size = 3
        intervals [1]:
            xmin = 0.0
            xmax = 1.4
            text = "hello there"
        intervals [2]:
            xmin = 1.4
            xmax = 2.0
            text = ""
        intervals [3]:
            xmin = 2.0
            xmax = 4.2
            text = "she said ""ouch"" twice"
"#;

    #[test]
    fn extracts_only_the_speaker_tier() {
        let intervals = parse_speaker_tier(SAMPLE);
        assert_eq!(intervals.len(), 3);
        assert_eq!(intervals[0].text, "hello there");
        assert_eq!(intervals[0].xmin, 0.0);
        assert_eq!(intervals[2].xmin, 2.0);
    }

    #[test]
    fn doubled_quotes_are_decoded() {
        let intervals = parse_speaker_tier(SAMPLE);
        assert_eq!(intervals[2].text, "she said \"ouch\" twice");
    }

    #[test]
    fn empty_marks_are_kept_verbatim() {
        let intervals = parse_speaker_tier(SAMPLE);
        assert_eq!(intervals[1].text, "");
    }

    #[test]
    fn file_without_speaker_tier_yields_nothing() {
        let content = SAMPLE.replace("name = \"Speaker\"", "name = \"Other\"");
        assert!(parse_speaker_tier(&content).is_empty());
    }

    #[test]
    fn tier_level_bounds_are_not_intervals() {
        // The tier's own xmin/xmax lines precede any `intervals [` marker and
        // must not pair up with the first interval's text.
        let intervals = parse_speaker_tier(SAMPLE);
        assert_eq!(intervals[0].xmin, 0.0);
    }
}
