//! Buffered conversation history and the time filters used to select from it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::utils::Timestamp;

/// One line of retained history.
///
/// `format` is a protocol line in which `{target}` stands for the recipient's
/// current nickname and `{text}` for the message text, so the same line can be
/// rendered for whichever client is being sent it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BufferedLine {
    pub timestamp: Timestamp,
    pub format: String,
    #[serde(default)]
    pub text: String,
}

impl BufferedLine {
    pub fn new(timestamp: Timestamp, format: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            format: format.into(),
            text: text.into(),
        }
    }

    /// Produce the protocol line as it should be sent to a client using `nick`
    pub fn render(&self, nick: &str) -> String {
        self.format
            .replace("{target}", nick)
            .replace("{text}", &self.text)
    }
}

/// The retained history of a single channel or query, oldest first.
///
/// If `limit` is set, pushing past it drops the oldest line.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversationBuffer {
    lines: VecDeque<BufferedLine>,
    #[serde(default)]
    limit: Option<usize>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            limit: Some(limit),
        }
    }

    pub fn push(&mut self, line: BufferedLine) {
        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            while self.lines.len() >= limit {
                self.lines.pop_front();
            }
        }
        self.lines.push_back(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BufferedLine> {
        self.lines.iter()
    }
}

impl FromIterator<BufferedLine> for ConversationBuffer {
    fn from_iter<I: IntoIterator<Item = BufferedLine>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
            limit: None,
        }
    }
}

/// One end of a replay time range.
///
/// A bound given in whole seconds compares against the whole-second part of each
/// line's timestamp; a fractional bound compares at full precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeBound {
    Seconds(i64),
    Exact(Timestamp),
}

impl TimeBound {
    /// Interpret a client-supplied timestamp argument.
    ///
    /// A negative value means "no bound" and gives `None`. Anything that isn't a
    /// number is treated as `0`.
    pub fn parse(arg: &str) -> Option<Self> {
        let arg = arg.trim();
        if let Ok(secs) = arg.parse::<i64>() {
            return (secs >= 0).then_some(TimeBound::Seconds(secs));
        }
        match arg.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                (value >= 0.0).then(|| TimeBound::Exact(Timestamp::from(value)))
            }
            _ => {
                tracing::debug!("Treating malformed timestamp {:?} as 0", arg);
                Some(TimeBound::Seconds(0))
            }
        }
    }

    fn at_or_before(&self, ts: &Timestamp) -> bool {
        match self {
            TimeBound::Seconds(secs) => *secs <= ts.secs(),
            TimeBound::Exact(bound) => bound <= ts,
        }
    }

    fn at_or_after(&self, ts: &Timestamp) -> bool {
        match self {
            TimeBound::Seconds(secs) => *secs >= ts.secs(),
            TimeBound::Exact(bound) => bound >= ts,
        }
    }
}

/// Which lines of a buffer a replay should include
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeFilter {
    /// Lines with `from <= timestamp <= to`; a missing bound is open
    Range {
        from: Option<TimeBound>,
        to: Option<TimeBound>,
    },
    /// Lines strictly after the given whole second. A watermark of zero or less
    /// selects everything.
    Since(i64),
}

impl TimeFilter {
    pub fn everything() -> Self {
        TimeFilter::Range { from: None, to: None }
    }

    pub fn starting_at(bound: Option<TimeBound>) -> Self {
        TimeFilter::Range { from: bound, to: None }
    }

    pub fn matches(&self, ts: &Timestamp) -> bool {
        match self {
            TimeFilter::Range { from, to } => {
                from.map_or(true, |from| from.at_or_before(ts))
                    && to.map_or(true, |to| to.at_or_after(ts))
            }
            TimeFilter::Since(watermark) => *watermark <= 0 || ts.secs() > *watermark,
        }
    }

    /// Select the matching lines, preserving their order
    pub fn apply<'a>(&self, lines: impl IntoIterator<Item = &'a BufferedLine>) -> Vec<BufferedLine> {
        lines
            .into_iter()
            .filter(|line| self.matches(&line.timestamp))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> ConversationBuffer {
        [(10, "a"), (20, "b"), (30, "c")]
            .into_iter()
            .map(|(ts, text)| {
                BufferedLine::new(Timestamp::from_secs(ts), ":n!u@h PRIVMSG #x :{text}", text)
            })
            .collect()
    }

    fn texts(lines: &[BufferedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn render_substitutes_placeholders() {
        let line = BufferedLine::new(Timestamp::default(), ":n!u@h PRIVMSG {target} :{text}", "hi {target}");
        assert_eq!(line.render("me"), ":n!u@h PRIVMSG me :hi {target}");
    }

    #[test]
    fn limit_evicts_oldest() {
        let mut buf = ConversationBuffer::with_limit(2);
        for line in buffer().iter() {
            buf.push(line.clone());
        }
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.iter().next().map(|l| l.text.as_str()), Some("b"));
    }

    #[test]
    fn range_is_inclusive() {
        let buf = buffer();
        let filter = TimeFilter::Range {
            from: Some(TimeBound::Seconds(20)),
            to: Some(TimeBound::Seconds(30)),
        };
        assert_eq!(texts(&filter.apply(buf.iter())), ["b", "c"]);

        let filter = TimeFilter::Range {
            from: Some(TimeBound::Seconds(10)),
            to: Some(TimeBound::Seconds(20)),
        };
        assert_eq!(texts(&filter.apply(buf.iter())), ["a", "b"]);
    }

    #[test]
    fn open_range() {
        let buf = buffer();
        assert_eq!(texts(&TimeFilter::everything().apply(buf.iter())), ["a", "b", "c"]);
        assert_eq!(texts(&TimeFilter::starting_at(Some(TimeBound::Seconds(15))).apply(buf.iter())), ["b", "c"]);
    }

    #[test]
    fn whole_second_bounds_ignore_fraction() {
        let line = BufferedLine::new(Timestamp::new(20, 500_000), "x", "");
        let upto = TimeFilter::Range { from: None, to: Some(TimeBound::Seconds(20)) };
        assert!(upto.matches(&line.timestamp));

        let exact = TimeFilter::Range { from: None, to: Some(TimeBound::Exact(Timestamp::from_secs(20))) };
        assert!(!exact.matches(&line.timestamp));

        let after = TimeFilter::starting_at(Some(TimeBound::Exact(Timestamp::new(20, 250_000))));
        assert!(after.matches(&line.timestamp));
    }

    #[test]
    fn watermark_is_strict() {
        let buf = buffer();
        assert_eq!(texts(&TimeFilter::Since(20).apply(buf.iter())), ["c"]);
        assert_eq!(texts(&TimeFilter::Since(0).apply(buf.iter())), ["a", "b", "c"]);

        let first = TimeFilter::Since(10).apply(buf.iter());
        let newest = first.last().map(|l| l.timestamp.secs()).unwrap_or_default();
        assert!(TimeFilter::Since(newest).apply(buf.iter()).is_empty());
    }

    #[test]
    fn parse_bounds() {
        assert_eq!(TimeBound::parse("15"), Some(TimeBound::Seconds(15)));
        assert_eq!(TimeBound::parse("15.5"), Some(TimeBound::Exact(Timestamp::new(15, 500_000))));
        assert_eq!(TimeBound::parse("-1"), None);
        assert_eq!(TimeBound::parse("-0.5"), None);
        assert_eq!(TimeBound::parse("soon"), Some(TimeBound::Seconds(0)));
        assert_eq!(TimeBound::parse("NaN"), Some(TimeBound::Seconds(0)));
    }
}
