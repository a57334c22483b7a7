use log::{debug, trace};

use crate::constants::{DEFAULT_GENERATOR, MAX_LINE_LENGTH, MEDIA_TYPE};
use crate::line::{Line, MetaContent, MetaLine};

use super::Header;
use super::escape::escape;

/// Prefix of a physical continuation line.
const CONTINUATION: &str = "0000 ";

/// Render header values and body lines as FLT source.
///
/// The header is always written first, in fixed order, with the library's own
/// generator. Non-DC metadata follows, then Dublin Core entries sorted by term,
/// then everything else in document order.
pub fn render(header: &Header, lines: &[Line]) -> String {
    let mut ordered: Vec<Line> = vec![
        MetaLine::new(MetaContent::Doctype(MEDIA_TYPE.to_string())).into(),
        MetaLine::new(MetaContent::Version(header.version)).into(),
        MetaLine::new(MetaContent::Features(header.features)).into(),
        MetaLine::new(MetaContent::Generator(DEFAULT_GENERATOR.to_string())).into(),
    ];

    let (meta, other): (Vec<&Line>, Vec<&Line>) =
        lines.iter().partition(|line| line.as_meta().is_some());
    let (mut dc, meta): (Vec<&Line>, Vec<&Line>) =
        meta.into_iter().partition(|line| line.as_dc().is_some());
    dc.sort_by(|a, b| dc_term(a).cmp(dc_term(b)));

    ordered.extend(meta.into_iter().cloned());
    ordered.extend(dc.into_iter().cloned());
    ordered.extend(other.into_iter().cloned());

    let physical: Vec<String> = ordered
        .iter()
        .flat_map(|line| wrap(&escape(&line.to_string())))
        .collect();
    debug!(
        "rendered {} logical lines as {} physical lines",
        ordered.len(),
        physical.len()
    );
    physical.join("\n")
}

fn dc_term(line: &Line) -> &str {
    line.as_dc().map_or("", |entry| entry.term())
}

/// Cut an escaped line into chunks of at most [`MAX_LINE_LENGTH`] characters.
/// Every chunk after the first becomes a continuation line.
pub(crate) fn wrap(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= MAX_LINE_LENGTH {
        return vec![line.to_string()];
    }

    trace!("wrapping line of {} characters", chars.len());
    let mut physical = Vec::new();
    let mut rest = chars.as_slice();
    while !rest.is_empty() {
        let mut end = rest.len().min(MAX_LINE_LENGTH);
        // A carriage return before the line separator would be absorbed by it
        while end < rest.len() && end > 1 && rest[end - 1] == '\r' {
            end -= 1;
        }
        let chunk: String = rest[..end].iter().collect();
        physical.push(if physical.is_empty() {
            chunk
        } else {
            format!("{CONTINUATION}{chunk}")
        });
        rest = &rest[end..];
    }
    physical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Features;
    use crate::line::{Style, TextLine, TypedContent, TypedLine};
    use insta::assert_snapshot;

    fn header() -> Header {
        Header {
            version: 1,
            features: Features::new(1),
        }
    }

    #[test]
    fn test_render_empty_document() {
        assert_snapshot!(render(&header(), &[]), @r"
        0003 0 text/vnd.ficlab.flt
        0003 1 1
        0003 2 1
        0003 4 https://github.com/ficlabapp/flt
        ");
    }

    #[test]
    fn test_render_orders_meta_before_body() {
        let lines: Vec<Line> = vec![
            TextLine::new("Hello").with_style(Style::Italic).into(),
            MetaLine::new_dc("title", "Story").unwrap().into(),
            TypedLine::new(TypedContent::Paragraph).into(),
            MetaLine::new_dc("creator", "Someone").unwrap().into(),
            TextLine::new("line one\nline two \\o/").into(),
        ];
        assert_snapshot!(render(&header(), &lines), @r"
        0003 0 text/vnd.ficlab.flt
        0003 1 1
        0003 2 1
        0003 4 https://github.com/ficlabapp/flt
        0003 3 creator Someone
        0003 3 title Story
        0011 Hello
        0002 2
        0001 line one\nline two \\o/
        ");
    }

    #[test]
    fn test_render_version_and_features_in_hex() {
        let header = Header {
            version: 26,
            features: Features::new(0x1f),
        };
        let rendered = render(&header, &[]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], "0003 1 1a");
        assert_eq!(lines[2], "0003 2 1f");
    }

    #[test]
    fn test_wrap_short_line_untouched() {
        let line = "x".repeat(MAX_LINE_LENGTH);
        assert_eq!(wrap(&line), vec![line]);
    }

    #[test]
    fn test_wrap_long_line() {
        let line = "y".repeat(MAX_LINE_LENGTH * 2 + 5);
        let wrapped = wrap(&line);
        assert_eq!(wrapped.len(), 3);
        assert_eq!(wrapped[0].chars().count(), MAX_LINE_LENGTH);
        assert_eq!(wrapped[1], format!("0000 {}", "y".repeat(MAX_LINE_LENGTH)));
        assert_eq!(wrapped[2], "0000 yyyyy");
    }

    #[test]
    fn test_wrap_never_ends_a_chunk_on_carriage_return() {
        let line = format!("0001 {}\r{}", "a".repeat(72), "b".repeat(10));
        let wrapped = wrap(&line);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0], format!("0001 {}", "a".repeat(72)));
        assert_eq!(wrapped[1], format!("0000 \r{}", "b".repeat(10)));
    }

    #[test]
    fn test_wrap_counts_characters_not_bytes() {
        let line = "é".repeat(MAX_LINE_LENGTH + 1);
        let wrapped = wrap(&line);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[1], "0000 é");
    }
}
