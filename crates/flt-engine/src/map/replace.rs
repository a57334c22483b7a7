use regex::Captures;

/// Expand a replacement template against one match.
///
/// - `$1` to `$99`: capture group (empty when the group did not participate)
/// - `$&`: the whole match
/// - `$$`: a literal `$`
///
/// Two digits are read as one group number only when that group exists, so
/// `$10` is group 1 followed by `0` in a pattern with fewer than ten groups.
/// Anything else after `$` is kept literally.
pub fn expand_template(template: &str, caps: &Captures<'_>) -> String {
    let group = |n: usize| caps.get(n).map_or("", |m| m.as_str());
    let exists = |n: usize| n >= 1 && n < caps.len();

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let mut digits = after.bytes().take_while(u8::is_ascii_digit);

        match (after.as_bytes().first().copied(), digits.next(), digits.next()) {
            (Some(b'$'), ..) => {
                out.push('$');
                rest = &after[1..];
            }
            (Some(b'&'), ..) => {
                out.push_str(group(0));
                rest = &after[1..];
            }
            (_, Some(d1), d2) => {
                let one = usize::from(d1 - b'0');
                let two = d2.map(|d2| one * 10 + usize::from(d2 - b'0'));
                match two {
                    Some(n) if exists(n) => {
                        out.push_str(group(n));
                        rest = &after[2..];
                    }
                    _ if exists(one) => {
                        out.push_str(group(one));
                        rest = &after[1..];
                    }
                    _ => {
                        out.push('$');
                        rest = after;
                    }
                }
            }
            _ => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
