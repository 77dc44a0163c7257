//! Line-level parsing shared by pass 1 (address assignment) and pass 2 (emission). Parsing
//! is pure syntax: no symbol lookup or expression evaluation happens here.

#[derive(Debug, Clone)]
pub(crate) enum Directive {
    Equ(String),
    Org(String),
    Word(Vec<String>),
    Byte(Vec<String>),
    StringDir(String),
    BString(String),
    PbString(String),
}

#[derive(Debug, Clone)]
pub(crate) struct ParsedLine {
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub operand_text: String,
    pub directive: Option<Directive>,
    pub raw: String,
}

pub(crate) fn parse_line(raw: &str) -> ParsedLine {
    let without_comment = strip_comment(raw);

    // `name EQU expr` binds `name` itself, with no trailing colon the way instruction
    // labels use one; recognise this shape before the generic label/mnemonic split.
    if let Some(parsed) = try_parse_equ(&without_comment, raw) {
        return parsed;
    }

    let (label, rest) = split_label(&without_comment);
    let (mnemonic_raw, operand_text) = split_mnemonic(&rest);

    if mnemonic_raw.is_empty() {
        return ParsedLine {
            label,
            mnemonic: None,
            operand_text,
            directive: None,
            raw: raw.to_string(),
        };
    }

    let mnemonic_lower = mnemonic_raw.to_lowercase();
    let directive = match mnemonic_lower.as_str() {
        "equ" => Some(Directive::Equ(operand_text.clone())),
        "org" => Some(Directive::Org(operand_text.clone())),
        "word" => Some(Directive::Word(split_args(&operand_text))),
        "byte" => Some(Directive::Byte(split_args(&operand_text))),
        "string" => Some(Directive::StringDir(decode_quoted_chunks(&operand_text))),
        "bstring" => Some(Directive::BString(decode_quoted_chunks(&operand_text))),
        "pbstring" => Some(Directive::PbString(decode_quoted_chunks(&operand_text))),
        _ => None,
    };

    ParsedLine {
        label,
        mnemonic: Some(mnemonic_lower),
        operand_text,
        directive,
        raw: raw.to_string(),
    }
}

/// Number of 24-bit words a directive occupies, per the data/address-advancement rules.
pub(crate) fn directive_word_count(directive: &Directive) -> u32 {
    match directive {
        Directive::Equ(_) | Directive::Org(_) => 0,
        Directive::Word(values) => values.len() as u32,
        Directive::Byte(values) => ((values.len() as u32) + 2) / 3,
        Directive::StringDir(chars) => chars.chars().count() as u32,
        Directive::BString(chars) => ((chars.chars().count() as u32) + 2) / 3,
        Directive::PbString(chars) => (((chars.chars().count() as u32) + 1) + 2) / 3,
    }
}

/// Recognise the `name EQU expr` directive shape, which binds `name` directly rather than
/// attaching a `label:` to the current address.
fn try_parse_equ(without_comment: &str, raw: &str) -> Option<ParsedLine> {
    let trimmed = without_comment.trim();
    let mut rest = trimmed;
    let name_end = rest.find(char::is_whitespace)?;
    let name = &rest[..name_end];
    if name.is_empty() || !name.chars().next().unwrap().is_alphabetic() {
        return None;
    }
    rest = rest[name_end..].trim_start();
    let kw_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let keyword = &rest[..kw_end];
    if !keyword.eq_ignore_ascii_case("equ") {
        return None;
    }
    let operand_text = rest[kw_end..].trim().to_string();
    Some(ParsedLine {
        label: Some(name.to_string()),
        mnemonic: Some("equ".to_string()),
        operand_text: operand_text.clone(),
        directive: Some(Directive::Equ(operand_text)),
        raw: raw.to_string(),
    })
}

fn strip_comment(line: &str) -> String {
    match line.find(';') {
        Some(idx) => line[..idx].to_string(),
        None => line.to_string(),
    }
}

/// Split a leading `label:` off the front of a line, if present.
fn split_label(line: &str) -> (Option<String>, String) {
    let trimmed = line.trim();
    if let Some(idx) = trimmed.find(':') {
        let label = trimmed[..idx].trim();
        let rest = trimmed[idx + 1..].trim();
        if !label.is_empty() && label.chars().next().unwrap().is_alphabetic() {
            return (Some(label.to_string()), rest.to_string());
        }
    }
    (None, trimmed.to_string())
}

fn split_mnemonic(rest: &str) -> (String, String) {
    let rest = rest.trim();
    match rest.find(char::is_whitespace) {
        Some(idx) => (rest[..idx].to_string(), rest[idx..].trim().to_string()),
        None => (rest.to_string(), String::new()),
    }
}

fn split_args(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        Vec::new()
    } else {
        text.split(',').map(|s| s.trim().to_string()).collect()
    }
}

/// Extract and concatenate the decoded contents of one or more comma-separated `"..."`
/// chunks (up to four, per the data directive syntax), applying standard escape decoding.
fn decode_quoted_chunks(text: &str) -> String {
    let mut out = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '"' {
            continue;
        }
        while let Some(&next) = chars.peek() {
            if next == '"' {
                chars.next();
                break;
            }
            chars.next();
            if next == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some(other) => out.push(other),
                    None => {}
                }
            } else {
                out.push(next);
            }
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_label_and_instruction() {
        let parsed = parse_line("start: ldc r1,#0x5");
        assert_eq!(parsed.label.as_deref(), Some("start"));
        assert_eq!(parsed.mnemonic.as_deref(), Some("ldc"));
        assert_eq!(parsed.operand_text, "r1,#0x5");
    }

    #[test]
    fn strips_comments() {
        let parsed = parse_line("add r1, VAL ; add it in");
        assert_eq!(parsed.mnemonic.as_deref(), Some("add"));
        assert_eq!(parsed.operand_text, "r1, VAL");
    }

    #[test]
    fn word_directive_counts_values() {
        let parsed = parse_line("table: WORD 1,2,3");
        match parsed.directive {
            Some(Directive::Word(values)) => assert_eq!(values.len(), 3),
            _ => panic!("expected Word directive"),
        }
    }

    #[test]
    fn byte_directive_packs_three_per_word() {
        let d = Directive::Byte(vec!["1".into(), "2".into(), "3".into(), "4".into()]);
        assert_eq!(directive_word_count(&d), 2);
    }

    #[test]
    fn equ_binds_the_bare_name_without_a_colon() {
        let parsed = parse_line("VAL EQU 0x10 + 1");
        assert_eq!(parsed.label.as_deref(), Some("VAL"));
        match parsed.directive {
            Some(Directive::Equ(expr)) => assert_eq!(expr, "0x10 + 1"),
            _ => panic!("expected Equ directive"),
        }
    }

    #[test]
    fn string_directive_decodes_escapes() {
        let parsed = parse_line(r#"msg: STRING "hi\n""#);
        match parsed.directive {
            Some(Directive::StringDir(s)) => assert_eq!(s, "hi\n"),
            _ => panic!("expected StringDir directive"),
        }
    }
}
