//! Macro preprocessing: `MACRO`/`ENDMACRO` definition capture and call-site expansion.

use std::collections::HashMap;

#[derive(Debug, Clone)]
struct MacroDef {
    params: Vec<String>,
    body: Vec<String>,
}

/// Expands all macro definitions and call sites in `source`, returning the expanded line
/// sequence. `MACRO`/`ENDMACRO` blocks are consumed entirely (they do not appear in the
/// output); call sites are replaced with their expansion, bracketed by `; MACRO ...` /
/// `; ENDMACRO` comment markers, matching the original tool's listing convention.
pub struct Preprocessor {
    macros: HashMap<String, MacroDef>,
    next_instance: u32,
}

impl Preprocessor {
    pub fn new() -> Preprocessor {
        Preprocessor {
            macros: HashMap::new(),
            next_instance: 0,
        }
    }

    pub fn expand(&mut self, source: &str) -> Vec<String> {
        let lines: Vec<String> = source.lines().map(|l| l.to_string()).collect();
        let mut out = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            if let Some((name, params)) = parse_macro_header(line.trim()) {
                let mut body = Vec::new();
                i += 1;
                while i < lines.len() && !is_endmacro(lines[i].trim()) {
                    body.push(lines[i].clone());
                    i += 1;
                }
                self.macros
                    .insert(name.to_lowercase(), MacroDef { params, body });
                // Skip past the ENDMACRO line, if present.
                i += 1;
                continue;
            }
            out.extend(self.expand_line(line));
            i += 1;
        }
        out
    }

    fn expand_line(&mut self, line: &str) -> Vec<String> {
        match parse_call(line, &self.macros) {
            Some((label, name, args)) => {
                let instance = self.next_instance;
                self.next_instance += 1;

                let mut out = Vec::new();
                out.push(format!("; MACRO {}", line.trim()));
                if let Some(label) = label {
                    let label = if label.ends_with(':') {
                        label
                    } else {
                        format!("{}:", label)
                    };
                    out.push(label);
                }

                let def = self.macros.get(&name.to_lowercase()).cloned().unwrap();
                for body_line in &def.body {
                    let substituted = substitute(body_line, &def.params, &args, &name, instance);
                    out.extend(self.expand_line(&substituted));
                }
                out.push("; ENDMACRO".to_string());
                out
            }
            None => vec![line.to_string()],
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Preprocessor {
        Preprocessor::new()
    }
}

fn is_endmacro(line: &str) -> bool {
    line.eq_ignore_ascii_case("endmacro")
}

/// Parse `MACRO name(p1,p2,...)`, case-insensitively on the keyword only.
fn parse_macro_header(line: &str) -> Option<(String, Vec<String>)> {
    let lower = line.to_lowercase();
    if !lower.starts_with("macro") {
        return None;
    }
    let rest = line[5..].trim();
    parse_name_and_args(rest)
}

/// Parse `[label:] name(arg1,arg2,...)` where `name` is a registered macro.
fn parse_call(
    line: &str,
    macros: &HashMap<String, MacroDef>,
) -> Option<(Option<String>, String, Vec<String>)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(';') {
        return None;
    }

    let (label, rest) = match trimmed.find(':') {
        Some(pos) if !trimmed[..pos].contains('(') => {
            (Some(trimmed[..pos].trim().to_string()), trimmed[pos + 1..].trim())
        }
        _ => (None, trimmed),
    };

    let (name, args) = parse_name_and_args(rest)?;
    if macros.contains_key(&name.to_lowercase()) {
        Some((label, name, args))
    } else {
        None
    }
}

fn parse_name_and_args(rest: &str) -> Option<(String, Vec<String>)> {
    let open = rest.find('(')?;
    let close = rest.rfind(')')?;
    if close < open {
        return None;
    }
    let name = rest[..open].trim().to_string();
    if name.is_empty() || !name.chars().next()?.is_alphabetic() {
        return None;
    }
    let args_str = &rest[open + 1..close];
    let args: Vec<String> = if args_str.trim().is_empty() {
        Vec::new()
    } else {
        args_str.split(',').map(|s| s.trim().to_string()).collect()
    };
    Some((name, args))
}

/// Substitute formal parameters (whole-identifier match only) and `@` tokens within one
/// macro body line for one call instance.
fn substitute(line: &str, params: &[String], args: &[String], macro_name: &str, instance: u32) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::new();
    let mut idx = 0;
    while idx < chars.len() {
        let c = chars[idx];
        if c == '@' {
            out.push_str(&format!("{}_{}", macro_name, instance));
            idx += 1;
        } else if c.is_alphanumeric() || c == '_' {
            let start = idx;
            while idx < chars.len() && (chars[idx].is_alphanumeric() || chars[idx] == '_') {
                idx += 1;
            }
            let word: String = chars[start..idx].iter().collect();
            match params.iter().position(|p| p == &word) {
                Some(pos) => out.push_str(args.get(pos).map(|s| s.as_str()).unwrap_or("")),
                None => out.push_str(&word),
            }
        } else {
            out.push(c);
            idx += 1;
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn expands_a_single_line_macro() {
        let source = "MACRO inc(X)\nadd X,#1\nENDMACRO\ninc(r2)\n";
        let mut preprocessor = Preprocessor::new();
        let expanded = preprocessor.expand(source);
        assert!(expanded.iter().any(|l| l.trim() == "add r2,#1"));
        assert!(expanded.iter().any(|l| l.starts_with("; MACRO")));
        assert!(expanded.iter().any(|l| l.trim() == "; ENDMACRO"));
    }

    #[test]
    fn gives_each_call_instance_a_fresh_at_token() {
        let source = "MACRO loop()\n@: jp @\nENDMACRO\nloop()\nloop()\n";
        let mut preprocessor = Preprocessor::new();
        let expanded = preprocessor.expand(source);
        assert!(expanded.iter().any(|l| l.trim() == "loop_0: jp loop_0"));
        assert!(expanded.iter().any(|l| l.trim() == "loop_1: jp loop_1"));
    }

    #[test]
    fn unknown_call_like_lines_pass_through() {
        let source = "foo(1,2)\n";
        let mut preprocessor = Preprocessor::new();
        let expanded = preprocessor.expand(source);
        assert_eq!(expanded, vec!["foo(1,2)".to_string()]);
    }

    #[test]
    fn labelled_call_emits_bare_label_line() {
        let source = "MACRO nop1()\nadd r0,#0\nENDMACRO\nstart: nop1()\n";
        let mut preprocessor = Preprocessor::new();
        let expanded = preprocessor.expand(source);
        assert!(expanded.iter().any(|l| l == "start:"));
    }
}
