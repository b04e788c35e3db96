//! URI-Template expansion.
//!
//! Implements the subset of RFC 6570 that HAL links use in practice: the
//! simple, reserved (`+`), fragment (`#`), label (`.`), path (`/`), path
//! parameter (`;`), query (`?`), and query continuation (`&`) operators,
//! with the `:N` prefix modifier. Undefined variables expand to nothing,
//! per the RFC, so expanding with an empty variable map strips every
//! template expression from the href.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{HalError, Result};

/// Unreserved characters stay literal; everything else is percent-encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// For `+` and `#` expressions, reserved characters also stay literal.
const ALLOW_RESERVED: &AsciiSet = &UNRESERVED
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b'%');

struct Operator {
    prefix: &'static str,
    separator: &'static str,
    named: bool,
    allow_reserved: bool,
}

fn operator(expr: &str) -> (Operator, &str) {
    let (op, rest) = match expr.chars().next() {
        Some(c @ ('+' | '#' | '.' | '/' | ';' | '?' | '&')) => (c, &expr[1..]),
        _ => ('\0', expr),
    };
    let operator = match op {
        '+' => Operator { prefix: "", separator: ",", named: false, allow_reserved: true },
        '#' => Operator { prefix: "#", separator: ",", named: false, allow_reserved: true },
        '.' => Operator { prefix: ".", separator: ".", named: false, allow_reserved: false },
        '/' => Operator { prefix: "/", separator: "/", named: false, allow_reserved: false },
        ';' => Operator { prefix: ";", separator: ";", named: true, allow_reserved: false },
        '?' => Operator { prefix: "?", separator: "&", named: true, allow_reserved: false },
        '&' => Operator { prefix: "&", separator: "&", named: true, allow_reserved: false },
        _ => Operator { prefix: "", separator: ",", named: false, allow_reserved: false },
    };
    (operator, rest)
}

/// Expands a URI-Template against the given variables.
///
/// Fails with [`HalError::Config`] on a malformed template (an unclosed
/// `{` expression).
pub fn expand(template: &str, vars: &BTreeMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            HalError::Config(format!("malformed URI template '{template}': unclosed expression"))
        })?;
        expand_expression(&after[..close], vars, &mut out);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn expand_expression(expr: &str, vars: &BTreeMap<String, String>, out: &mut String) {
    let (op, varlist) = operator(expr);
    let set = if op.allow_reserved { ALLOW_RESERVED } else { UNRESERVED };

    let mut first = true;
    for spec in varlist.split(',') {
        // Explode has no meaning for the string-valued variables HAL links
        // take; treat `var*` as `var`.
        let spec = spec.strip_suffix('*').unwrap_or(spec);
        let (name, max_len) = match spec.split_once(':') {
            Some((name, len)) => (name, len.parse::<usize>().ok()),
            None => (spec, None),
        };
        let Some(value) = vars.get(name) else {
            continue;
        };
        let value = match max_len {
            Some(n) => {
                let end = value
                    .char_indices()
                    .nth(n)
                    .map(|(i, _)| i)
                    .unwrap_or(value.len());
                &value[..end]
            }
            None => value.as_str(),
        };

        out.push_str(if first { op.prefix } else { op.separator });
        first = false;
        if op.named {
            out.push_str(name);
            if !(value.is_empty() && op.separator == ";") {
                out.push('=');
            }
        }
        out.extend(utf8_percent_encode(value, set));
    }
}
