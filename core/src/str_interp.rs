//! `#{var}` interpolation for run command templates.
//!
//! `##` is an escaped `#`. A `#` not followed by `{` or `#` is kept as is.

use std::{borrow::Borrow, collections::HashMap, ffi::OsStr, hash::Hash};

pub type Result<T = String> = std::result::Result<T, InterpError>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InterpError {
    #[error("Undefined variable '{0}' at {}", .1+1)]
    UndefinedVar(String, usize),

    #[error("Unclosed brace (found open brace at {})", .0+1)]
    UnclosedBrace(usize),
}

pub fn interp<K, V>(fmt: &str, variables: &HashMap<K, V>) -> Result
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<OsStr>,
{
    let mut res = String::with_capacity(fmt.len() * 2);
    let mut chars = fmt.chars().enumerate().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '#' {
            res.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '#')) => {
                chars.next();
                res.push('#');
            }
            Some((_, '{')) => {
                chars.next();
                let open_brace_at = i + 1;
                let mut var_name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    var_name.push(c);
                }
                if !closed {
                    return Err(InterpError::UnclosedBrace(open_brace_at));
                }
                let Some(value) = variables.get(var_name.as_str()) else {
                    return Err(InterpError::UndefinedVar(var_name, open_brace_at));
                };
                res += value.as_ref().to_string_lossy().as_ref();
            }
            _ => res.push('#'),
        }
    }

    res.shrink_to_fit();
    Ok(res)
}

/// Interpolates every argument of an argv template.
pub fn interp_args<K, V>(args: &[String], variables: &HashMap<K, V>) -> Result<Vec<String>>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<OsStr>,
{
    args.iter().map(|arg| interp(arg, variables)).collect()
}
