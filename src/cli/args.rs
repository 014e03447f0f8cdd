//! `--option value` / `--flag` parsing for shell commands.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::cli::core::CommandError;

/// Options (taking a value) and flags a command accepts, without the `--`.
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub options: &'static [&'static str],
    pub flags: &'static [&'static str],
}

impl ArgSpec {
    pub const fn new(options: &'static [&'static str], flags: &'static [&'static str]) -> Self {
        Self { options, flags }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    options: HashMap<String, String>,
    flags: HashSet<String>,
}

impl ParsedArgs {
    /// Splits `args` into positionals, options and flags. Accepts both
    /// `--key value` and `--key=value`; a later repeat of an option wins.
    pub fn parse(args: &[&str], spec: &ArgSpec) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let Some(body) = arg.strip_prefix("--") else {
                parsed.positional.push((*arg).to_string());
                continue;
            };
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            if spec.flags.contains(&name) {
                if inline.is_some() {
                    return Err(CommandError::InvalidArguments(format!(
                        "flag `--{name}` does not take a value"
                    )));
                }
                parsed.flags.insert(name.to_string());
            } else if spec.options.contains(&name) {
                let value = match inline {
                    Some(value) => value.to_string(),
                    None => iter
                        .next()
                        .map(|value| (*value).to_string())
                        .ok_or_else(|| {
                            CommandError::InvalidArguments(format!("option `--{name}` needs a value"))
                        })?,
                };
                parsed.options.insert(name.to_string(), value);
            } else {
                return Err(CommandError::InvalidArguments(format!("unknown option `--{name}`")));
            }
        }
        Ok(parsed)
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Parses option `name` with `FromStr`, naming the option on failure.
    pub fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, CommandError> {
        self.option(name)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|_| {
                    CommandError::InvalidArguments(format!("invalid value `{raw}` for `--{name}`"))
                })
            })
            .transpose()
    }

    pub fn require_positional(&self, index: usize, what: &str) -> Result<&str, CommandError> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| CommandError::InvalidArguments(format!("missing {what}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: ArgSpec = ArgSpec::new(&["currency", "page"], &["yes"]);

    #[test]
    fn splits_positionals_options_and_flags() {
        let parsed =
            ParsedArgs::parse(&["expense", "12.5", "--currency", "EUR", "--page=2", "--yes"], &SPEC).unwrap();
        assert_eq!(parsed.positional, vec!["expense", "12.5"]);
        assert_eq!(parsed.option("currency"), Some("EUR"));
        assert_eq!(parsed.parsed::<usize>("page").unwrap(), Some(2));
        assert!(parsed.flag("yes"));
        assert_eq!(parsed.require_positional(1, "amount").unwrap(), "12.5");
        assert!(parsed.require_positional(2, "date").is_err());
    }

    #[test]
    fn rejects_unknown_and_incomplete_options() {
        assert!(ParsedArgs::parse(&["--colour", "red"], &SPEC).is_err());
        assert!(ParsedArgs::parse(&["--currency"], &SPEC).is_err());
        assert!(ParsedArgs::parse(&["--yes=no"], &SPEC).is_err());
        let parsed = ParsedArgs::parse(&["--page", "two"], &SPEC).unwrap();
        assert!(parsed.parsed::<usize>("page").is_err());
    }
}
