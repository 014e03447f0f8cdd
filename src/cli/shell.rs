//! Read loop shared by the line editor and piped scripts.

use std::io::{self, BufRead};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    history::DefaultHistory,
    Cmd, Context, Editor, Helper, Highlighter, Hinter, KeyEvent, Validator,
};

use crate::cli::core::{CliError, CliMode, CommandError, CommandResult, LoopControl, ShellContext};
use crate::cli::output::{info as output_info, section as output_section};

/// Presence of this variable switches the shell to reading commands from stdin.
pub const SCRIPT_ENV: &str = "BEIGE_LEDGER_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => {
            let mut source = EditorSource::new(context.command_words())?;
            output_section("BeigeLedger");
            output_info(format!(
                "{} transactions loaded. Type `help` for commands, `dashboard` for this month.",
                context.manager.ledger().transactions.len()
            ));
            run_loop(&mut context, &mut source)
        }
        CliMode::Script => run_loop(&mut context, &mut ScriptSource::new(io::stdin().lock())),
    }
}

enum Input {
    Line(String),
    Interrupted,
    Closed,
}

trait LineSource {
    fn read(&mut self, prompt: &str) -> Result<Input, CliError>;

    fn remember(&mut self, _line: &str) {}
}

struct EditorSource {
    editor: Editor<CommandHelper, DefaultHistory>,
}

impl EditorSource {
    fn new(words: Vec<&'static str>) -> Result<Self, CliError> {
        let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(CommandHelper::new(words)));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn read(&mut self, prompt: &str) -> Result<Input, CliError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Closed),
            Err(err) => Err(err.into()),
        }
    }

    fn remember(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

struct ScriptSource<R> {
    lines: io::Lines<R>,
}

impl<R: BufRead> ScriptSource<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> LineSource for ScriptSource<R> {
    fn read(&mut self, _prompt: &str) -> Result<Input, CliError> {
        match self.lines.next() {
            Some(line) => Ok(Input::Line(line?)),
            None => Ok(Input::Closed),
        }
    }
}

fn run_loop(context: &mut ShellContext, source: &mut dyn LineSource) -> Result<(), CliError> {
    while context.running {
        let line = match source.read(&context.prompt())? {
            Input::Line(line) => line,
            Input::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            Input::Closed => {
                if context.is_interactive() {
                    output_info("Goodbye.");
                }
                break;
            }
        };
        let Some(line) = meaningful(&line) else {
            continue;
        };
        source.remember(line);
        if let Err(err) = execute(context, line) {
            context.report_error(err)?;
        }
    }
    Ok(())
}

/// Trimmed line, or `None` for blank lines and `#` comments.
fn meaningful(line: &str) -> Option<&str> {
    let line = line.trim();
    (!line.is_empty() && !line.starts_with('#')).then_some(line)
}

fn execute(context: &mut ShellContext, line: &str) -> CommandResult {
    let tokens = parse_command_line(line)?;
    let Some((word, rest)) = tokens.split_first() else {
        return Ok(());
    };
    context.last_command = Some(line.to_string());
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    if context.dispatch(&word.to_lowercase(), word, &args)? == LoopControl::Exit {
        context.running = false;
    }
    Ok(())
}

/// Splits a line the way a POSIX shell would, keeping quoted words together.
pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, CommandError> {
    shell_words::split(input)
        .map_err(|err| CommandError::InvalidArguments(format!("Could not read that line: {err}")))
}

#[derive(Helper, Hinter, Highlighter, Validator)]
struct CommandHelper {
    words: Vec<String>,
}

impl CommandHelper {
    fn new(words: Vec<&'static str>) -> Self {
        let mut words: Vec<String> = words.into_iter().map(str::to_ascii_lowercase).collect();
        words.sort();
        words.dedup();
        Self { words }
    }

    /// Start offset and matching command words for the text before the
    /// cursor. Only the first word of a line is completed.
    fn candidates(&self, head: &str) -> (usize, Vec<&str>) {
        let start = head.len() - head.trim_start().len();
        let word = &head[start..];
        if word.contains(char::is_whitespace) {
            return (head.len(), Vec::new());
        }
        let needle = word.to_ascii_lowercase();
        let matches = self
            .words
            .iter()
            .map(String::as_str)
            .filter(|candidate| candidate.starts_with(&needle))
            .collect();
        (start, matches)
    }
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::core::script_context;

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens =
            parse_command_line(r#"add expense 12 --merchant "Corner Cafe" --notes 'late, lunch'"#)
                .unwrap();
        assert_eq!(tokens[4], "Corner Cafe");
        assert_eq!(tokens[6], "late, lunch");
        assert!(matches!(
            parse_command_line("ask \"unterminated"),
            Err(CommandError::InvalidArguments(_))
        ));
    }

    #[test]
    fn comments_and_blank_lines_are_not_commands() {
        assert_eq!(meaningful("   "), None);
        assert_eq!(meaningful("  # note"), None);
        assert_eq!(meaningful("  dashboard  "), Some("dashboard"));
    }

    #[test]
    fn completion_covers_only_the_first_word() {
        let helper = CommandHelper::new(vec!["transactions", "add", "ask", "Add", "q"]);
        assert_eq!(helper.words, vec!["add", "ask", "q", "transactions"]);
        assert_eq!(helper.candidates("  A"), (2, vec!["add", "ask"]));
        assert_eq!(helper.candidates(""), (0, vec!["add", "ask", "q", "transactions"]));
        assert_eq!(helper.candidates("add ex"), (6, Vec::new()));
    }

    #[test]
    fn script_stops_at_exit_and_survives_bad_lines() {
        let mut context = script_context();
        let before = context.manager.ledger().transactions.len();
        let script = "\
# setup
add expense 5 --merchant Kiosk

add expense \"broken
add income 7
quit
add expense 9
";
        run_loop(&mut context, &mut ScriptSource::new(script.as_bytes())).unwrap();
        assert!(!context.running);
        assert_eq!(context.last_command.as_deref(), Some("quit"));
        assert_eq!(context.manager.ledger().transactions.len(), before + 2);
    }

    #[test]
    fn end_of_input_ends_the_loop() {
        let mut context = script_context();
        run_loop(&mut context, &mut ScriptSource::new(&b"dashboard\n"[..])).unwrap();
        assert!(context.running);
        assert_eq!(context.last_command.as_deref(), Some("dashboard"));
    }
}
