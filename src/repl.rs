//! Line-oriented front end. Every input line is lexed, parsed or evaluated
//! depending on [`Mode`]; evaluation keeps one environment for the session.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::{
    common::Error,
    interpreter,
    lexer::tokenize,
    object::Environment,
    parser::parse,
    token::TokenKind,
};

pub const PROMPT: &str = ">> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Lex,
    Parse,
    #[default]
    Eval,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::default(),
            prompt: PROMPT.to_string(),
        }
    }
}

pub const USAGE: &str = "usage: monkey [--lex | --parse | --eval] [--prompt <text>]";

impl Config {
    /// Reads options from command-line arguments, program name excluded.
    /// Returns `Ok(None)` when help was requested.
    pub fn from_args<I>(args: I) -> Result<Option<Config>, Error>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--lex" => config.mode = Mode::Lex,
                "--parse" => config.mode = Mode::Parse,
                "--eval" => config.mode = Mode::Eval,
                "--prompt" => {
                    config.prompt = args
                        .next()
                        .ok_or_else(|| Error::Usage(format!("--prompt needs a value\n{}", USAGE)))?;
                }
                "-h" | "--help" => return Ok(None),
                other => {
                    return Err(Error::Usage(format!("unknown argument `{}`\n{}", other, USAGE)));
                }
            }
        }

        Ok(Some(config))
    }
}

#[derive(Debug)]
pub struct Repl {
    config: Config,
    env: Environment,
}

impl Repl {
    pub fn new(config: Config) -> Self {
        Repl {
            config,
            env: Environment::new(),
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<(), Error> {
        write!(output, "{}", self.config.prompt)?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            self.handle_line(&line, output)?;

            write!(output, "{}", self.config.prompt)?;
            output.flush()?;
        }

        writeln!(output)?;
        Ok(())
    }

    pub fn handle_line<W: Write>(&mut self, line: &str, output: &mut W) -> Result<(), Error> {
        match self.config.mode {
            Mode::Lex => {
                let mut lexer = tokenize(line);
                loop {
                    let token = lexer.next_token();
                    if token.kind == TokenKind::Eof {
                        break;
                    }
                    writeln!(output, "{}, \"{}\"", token.kind, token.literal)?;
                }
            }
            Mode::Parse => {
                let (program, errors) = parse(&tokenize(line).tokens());
                for err in &errors {
                    writeln!(output, "{}", err)?;
                }
                writeln!(output, "{}", program)?;
            }
            Mode::Eval => {
                let (program, errors) = parse(&tokenize(line).tokens());
                for err in &errors {
                    writeln!(output, "{}", err)?;
                }

                let result = interpreter::eval(&program, &self.env);
                if result.is_error() {
                    debug!(error = %result, "evaluation failed");
                }
                writeln!(output, "{}", result)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(mode: Mode, input: &str) -> String {
        let mut repl = Repl::new(Config {
            mode,
            prompt: String::new(),
        });
        let mut output = Vec::new();
        repl.run(input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn eval_keeps_environment_between_lines() {
        assert_eq!(
            session(Mode::Eval, "let x = 2;\nx * 21\n"),
            "null\n42\n\n"
        );
    }

    #[test]
    fn eval_prints_diagnostics_then_result() {
        assert_eq!(
            session(Mode::Eval, "let x 5;\n"),
            "expected Assign, got Int\nnull\n\n"
        );
        assert_eq!(
            session(Mode::Eval, "len(5)\n"),
            "Type error: expected MString, got MInt\n\n"
        );
    }

    #[test]
    fn lex_mode_lists_tokens() {
        assert_eq!(
            session(Mode::Lex, "let x = 5;\n"),
            "Let, \"let\"\nIdentifier, \"x\"\nAssign, \"=\"\nInt, \"5\"\nSemicolon, \";\"\n\n"
        );
    }

    #[test]
    fn parse_mode_renders_program() {
        assert_eq!(session(Mode::Parse, "-7 / y\n"), "((-7) / y)\n\n");
    }

    #[test]
    fn prompt_is_written_before_each_line() {
        let mut repl = Repl::new(Config::default());
        let mut output = Vec::new();
        repl.run("1\n".as_bytes(), &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), ">> 1\n>> \n");
    }

    #[test]
    fn config_from_args() {
        let args = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(Config::from_args(args(&[])).unwrap(), Some(Config::default()));
        assert_eq!(
            Config::from_args(args(&["--parse", "--prompt", "$ "])).unwrap(),
            Some(Config {
                mode: Mode::Parse,
                prompt: "$ ".to_string(),
            })
        );
        assert_eq!(Config::from_args(args(&["--help"])).unwrap(), None);
        assert!(matches!(
            Config::from_args(args(&["--bogus"])),
            Err(Error::Usage(_))
        ));
        assert!(matches!(
            Config::from_args(args(&["--prompt"])),
            Err(Error::Usage(_))
        ));
    }
}
