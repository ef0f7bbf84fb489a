// Structured command lines.
// Free-form argument strings from the build configuration are split into
// discrete tokens here, once, so the Katalon process can be spawned without
// a shell in between.

/// A program and its arguments, one token per element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        CommandLine {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program followed by its arguments.
    pub fn to_argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// A single-string form for `cmd /c` and for the build log.
    /// Tokens containing whitespace are wrapped in double quotes.
    pub fn render(&self) -> String {
        self.to_argv()
            .iter()
            .map(|token| quote_if_needed(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Wraps `token` in double quotes when it is empty or contains whitespace.
pub fn quote_if_needed(token: &str) -> String {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        format!("\"{token}\"")
    } else {
        token.to_string()
    }
}

/// Splits a free-form argument string into tokens.
///
/// Whitespace separates tokens. Single or double quotes group characters,
/// including whitespace, into the current token and are removed
/// (`-testSuitePath="Test Suites/Smoke"` becomes `-testSuitePath=Test Suites/Smoke`).
/// Backslashes are ordinary characters so Windows paths come through intact.
/// An unterminated quote runs to the end of the input.
pub fn split_arguments(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}
