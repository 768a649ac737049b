//! Declarative option builders on top of clap.
//!
//! A caller describes each command-line input as "a name, an optional help
//! line, and a conversion from text", pairs independent descriptions with
//! [`Parser::zip`], and hands the result to [`options`]. Long flags, short
//! flags, metavariables, and `--help` output are all derived from the
//! argument names; tokenizing argv, `--` handling, short-flag clustering,
//! help layout, and error-message formatting are clap's job.
//!
//! [`eval`] is the I/O-free core: it returns an [`Outcome`] instead of
//! exiting, so parsers are testable without intercepting process exits.
//! [`options`] is the only function that reads the live process arguments,
//! prints, or terminates.

pub mod name {
    /// Identifier for a flag or positional argument.
    ///
    /// Derives the long flag (`--<name>`), the metavariable (`<NAME>`
    /// upper-cased), and, when the name is non-empty, a short flag from the
    /// first character. Empty names derive no short flag and only make sense
    /// for positionals.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ArgName(String);

    impl ArgName {
        pub fn new(name: impl Into<String>) -> Self {
            Self(name.into())
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }

        /// Long flag name, without the leading `--`.
        pub fn long(&self) -> &str {
            &self.0
        }

        /// Short flag derived from the first character, if any.
        pub fn short(&self) -> Option<char> {
            self.0.chars().next()
        }

        /// Metavariable shown in usage and help text.
        pub fn metavar(&self) -> String {
            self.0.to_uppercase()
        }
    }

    impl From<&str> for ArgName {
        fn from(name: &str) -> Self {
            Self::new(name)
        }
    }

    impl From<String> for ArgName {
        fn from(name: String) -> Self {
            Self(name)
        }
    }

    /// One-line program summary, shown as the help header.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Description(String);

    impl Description {
        pub fn new(text: impl Into<String>) -> Self {
            Self(text.into())
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl From<&str> for Description {
        fn from(text: &str) -> Self {
            Self::new(text)
        }
    }

    impl From<String> for Description {
        fn from(text: String) -> Self {
            Self(text)
        }
    }

    /// Per-argument help line.
    ///
    /// Builders take `Option<HelpText>`, so "no help given" stays observably
    /// different from "empty help given".
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct HelpText(String);

    impl HelpText {
        pub fn new(text: impl Into<String>) -> Self {
            Self(text.into())
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl From<&str> for HelpText {
        fn from(text: &str) -> Self {
            Self::new(text)
        }
    }

    impl From<String> for HelpText {
        fn from(text: String) -> Self {
            Self(text)
        }
    }

    impl From<HelpText> for String {
        fn from(help: HelpText) -> Self {
            help.0
        }
    }
}

pub mod parser {
    use std::str::FromStr;
    use std::sync::atomic::{AtomicU64, Ordering};

    use clap::{Arg, ArgAction, ArgMatches};

    use crate::name::{ArgName, HelpText};

    // Two builders may reuse the same name; ids stay unique per invocation.
    static NEXT_ID: AtomicU64 = AtomicU64::new(0);

    fn fresh_id(name: &ArgName) -> String {
        let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        format!("{}#{n}", name.as_str())
    }

    type Extract<T> = Box<dyn Fn(&ArgMatches) -> Result<T, String>>;

    /// Immutable description of how to extract a `T` from argv.
    ///
    /// A parser is data until [`crate::run::eval`] consumes it: the clap
    /// `Arg` definitions it contributes, plus an extraction function run
    /// against the matched results. Composition never touches argv.
    pub struct Parser<T> {
        pub(crate) args: Vec<Arg>,
        pub(crate) extract: Extract<T>,
    }

    impl<T: 'static> Parser<T> {
        /// Parser that consumes nothing and yields a fixed value.
        pub fn pure(value: T) -> Self
        where
            T: Clone,
        {
            Parser {
                args: Vec::new(),
                extract: Box::new(move |_| Ok(value.clone())),
            }
        }

        /// Transform the parsed value.
        pub fn map<U, F>(self, f: F) -> Parser<U>
        where
            U: 'static,
            F: Fn(T) -> U + 'static,
        {
            let extract = self.extract;
            Parser {
                args: self.args,
                extract: Box::new(move |m| extract(m).map(&f)),
            }
        }

        /// Pair two independent parsers.
        ///
        /// The two sides have no ordering dependency on the command line;
        /// positionals fill in composition order.
        pub fn zip<U: 'static>(self, other: Parser<U>) -> Parser<(T, U)> {
            let left = self.extract;
            let right = other.extract;
            let mut args = self.args;
            args.extend(other.args);
            Parser {
                args,
                extract: Box::new(move |m| Ok((left(m)?, right(m)?))),
            }
        }
    }

    /// Boolean switch: true iff `--<name>`/`-<n>` is present on the command
    /// line. Consumes no value token.
    pub fn switch(name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<bool> {
        let name = name.into();
        let id = fresh_id(&name);
        let mut def = Arg::new(id.clone())
            .long(name.long().to_string())
            .action(ArgAction::SetTrue);
        if let Some(c) = name.short() {
            def = def.short(c);
        }
        if let Some(help) = help {
            def = def.help(String::from(help));
        }
        Parser {
            args: vec![def],
            extract: Box::new(move |m| Ok(m.get_flag(&id))),
        }
    }

    /// Flag-based option requiring a value token, converted by `convert`.
    ///
    /// `convert` signals malformed input by returning `None`, which surfaces
    /// as a parse failure when the parser runs. Two options whose names share
    /// a first character (or start with `h`, colliding with the built-in
    /// `-h`) are a definition conflict, reported by clap when the command is
    /// built in debug builds.
    pub fn opt<T, F>(convert: F, name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<T>
    where
        T: 'static,
        F: Fn(&str) -> Option<T> + 'static,
    {
        let name = name.into();
        let id = fresh_id(&name);
        let metavar = name.metavar();
        let mut def = Arg::new(id.clone())
            .long(name.long().to_string())
            .value_name(metavar.clone())
            .action(ArgAction::Set)
            .required(true);
        if let Some(c) = name.short() {
            def = def.short(c);
        }
        if let Some(help) = help {
            def = def.help(String::from(help));
        }
        let display = format!("'--{} <{}>'", name.long(), metavar);
        valued(def, id, display, convert)
    }

    /// Text option, identity conversion.
    pub fn opt_str(name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<String> {
        opt(|raw| Some(raw.to_string()), name, help)
    }

    /// Option for any type with a textual-literal parse (`FromStr`).
    pub fn opt_parse<T>(name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<T>
    where
        T: FromStr + 'static,
    {
        opt(|raw| raw.parse::<T>().ok(), name, help)
    }

    /// Integral option: parsed as `i128`, then narrowed or widened to the
    /// target type. Out-of-range values fail like any other conversion.
    pub fn opt_integral<T>(name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<T>
    where
        T: TryFrom<i128> + 'static,
    {
        opt(integral::<T>, name, help)
    }

    /// Fractional option: parsed as `f64`, then converted to the target type.
    pub fn opt_fractional<T>(name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<T>
    where
        T: FromFraction + 'static,
    {
        opt(fractional::<T>, name, help)
    }

    /// Positional argument, converted by `convert`.
    ///
    /// Same contract as [`opt`] except the value is matched by position: no
    /// flag derivation, metavariable still the upper-cased name.
    pub fn arg<T, F>(convert: F, name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<T>
    where
        T: 'static,
        F: Fn(&str) -> Option<T> + 'static,
    {
        let name = name.into();
        let id = fresh_id(&name);
        let metavar = name.metavar();
        let mut def = Arg::new(id.clone())
            .value_name(metavar.clone())
            .action(ArgAction::Set)
            .required(true);
        if let Some(help) = help {
            def = def.help(String::from(help));
        }
        valued(def, id, format!("'<{metavar}>'"), convert)
    }

    /// Text positional, identity conversion.
    pub fn arg_str(name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<String> {
        arg(|raw| Some(raw.to_string()), name, help)
    }

    /// Positional for any type with a textual-literal parse (`FromStr`).
    pub fn arg_parse<T>(name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<T>
    where
        T: FromStr + 'static,
    {
        arg(|raw| raw.parse::<T>().ok(), name, help)
    }

    /// Integral positional; see [`opt_integral`].
    pub fn arg_integral<T>(name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<T>
    where
        T: TryFrom<i128> + 'static,
    {
        arg(integral::<T>, name, help)
    }

    /// Fractional positional; see [`opt_fractional`].
    pub fn arg_fractional<T>(name: impl Into<ArgName>, help: Option<HelpText>) -> Parser<T>
    where
        T: FromFraction + 'static,
    {
        arg(fractional::<T>, name, help)
    }

    /// Conversion from the generic fractional literal type (`f64`).
    pub trait FromFraction {
        fn from_f64(value: f64) -> Self;
    }

    impl FromFraction for f64 {
        fn from_f64(value: f64) -> Self {
            value
        }
    }

    impl FromFraction for f32 {
        fn from_f64(value: f64) -> Self {
            value as f32
        }
    }

    fn integral<T: TryFrom<i128>>(raw: &str) -> Option<T> {
        let wide = raw.parse::<i128>().ok()?;
        T::try_from(wide).ok()
    }

    fn fractional<T: FromFraction>(raw: &str) -> Option<T> {
        raw.parse::<f64>().ok().map(T::from_f64)
    }

    fn valued<T, F>(def: Arg, id: String, display: String, convert: F) -> Parser<T>
    where
        T: 'static,
        F: Fn(&str) -> Option<T> + 'static,
    {
        Parser {
            args: vec![def],
            extract: Box::new(move |m| {
                let raw = m
                    .get_one::<String>(&id)
                    .ok_or_else(|| format!("missing value for {display}"))?;
                convert(raw).ok_or_else(|| format!("invalid value '{raw}' for {display}"))
            }),
        }
    }
}

pub mod run {
    use clap::Command;
    use clap::error::ErrorKind;

    use crate::name::Description;
    use crate::parser::Parser;

    /// Result of evaluating a parser against an argument vector.
    #[derive(Debug)]
    pub enum Outcome<T> {
        /// Every required input was present and every conversion succeeded.
        Success(T),
        /// `-h`/`--help` was requested; holds the rendered help text.
        Help(String),
        /// The argument vector could not be satisfied; holds the error
        /// message plus usage, ready for stderr.
        Failure(String),
    }

    /// Evaluate `parser` against `argv` (program name at index 0).
    ///
    /// Performs no process I/O and never terminates; [`options`] is the
    /// process-facing layer. `--help` anywhere in the vector wins over any
    /// other content, valid or not.
    pub fn eval<T, I, S>(description: &Description, parser: &Parser<T>, argv: I) -> Outcome<T>
    where
        T: 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let mut cmd = command(description, parser, program_name(&argv));

        if wants_help(&argv) {
            return Outcome::Help(cmd.render_help().to_string());
        }

        let matches = match cmd.clone().try_get_matches_from(argv.iter()) {
            Ok(matches) => matches,
            // Clustered forms like `-vh` reach clap before the pre-scan sees
            // them.
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                return Outcome::Help(err.render().to_string());
            }
            Err(err) => return Outcome::Failure(err.render().to_string()),
        };

        match (parser.extract)(&matches) {
            Ok(value) => Outcome::Success(value),
            Err(message) => {
                let usage = cmd.render_usage().to_string();
                Outcome::Failure(format!("error: {message}\n\n{usage}\n"))
            }
        }
    }

    /// Run `parser` against the live process arguments.
    ///
    /// Help prints to stdout and exits 0. Unknown flags, missing required
    /// inputs, and conversion failures print to stderr and exit 1. On
    /// success the parsed value is returned and nothing is printed.
    pub fn options<T: 'static>(description: impl Into<Description>, parser: &Parser<T>) -> T {
        match eval(&description.into(), parser, std::env::args()) {
            Outcome::Success(value) => value,
            Outcome::Help(text) => {
                print!("{text}");
                std::process::exit(0);
            }
            Outcome::Failure(text) => {
                eprint!("{text}");
                std::process::exit(1);
            }
        }
    }

    fn command<T>(description: &Description, parser: &Parser<T>, program: &str) -> Command {
        let mut cmd = Command::new(program.to_string()).about(description.as_str().to_string());
        for def in &parser.args {
            cmd = cmd.arg(def.clone());
        }
        cmd
    }

    fn wants_help(argv: &[String]) -> bool {
        argv.iter().skip(1).any(|a| a == "-h" || a == "--help")
    }

    fn program_name(argv: &[String]) -> &str {
        argv.first()
            .and_then(|p| std::path::Path::new(p).file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("program")
    }
}

pub use name::{ArgName, Description, HelpText};
pub use parser::{
    FromFraction, Parser, arg, arg_fractional, arg_integral, arg_parse, arg_str, opt,
    opt_fractional, opt_integral, opt_parse, opt_str, switch,
};
pub use run::{Outcome, eval, options};
