/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use ::clap::{self, Arg};
use crate::FailResult;
use crate::config::ValidatedSettings;
use crate::logging::GlobalLogger;

/// Trait used to factor out code for adding arguments to a binary and parsing them,
/// leveraging type inference to help reduce boilerplate.
pub trait CliDeserialize: Sized {
    fn augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> (clap::App<'a, 'b>, ClapDeserializer<Self>)
    {
        let app = Self::_augment_clap_app(app);
        let token = ClapDeserializer(Default::default());
        (app, token)
    }

    /// Don't use this. Call 'augment_clap_app' instead.
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b>;
    /// Don't use this. Call 'resolve_args' on the ClapDeserializer instead.
    fn _resolve_args(matches: &clap::ArgMatches<'_>) -> FailResult<Self>;
}

/// Token of "proof" that a clap app was augmented to be capable of deserializing A.
pub struct ClapDeserializer<A>(::std::marker::PhantomData<A>);

impl<A> ClapDeserializer<A>
where A: CliDeserialize,
{
    /// Deserialize the arguments.  This may perform IO such as eagerly reading input files.
    pub fn resolve_args(self, matches: &clap::ArgMatches<'_>) -> FailResult<A>
    { A::_resolve_args(matches) }
}

// Tuple as product combinator
impl<A, B> CliDeserialize for (A, B)
where
    A: CliDeserialize,
    B: CliDeserialize,
{
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b>
    {
        let app = A::_augment_clap_app(app);
        let app = B::_augment_clap_app(app);
        app
    }

    fn _resolve_args(matches: &clap::ArgMatches<'_>) -> FailResult<Self>
    { Ok((A::_resolve_args(matches)?, B::_resolve_args(matches)?)) }
}

//--------------------------------------------------------

/// `-v` (repeatable) and `--log FILE`.
pub struct LoggingArgs(pub GlobalLogger);

impl CliDeserialize for LoggingArgs {
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
        app.args(&[
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("log more (repeat for even more)"),
            Arg::with_name("log")
                .long("log")
                .value_name("FILE")
                .takes_value(true)
                .help("also write the log to this file"),
        ])
    }

    fn _resolve_args(m: &clap::ArgMatches<'_>) -> FailResult<Self> {
        let mut logger = GlobalLogger::default();
        logger.verbosity(m.occurrences_of("verbose") as i32);
        if let Some(path) = m.value_of_os("log") {
            logger.path(path);
        }
        Ok(LoggingArgs(logger))
    }
}

/// `-c CONFIG`, optional.
pub struct ConfigArgs(pub ValidatedSettings);

impl CliDeserialize for ConfigArgs {
    fn _augment_clap_app<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
        app.args(&[
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("CONFIG")
                .takes_value(true)
                .help("settings yaml. Every setting has a default, so this may be omitted."),
        ])
    }

    fn _resolve_args(m: &clap::ArgMatches<'_>) -> FailResult<Self> {
        Ok(ConfigArgs(match m.value_of_os("config") {
            Some(path) => ValidatedSettings::load(path)?,
            None => Default::default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FactorizationKind;
    use ::std::ffi::OsStr;

    fn app() -> clap::App<'static, 'static> {
        clap::App::new("test")
            .arg(Arg::with_name("input").required(true))
    }

    #[test]
    fn defaults_without_flags() {
        let (app, de) = CliDeserialize::augment_clap_app(app());
        let matches = app.get_matches_from_safe(vec!["test", "in.bin"]).unwrap();
        let (LoggingArgs(_), ConfigArgs(settings)) = de.resolve_args(&matches).unwrap();
        assert_eq!(settings, ValidatedSettings::default());
    }

    #[test]
    fn config_is_loaded() {
        let dir = ::tempdir::TempDir::new("rla-cli").unwrap();
        let path = dir.path().join("c.yaml");
        ::std::fs::write(&path, "factorization: { kind: eigh }").unwrap();

        let (app, de) = <ConfigArgs as CliDeserialize>::augment_clap_app(app());
        let args = vec![OsStr::new("test"), OsStr::new("-c"), path.as_os_str(), OsStr::new("in.bin")];
        let matches = app.get_matches_from_safe(args).unwrap();
        let ConfigArgs(settings) = de.resolve_args(&matches).unwrap();
        assert_eq!(settings.factorization.kind, FactorizationKind::Eigh);
    }

    #[test]
    fn verbosity_counts_flags() {
        let (app, de) = <LoggingArgs as CliDeserialize>::augment_clap_app(app());
        let matches = app.get_matches_from_safe(vec!["test", "-vv", "in.bin"]).unwrap();
        assert_eq!(matches.occurrences_of("verbose"), 2);
        assert!(de.resolve_args(&matches).is_ok());
    }
}
