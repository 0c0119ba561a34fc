/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;
use crate::cli_deserialize::{CliDeserialize, LoggingArgs, ConfigArgs};
use crate::cmd;

use ::clap::{self, Arg};
use ::std::ffi::OsStr;
use ::std::path::Path;

fn wrap_result_main<F>(main: F)
where F: FnOnce() -> FailResult<()>,
{
    main().unwrap_or_else(|e| {
        for cause in e.iter_chain() {
            error!("{}", cause);
        }

        if ::std::env::var_os("RUST_BACKTRACE") == Some(OsStr::new("1").to_owned()) {
            error!("{}", e.backtrace());
        } else {
            error!("(for a backtrace, try again with RUST_BACKTRACE=1)");
        }
        ::std::process::exit(1);
    });
}

fn input_arg<'a, 'b>(help: &'b str) -> Arg<'a, 'b>
{
    Arg::with_name("input")
        .value_name("INPUT")
        .required(true)
        .help(help)
}

fn output_arg<'a, 'b>(help: &'b str) -> Arg<'a, 'b>
{
    Arg::with_name("output")
        .short("o")
        .long("output")
        .value_name("OUTPUT")
        .takes_value(true)
        .required(true)
        .help(help)
}

fn path_of<'a>(m: &'a clap::ArgMatches<'_>, name: &str) -> &'a Path
{
    // only called for required args, which clap has already checked
    Path::new(m.value_of_os(name).unwrap_or_else(|| panic!("(BUG) missing arg {}", name)))
}

/// Parse the common args, start logging, size the thread pool.
///
/// The logger comes first so that config loading can log.
fn setup<'a, 'b>(app: clap::App<'a, 'b>) -> FailResult<(clap::ArgMatches<'a>, crate::ValidatedSettings)>
{
    let (app, log_de) = <LoggingArgs as CliDeserialize>::augment_clap_app(app);
    let (app, config_de) = <ConfigArgs as CliDeserialize>::augment_clap_app(app);
    let matches = app.get_matches();

    let LoggingArgs(mut logger) = log_de.resolve_args(&matches)?;
    logger.apply()?;

    let ConfigArgs(settings) = config_de.resolve_args(&matches)?;
    cmd::init_thread_pool(&settings)?;
    Ok((matches, settings))
}

// -------------------------------------------------------------------------------------

pub fn orthonormalize() {
    wrap_result_main(|| {
        let (matches, settings) = setup({
            app_from_crate!(", ")
                .name("rla-orthonormalize")
                .about("Orthonormal basis for the column space of a matrix, by iterated Gram-Schmidt.")
                .args(&[
                    input_arg("binary matrix file"),
                    output_arg("where to write Q, a binary matrix file of the same shape"),
                ])
        })?;

        let _report = cmd::run_orthonormalize(
            &settings,
            path_of(&matches, "input"),
            path_of(&matches, "output"),
        )?;
        Ok(())
    });
}

pub fn factorize() {
    wrap_result_main(|| {
        let (matches, settings) = setup({
            app_from_crate!(", ")
                .name("rla-factorize")
                .about("QR, SVD or symmetric eigendecomposition (see 'factorization.kind' in the config).")
                .args(&[
                    input_arg("binary matrix file"),
                    output_arg("directory for the factors, one binary matrix file each"),
                ])
        })?;

        let report = cmd::run_factorize(
            &settings,
            path_of(&matches, "input"),
            path_of(&matches, "output"),
        )?;
        for path in &report.files {
            info!("wrote {}", path.display());
        }
        Ok(())
    });
}

pub fn random_matrix() {
    wrap_result_main(|| {
        let (matches, _settings) = setup({
            app_from_crate!(", ")
                .name("rla-random-matrix")
                .about("Matrix of independent standard normal variates.")
                .args(&[
                    Arg::with_name("rows").value_name("ROWS").required(true),
                    Arg::with_name("cols").value_name("COLS").required(true),
                    output_arg("binary matrix file"),
                ])
        })?;

        let rows = value_t!(matches, "rows", usize)?;
        let cols = value_t!(matches, "cols", usize)?;
        cmd::run_random_matrix(rows, cols, path_of(&matches, "output"))
    });
}
