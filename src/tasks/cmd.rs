/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Implementations of the commands, free of any CLI concerns.

use crate::FailResult;
use crate::config::{Settings, FactorizationKind};

use ::failure::ResultExt;
use ::rla_linalg::{self as linalg, Matrix, Vector, Orthonormalize};
use ::rla_linalg::composite::{orthogonality_error, reconstruction_residual};
use ::std::path::{Path, PathBuf};

/// Size the global rayon pool according to the settings.
///
/// Must run before anything else touches rayon.
pub fn init_thread_pool(settings: &Settings) -> FailResult<()>
{
    if let Some(threads) = settings.threads {
        ::rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
        debug!("using {} threads", threads);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrthonormalizeReport {
    pub dims: (usize, usize),
    /// `max |Q^T Q - I|`
    pub orthogonality_error: f64,
    /// `||A - Q Q^T A||_F / ||A||_F`
    pub reconstruction_residual: f64,
}

pub fn run_orthonormalize(
    settings: &Settings,
    input: &Path,
    output: &Path,
) -> FailResult<OrthonormalizeReport>
{
    let a = linalg::load_binary_file(input)?;
    let mut q = Orthonormalize::new()
        .rank_rtol(settings.orthonormalize.rank_rtol)
        .build(&a)
        .with_context(|_| format!("while orthonormalizing the columns of {}", input.display()))?;

    let report = OrthonormalizeReport {
        dims: a.dims(),
        orthogonality_error: orthogonality_error(&q)?,
        reconstruction_residual: reconstruction_residual(&a, &q)?,
    };
    info!("max |Q^T Q - I|: {:e}", report.orthogonality_error);
    info!("reconstruction residual: {:e}", report.reconstruction_residual);

    apply_threshold(settings, &mut q);
    linalg::save_binary_file(output, &q)?;
    Ok(report)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorizeReport {
    pub kind: FactorizationKind,
    /// `100 * ||A - product of factors||_F / ||A||_F`
    pub percent_error: f64,
    pub files: Vec<PathBuf>,
}

pub fn run_factorize(
    settings: &Settings,
    input: &Path,
    outdir: &Path,
) -> FailResult<FactorizeReport>
{
    let a = linalg::load_binary_file(input)?;
    ::std::fs::create_dir_all(outdir)
        .with_context(|e| format!("{}: {}", outdir.display(), e))?;

    let kind = settings.factorization.kind;
    let (reference, product, mut factors) = match kind {
        FactorizationKind::Qr => {
            let linalg::Qr { q, r } = linalg::lapack::qr(&a)?;
            let product = linalg::blas::dot(&q, &r)?;

            // R only covers the leading k x k block of a wide matrix
            let k = r.num_cols();
            let reference = match a.num_cols() > k {
                false => a,
                true => {
                    info!("QR of a {} x {} matrix only reconstructs its first {} columns",
                        a.num_rows(), a.num_cols(), k);
                    let mut lead = Matrix::zeros((a.num_rows(), k));
                    a.copy_first_columns(&mut lead)?;
                    lead
                },
            };
            (reference, product, vec![("q", q), ("r", r)])
        },
        FactorizationKind::Svd => {
            let linalg::Svd { u, s, vt } = linalg::lapack::svd(&a)?;
            let mut product = Matrix::zeros(a.dims());
            linalg::form_svd_product(&u, &s, &vt, &mut product)?;
            (a, product, vec![("u", u), ("s", s), ("vt", vt)])
        },
        FactorizationKind::Eigh => {
            ensure!(a.is_square(), "eigh requires a square matrix, got {} x {}", a.num_rows(), a.num_cols());
            let n = a.num_rows();

            // only the upper triangle is read, so compare against its symmetric completion
            let mut upper = Matrix::zeros((n, n));
            upper.copy_upper_triangle(&a)?;
            let symmetric = Matrix::from_fn((n, n), |i, j| match i <= j {
                true => upper.get(i, j),
                false => upper.get(j, i),
            });

            let mut vecs = a;
            let mut vals = Vector::zeros(n);
            linalg::lapack::symmetric_eigen(&mut vecs, &mut vals)?;

            let lambda = Matrix::from_diagonal(&vals);
            let v_lambda = linalg::blas::dot(&vecs, &lambda)?;
            let mut product = Matrix::zeros((n, n));
            linalg::blas::matrix_matrix_transpose_mult(&v_lambda, &vecs, &mut product)?;

            let vals = Matrix::from_column_major_data((n, 1), vals.into_vec());
            (symmetric, product, vec![("eigenvectors", vecs), ("eigenvalues", vals)])
        },
    };

    let percent_error = linalg::percent_error_between(&reference, &product)?;
    info!("{:?} reconstruction error: {:e}%", kind, percent_error);

    let mut files = vec![];
    for (name, m) in &mut factors {
        apply_threshold(settings, m);
        let path = outdir.join(format!("{}.bin", name));
        linalg::save_binary_file(&path, m)?;
        files.push(path);
    }
    Ok(FactorizeReport { kind, percent_error, files })
}

pub fn run_random_matrix(rows: usize, cols: usize, output: &Path) -> FailResult<()>
{
    let mut m = Matrix::zeros((rows, cols));
    linalg::initialize_random_matrix(&mut m);
    linalg::save_binary_file(output, &m)?;
    info!("wrote {} x {} Gaussian matrix to {}", rows, cols, output.display());
    Ok(())
}

fn apply_threshold(settings: &Settings, m: &mut Matrix)
{
    if let Some(threshold) = settings.threshold {
        m.hard_threshold(threshold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rla_linalg::Error as LinalgError;
    use ::tempdir::TempDir;

    fn settings(yaml: &str) -> Settings
    { crate::ValidatedSettings::from_yaml_str(yaml).unwrap().0 }

    fn write_input(dir: &TempDir, m: &Matrix) -> PathBuf {
        let path = dir.path().join("input.bin");
        linalg::save_binary_file(&path, m).unwrap();
        path
    }

    fn sample() -> Matrix {
        Matrix::from_row_major_data((4, 3), &[
            4.0, 1.0, 0.5,
            1.0, 3.0, -1.0,
            0.5, -1.0, 2.0,
            2.0, 0.0, 1.0,
        ])
    }

    #[test]
    fn orthonormalize_writes_basis() {
        let dir = TempDir::new("rla-cmd").unwrap();
        let input = write_input(&dir, &sample());
        let output = dir.path().join("q.bin");

        let report = run_orthonormalize(&settings(""), &input, &output).unwrap();
        assert_eq!(report.dims, (4, 3));
        assert!(report.orthogonality_error < 1e-12);
        assert!(report.reconstruction_residual < 1e-12);

        let q = linalg::load_binary_file(&output).unwrap();
        assert_eq!(q.dims(), (4, 3));
        assert!(orthogonality_error(&q).unwrap() < 1e-12);
    }

    #[test]
    fn orthonormalize_reports_rank_deficiency() {
        let dir = TempDir::new("rla-cmd").unwrap();
        let a = Matrix::from_columns(&[&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]]);
        let input = write_input(&dir, &a);
        let output = dir.path().join("q.bin");

        let err = run_orthonormalize(&settings(""), &input, &output).unwrap_err();
        match err.find_root_cause().downcast_ref::<LinalgError>() {
            Some(&LinalgError::RankDeficiency { column: 1, .. }) => {},
            e => panic!("{:?}", e),
        }
        assert!(err.to_string().contains("while orthonormalizing"), "{}", err);
        assert!(!output.exists());
    }

    #[test]
    fn malformed_input_is_distinct() {
        let dir = TempDir::new("rla-cmd").unwrap();
        let input = dir.path().join("input.bin");
        ::std::fs::write(&input, &[1u8, 2, 3]).unwrap();

        let err = run_orthonormalize(&settings(""), &input, &dir.path().join("q.bin")).unwrap_err();
        match err.find_root_cause().downcast_ref::<LinalgError>() {
            Some(&LinalgError::MalformedFile(_)) => {},
            e => panic!("{:?}", e),
        }
    }

    #[test]
    fn factorize_each_kind() {
        let dir = TempDir::new("rla-cmd").unwrap();
        let input = write_input(&dir, &sample());

        let cases = vec![
            ("qr", vec!["q.bin", "r.bin"]),
            ("svd", vec!["u.bin", "s.bin", "vt.bin"]),
        ];
        for (kind, expected_files) in cases {
            let outdir = dir.path().join(kind);
            let yaml = format!("factorization: {{ kind: {} }}", kind);
            let report = run_factorize(&settings(&yaml), &input, &outdir).unwrap();
            assert!(report.percent_error < 1e-10, "{}: {}", kind, report.percent_error);

            let names: Vec<_> = report.files.iter()
                .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
                .collect();
            assert_eq!(names, expected_files);
            for path in &report.files {
                assert!(path.exists());
            }
        }

        let q = linalg::load_binary_file(dir.path().join("qr/q.bin")).unwrap();
        let r = linalg::load_binary_file(dir.path().join("qr/r.bin")).unwrap();
        assert_eq!((q.dims(), r.dims()), ((4, 3), (3, 3)));

        let s = linalg::load_binary_file(dir.path().join("svd/s.bin")).unwrap();
        assert!(s.get(0, 0) >= s.get(1, 1) && s.get(1, 1) >= s.get(2, 2));

        // wide input
        let wide = dir.path().join("wide.bin");
        linalg::save_binary_file(&wide, &sample().to_transpose()).unwrap();
        for kind in vec!["qr", "svd"] {
            let outdir = dir.path().join(format!("wide-{}", kind));
            let yaml = format!("factorization: {{ kind: {} }}", kind);
            let report = run_factorize(&settings(&yaml), &wide, &outdir).unwrap();
            assert!(report.percent_error < 1e-10, "{}: {}", kind, report.percent_error);
        }
        let q = linalg::load_binary_file(dir.path().join("wide-qr/q.bin")).unwrap();
        let r = linalg::load_binary_file(dir.path().join("wide-qr/r.bin")).unwrap();
        assert_eq!((q.dims(), r.dims()), ((3, 3), (3, 3)));
    }

    #[test]
    fn factorize_eigh() {
        let dir = TempDir::new("rla-cmd").unwrap();
        // garbage below the diagonal is ignored
        let a = Matrix::from_row_major_data((3, 3), &[
            2.0, 1.0, 0.0,
            99.0, 2.0, 1.0,
            99.0, 99.0, 2.0,
        ]);
        let input = write_input(&dir, &a);
        let outdir = dir.path().join("eigh");

        let report = run_factorize(&settings("factorization: { kind: eigh }"), &input, &outdir).unwrap();
        assert!(report.percent_error < 1e-10, "{}", report.percent_error);

        let vals = linalg::load_binary_file(outdir.join("eigenvalues.bin")).unwrap();
        let root2 = 2f64.sqrt();
        assert_close!(abs=1e-12, vals.column_major_data(), &[2.0 - root2, 2.0, 2.0 + root2][..]);

        let err = run_factorize(&settings("factorization: { kind: eigh }"), &write_input(&dir, &sample()), &outdir).unwrap_err();
        assert!(err.to_string().contains("square"), "{}", err);
    }

    #[test]
    fn threshold_zeroes_small_entries() {
        let dir = TempDir::new("rla-cmd").unwrap();
        let a = Matrix::from_columns(&[&[1.0, 1e-20, 0.0], &[0.0, 1.0, 0.0]]);
        let input = write_input(&dir, &a);
        let output = dir.path().join("q.bin");

        run_orthonormalize(&settings("threshold: 1.0e-15"), &input, &output).unwrap();
        let q = linalg::load_binary_file(&output).unwrap();
        assert_eq!(q.get(1, 0), 0.0);
        assert_eq!(q.get(0, 0), 1.0);
    }

    #[test]
    fn random_matrix_file() {
        let dir = TempDir::new("rla-cmd").unwrap();
        let output = dir.path().join("r.bin");
        run_random_matrix(6, 2, &output).unwrap();
        let m = linalg::load_binary_file(&output).unwrap();
        assert_eq!(m.dims(), (6, 2));
        assert!(m.column_major_data().iter().all(|x| x.is_finite()));
    }
}
