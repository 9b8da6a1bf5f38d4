use num_complex::Complex64;

/// Number of terms retained in the Mie series for size parameter `x`.
///
/// This is the standard truncation rule `n_c = round(2 + x + 4·x^(1/3))`
/// (Bohren & Huffman / Wiscombe). The exact form matters: reference
/// cross-section tables are only reproduced if the series is cut at
/// precisely this order.
pub fn series_length(x: f64) -> usize {
    (2.0 + x + 4.0 * x.powf(1.0 / 3.0)).round() as usize
}

/// Compute the angle-dependent functions π_n and τ_n by upward recurrence.
///
/// Per Bohren & Huffman eq. 4.47. The returned arrays are 0-indexed with
/// index `i` holding order `i + 1`, so the seeds are
/// `π[0] = 1`, `π[1] = 3μ`, `τ[0] = μ`, `τ[1] = 3·cos(2·arccos μ)` with
/// `μ = cos θ`. The recurrence below is written against that indexing; the
/// order bookkeeping must not be "simplified" or the downstream
/// cross-sections silently come out wrong.
///
/// The scattering angle `theta` is in degrees. The series length is set by
/// `x`; a size parameter of zero produces NaN terms, which callers avoid by
/// construction (diameters are strictly positive).
pub fn angular_functions(theta: f64, x: f64) -> (Vec<f64>, Vec<f64>) {
    let mu = theta.to_radians().cos();
    let nc = series_length(x);

    let mut pi = vec![0.0; nc];
    let mut tau = vec![0.0; nc];

    pi[0] = 1.0;
    pi[1] = 3.0 * mu;
    tau[0] = mu;
    tau[1] = 3.0 * (2.0 * mu.acos()).cos();

    for n in 2..nc {
        let nf = n as f64;
        pi[n] = (mu * pi[n - 1] * (2.0 * nf + 1.0) - pi[n - 2] * (nf + 1.0)) / nf;
        tau[n] = (nf + 1.0) * mu * pi[n] - (nf + 2.0) * pi[n - 1];
    }

    (pi, tau)
}

/// Compute the logarithmic derivative D_n(z) for orders 1..=`nc`.
///
/// The recurrence `D_{n-1} = n/z - 1/(D_n + n/z)` is run *downward* from a
/// padded starting order `nmx = round(max(nc, |z|)) + 16` with `D_nmx = 0`.
/// Downward recurrence is the numerically stable direction here (the
/// Lentz/Bohren-Huffman trick): errors in the arbitrary starting value decay
/// as the recurrence descends, so only the padding terms are contaminated
/// and the retained orders are accurate.
pub fn log_derivative(z: Complex64, nc: usize) -> Vec<Complex64> {
    let nmx = (nc as f64).max(z.norm()).round() as usize + 16;

    let mut dn = vec![Complex64::ZERO; nmx];
    for i in (2..nmx).rev() {
        let nf = Complex64::from(i as f64);
        dn[i - 1] = nf / z - Complex64::from(1.0) / (dn[i] + nf / z);
    }

    dn[1..=nc].to_vec()
}
