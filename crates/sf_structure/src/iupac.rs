//! IUPAC nucleotide codes.
//!
//! Target sequences may use the full IUPAC alphabet to constrain
//! positions only partially. `N` (any base) and `.` (no information)
//! leave a position unconstrained.

use ndarray::Array2;

/// The four RNA bases, in the order used for random draws.
pub const RNA_BASES: [char; 4] = ['A', 'G', 'C', 'U'];

/// The bases an IUPAC code stands for. `T` and `U` are treated alike.
pub fn iupac_bases(code: char) -> Option<&'static str> {
    let bases = match code.to_ascii_uppercase() {
        'A' => "A",
        'C' => "C",
        'G' => "G",
        'T' | 'U' => "TU",
        'R' => "AG",
        'Y' => "CTU",
        'S' => "GC",
        'W' => "ATU",
        'K' => "GTU",
        'M' => "AC",
        'B' => "CGTU",
        'D' => "AGTU",
        'H' => "ACTU",
        'V' => "ACG",
        'N' => "AGCTU",
        '.' => ".",
        _ => return None,
    };
    Some(bases)
}

pub fn is_valid_iupac(sequence: &str) -> bool {
    sequence.chars().all(|c| iupac_bases(c).is_some())
}

/// True if the two codes share at least one base. Unknown codes are
/// never compatible.
pub fn iupac_compatible(a: char, b: char) -> bool {
    match (iupac_bases(a), iupac_bases(b)) {
        (Some(x), Some(y)) => x.chars().any(|c| y.contains(c)),
        _ => false,
    }
}

/// True if the code restricts the base at its position.
pub fn is_constrained(code: char) -> bool {
    !matches!(code.to_ascii_uppercase(), 'N' | '.')
}

/// Edit distance of a designed `source` against an IUPAC `target`.
///
/// Compatible characters align for free, incompatible ones cost 1.
/// Source characters may be skipped for free; skipping a target character
/// costs 1 if it is constrained.
pub fn iupac_distance(source: &str, target: &str) -> f64 {
    let s: Vec<char> = source.chars().collect();
    let t: Vec<char> = target.chars().collect();
    let gap = |c: char| if is_constrained(c) { 1.0 } else { 0.0 };

    let mut dp = Array2::<f64>::zeros((s.len() + 1, t.len() + 1));
    for j in 1..=t.len() {
        dp[(0, j)] = dp[(0, j - 1)] + gap(t[j - 1]);
    }
    for i in 1..=s.len() {
        for j in 1..=t.len() {
            let pair = if iupac_compatible(s[i - 1], t[j - 1]) { 0.0 } else { 1.0 };
            dp[(i, j)] = (dp[(i - 1, j - 1)] + pair)
                .min(dp[(i - 1, j)])
                .min(dp[(i, j - 1)] + gap(t[j - 1]));
        }
    }
    dp[(s.len(), t.len())]
}
