//! Standard 19-electrode 10-20 layout.
//!
//! Positions are spherical `(theta, phi)` pairs in degrees (BESA convention:
//! `theta` is the signed angle from the vertex, `phi` the azimuth from the
//! right ear towards the nose) projected onto a 95 mm sphere:
//!
//! ```text
//! x = r · sin θ · cos φ      (right)
//! y = r · sin θ · sin φ      (nose)
//! z = r · cos θ              (vertex)
//! ```
use ndarray::Array2;

/// Head radius in metres.
pub const HEAD_RADIUS: f64 = 0.095;

const LAYOUT: [(&str, f64, f64); 23] = [
    ("Fp1", -92.0, -72.0),
    ("Fp2", 92.0, 72.0),
    ("F7", -92.0, -36.0),
    ("F3", -60.0, -51.0),
    ("Fz", 46.0, 90.0),
    ("F4", 60.0, 51.0),
    ("F8", 92.0, 36.0),
    ("T3", -92.0, 0.0),
    ("C3", -46.0, 0.0),
    ("Cz", 0.0, 0.0),
    ("C4", 46.0, 0.0),
    ("T4", 92.0, 0.0),
    ("T5", -92.0, 36.0),
    ("P3", -60.0, 51.0),
    ("Pz", 46.0, -90.0),
    ("P4", 60.0, -51.0),
    ("T6", 92.0, -36.0),
    ("O1", -92.0, 72.0),
    ("O2", 92.0, -72.0),
    // Modern aliases of the temporal electrodes.
    ("T7", -92.0, 0.0),
    ("T8", 92.0, 0.0),
    ("P7", -92.0, 36.0),
    ("P8", 92.0, -36.0),
];

/// Cartesian position (metres) of electrode `name`, if it is in the layout.
pub fn position(name: &str) -> Option<[f32; 3]> {
    LAYOUT
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, theta, phi)| {
            let (t, p) = (theta.to_radians(), phi.to_radians());
            [
                (HEAD_RADIUS * t.sin() * p.cos()) as f32,
                (HEAD_RADIUS * t.sin() * p.sin()) as f32,
                (HEAD_RADIUS * t.cos()) as f32,
            ]
        })
}

/// `[C, 3]` positions for `names`.
///
/// Returns the first name with no layout entry as the error.
pub fn standard_1020(names: &[String]) -> Result<Array2<f32>, String> {
    let mut pos = Array2::<f32>::zeros((names.len(), 3));
    for (i, name) in names.iter().enumerate() {
        let p = position(name).ok_or_else(|| name.clone())?;
        pos.row_mut(i).assign(&ndarray::ArrayView1::from(&p));
    }
    Ok(pos)
}
