use crate::signal::argmax;

pub(crate) const GRAVITY_MPS2: f64 = 9.81;

/// First index at or after `search_from` where the acceleration magnitude
/// crosses `threshold_g` (in g), refined to the local maximum within the
/// following refractory window.
///
/// Without a crossing the detector falls back to the global maximum of the
/// whole signal, first occurrence on ties.
pub(crate) fn impact_index(
    signal_values: &[f64],
    rate_hz: f64,
    threshold_g: f64,
    refractory_s: f64,
    search_from: usize,
) -> usize {
    if signal_values.is_empty() {
        return 0;
    }

    let threshold = threshold_g * GRAVITY_MPS2;
    let refractory_len = (refractory_s * rate_hz).ceil().max(1.0) as usize;
    let search_from = search_from.min(signal_values.len());

    for (i, value) in signal_values.iter().enumerate().skip(search_from) {
        if *value >= threshold {
            let window_end = (i + refractory_len + 1).min(signal_values.len());
            return i + argmax(&signal_values[i..window_end]);
        }
    }

    argmax(signal_values)
}
