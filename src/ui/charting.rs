use itertools::Itertools;

/// One bar per reflex round, labelled R1..R5, height in whole milliseconds
pub fn reaction_bars(rounds_ms: &[f64]) -> Vec<(String, u64)> {
    rounds_ms
        .iter()
        .enumerate()
        .map(|(i, ms)| (format!("R{}", i + 1), ms.max(0.0).round() as u64))
        .collect()
}

/// Upper bound of the bar chart: the slowest round rounded up to the next 50ms
pub fn chart_max(rounds_ms: &[f64]) -> u64 {
    let slowest = rounds_ms.iter().cloned().fold(0.0_f64, f64::max);
    let rounded = ((slowest / 50.0).ceil() * 50.0) as u64;
    rounded.max(100)
}

/// Whole-millisecond reaction times in round order, e.g. "212 / 188"
pub fn rounds_line(rounds_ms: &[f64]) -> String {
    rounds_ms.iter().map(|ms| format!("{ms:.0}")).join(" / ")
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
