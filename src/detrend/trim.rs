/// Number of samples invalidated at both ends of a daily trend
pub const DEFAULT_EDGE_MARGIN: usize = 10;

/// Invalidates the first and last `margin` samples of the complete series,
/// whatever the [Interval](crate::detrend::Interval) layout.
pub fn trim_edges(trend: &mut [f64], margin: usize) {
    let len = trend.len();
    let head = margin.min(len);
    let tail = len.saturating_sub(margin);

    trend[..head].fill(f64::NAN);
    trend[tail..].fill(f64::NAN);
}
