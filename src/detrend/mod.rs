//! Gap aware polynomial detrending of a single day TEC series
mod polynomial;
mod segment;
mod trim;

pub use polynomial::{Detrended, FitError, PolynomialDetrender};
pub use segment::{Interval, Segmentation, Segmenter};
pub use trim::{trim_edges, DEFAULT_EDGE_MARGIN};
