pub mod savitzky_golay;
pub mod threshold;

pub use savitzky_golay::{DerivativeOrder, derivative, savitzky_golay_kernel};
pub use threshold::{derivative_threshold, quantile};
