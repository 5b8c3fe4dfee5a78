pub mod batch;
pub mod chromatogram;
pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod peak;
pub mod resolver;
pub mod signal_processing;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use batch::{BatchResolver, ResolveEvent, resolve_all};
pub use chromatogram::{Chromatogram, ChromatogramData, Sample};
pub use config::{PeakFillingConfig, ResolverConfig};
pub use error::{PeakError, Result};
pub use peak::{PeakIdentity, ResolvedPeak, RtRange};
pub use resolver::{PeakResolver, SavitzkyGolayResolver, resolve};
