mod preprocess;
mod roi;

pub use preprocess::{Preprocessor, Sample, BINARY_THRESHOLD, SAMPLE_SIZE};
pub use roi::{Roi, ROI_BORDER_COLOR, ROI_MARGIN};
