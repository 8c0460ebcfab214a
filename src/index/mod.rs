pub mod batch;
pub mod inputs;
pub mod phi;
pub mod prefix_array;
pub mod reader;
pub mod stats;
pub mod stpd_array;
pub mod stpd_index;
pub mod types;
pub mod writer;

pub use batch::{BatchSummary, locate_fasta};
pub use inputs::{BuildInputs, PrefixArrayView};
pub use phi::{Phi, PhiFunction};
pub use reader::IndexReader;
pub use stpd_array::StpdArray;
pub use stpd_index::StpdIndex;
pub use types::*;
pub use writer::IndexWriter;
