pub mod ground_truth;
pub mod ids;
pub mod predictions;

pub use ground_truth::{
    parse_ground_truth, read_ground_truth, GroundTruthColumns, GroundTruthRecord,
};
pub use ids::{parse_id_list, IdListError};
pub use predictions::Predictions;
