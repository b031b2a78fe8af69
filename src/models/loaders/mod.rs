pub mod request_loader;

pub use request_loader::{
    load_all_request_files, load_manual_file, load_request_file, DistributionSpec, ManualSpec,
    RequestSpec,
};
