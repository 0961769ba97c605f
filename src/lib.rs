// data module
pub mod data {
    pub mod sample;
    pub mod stats;
}

// algorithm module
pub mod algorithm {
    pub mod preprocessing;
    pub mod binning;
    pub mod metrics;
}

// visualization module
pub mod viz {
    pub mod grid;
    pub mod spectrum;
}

pub mod error;
