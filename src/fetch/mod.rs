//! Forecast acquisition.
//!
//! Drives the Copernicus Marine download tools as subprocesses: either
//! the `copernicusmarine` toolbox or the legacy `motuclient`. Both take
//! the same subset (variables, bounding box, time window) and write a
//! NetCDF file; this module renders the argument lists, checks
//! credentials, runs the tool and verifies its exit status.

mod cmems;

pub use cmems::{
    run_fetch, CmemsCredentials, FetchBackend, FetchError, MotuOptions, SubsetRequest,
    BBOX_BUFFER_DEG, COPERNICUS_DATASET_ID, DEFAULT_VARIABLES, FORECAST_HOURS, MOTU_PRODUCT_ID,
    MOTU_SERVICE_ID, MOTU_URL, SURFACE_DEPTH,
};
