pub mod insert;
pub mod scan;
pub mod sequential_scan;
