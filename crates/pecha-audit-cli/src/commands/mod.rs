pub mod annotation_report;
pub mod classify;
pub mod folder_report;
pub mod inspect;
pub mod layers;
pub mod metadata_report;
