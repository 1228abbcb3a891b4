//! Condition detectors for clinical notes
//!
//! Each detector classifies one concept and returns its candidate findings:
//! - IUD insertion, difficult insertion, removal and brand
//! - IUD perforation
//! - IUD expulsion in clinic notes and in radiology reports
//! - breastfeeding status
//! - parity
//!
//! # Example
//!
//! ```
//! use apex_algo::DetectorRegistry;
//! use apex_core::{Document, select_best};
//!
//! let registry = DetectorRegistry::with_defaults().unwrap();
//! let doc = Document::from_text("note-1", "G 2 P 2002").unwrap();
//! let parity = registry.get("parity").unwrap();
//! let best = select_best(parity.detect(&doc, None).unwrap()).unwrap();
//! assert_eq!(best.status.name, "P2");
//! ```

pub mod breastfeeding;
pub mod detector;
pub mod iud_brand;
pub mod iud_difficult_insertion;
pub mod iud_expulsion;
pub mod iud_expulsion_rad;
pub mod iud_insertion;
pub mod iud_perforation;
pub mod iud_removal;
pub mod parity;
pub mod registry;
pub mod shared;

pub use breastfeeding::{BreastfeedingDetector, BreastfeedingStatus};
pub use detector::Detector;
pub use iud_brand::{BrandDetector, BrandStatus};
pub use iud_difficult_insertion::{DifficultInsertionDetector, DifficultInsertionStatus};
pub use iud_expulsion::{ExpulsionDetector, ExpulsionStatus};
pub use iud_expulsion_rad::RadiologyExpulsionDetector;
pub use iud_insertion::{InsertionDetector, InsertionStatus};
pub use iud_perforation::{PerforationDetector, PerforationStatus};
pub use iud_removal::{RemovalDetector, RemovalStatus};
pub use parity::{ParityDetector, ParityReading, ParitySource, ParityStatus};
pub use registry::{DetectorRef, DetectorRegistry};
