// SPDX-License-Identifier: MIT

//! Decoding and structural validation of HID Report Descriptors.
//!
//! A HID Report Descriptor is a sequence of items describing the reports
//! a HID device sends and receives. This crate splits the descriptor into
//! its items ([hid]), tracks the global item state and report sizes
//! ([stack]) and checks the items for structural problems ([validate]).
//!
//! ```
//! # use hidrdesc::*;
//! #[rustfmt::skip]
//! let bytes: &[u8] = &[
//!     0x05, 0x01,        // Usage Page (Generic Desktop)
//!     0x09, 0x02,        // Usage (Mouse)
//!     0xa1, 0x01,        // Collection (Application)
//!     0x85, 0x02,        //   Report ID (2)
//!     0x09, 0x30,        //   Usage (X)
//!     0x09, 0x31,        //   Usage (Y)
//!     0x15, 0x81,        //   Logical Minimum (-127)
//!     0x25, 0x7f,        //   Logical Maximum (127)
//!     0x75, 0x08,        //   Report Size (8)
//!     0x95, 0x02,        //   Report Count (2)
//!     0x81, 0x06,        //   Input (Data,Var,Rel)
//!     0xc0,              // End Collection
//! ];
//! let rdesc = ReportDescriptor::try_from(bytes).unwrap();
//! assert_eq!(rdesc.items().len(), 12);
//! assert!(rdesc.validate().is_empty());
//!
//! let report = rdesc.reports().report(ReportId(2)).unwrap();
//! assert_eq!(report.get(Direction::Input), 24);
//! ```

use thiserror::Error;

/// Return early with the given error if the condition does not hold.
#[macro_export]
#[doc(hidden)]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

pub mod hid;
pub mod stack;
pub mod types;
pub mod validate;

use hid::{HidError, RawItem, ReportDescriptorItem, ReportDescriptorItems};
use stack::ReportBookkeeping;
pub use types::*;
pub use validate::{validate_raw_items, Violation};

/// The direction of a report, from the perspective of the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
    Feature,
}

/// A parsed HID Report Descriptor. Use
/// [`ReportDescriptor::try_from(bytes)`](ReportDescriptor::try_from)
/// to create one.
#[derive(Debug)]
pub struct ReportDescriptor {
    items: ReportDescriptorItems,
    reports: ReportBookkeeping,
}

impl ReportDescriptor {
    /// The items of this report descriptor in the order they appear.
    pub fn items(&self) -> &[ReportDescriptorItem] {
        &self.items
    }

    /// The size of each report described by this report descriptor.
    pub fn reports(&self) -> &ReportBookkeeping {
        &self.reports
    }

    /// Check the items of this report descriptor for structural
    /// problems. An empty list means the report descriptor is valid.
    pub fn validate(&self) -> Vec<Violation> {
        validate::validate(&self.items)
    }
}

impl TryFrom<&[u8]> for ReportDescriptor {
    type Error = ParserError;

    fn try_from(bytes: &[u8]) -> Result<ReportDescriptor> {
        parse_report_descriptor(bytes)
    }
}

impl TryFrom<&Vec<u8>> for ReportDescriptor {
    type Error = ParserError;

    fn try_from(bytes: &Vec<u8>) -> Result<ReportDescriptor> {
        parse_report_descriptor(bytes)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Unexpected end of data in item at offset {offset}")]
    UnexpectedEndOfData { offset: usize },
    #[error("Invalid item while parsing: {item}")]
    InvalidItemWhileParsing {
        item: RawItem,
        /// All items parsed before the invalid one
        parsed: Vec<ReportDescriptorItem>,
    },
    #[error("Pop item at offset {offset} without a preceding Push")]
    UnbalancedGlobalPushPop { offset: usize },
}

impl From<HidError> for ParserError {
    fn from(e: HidError) -> ParserError {
        match e {
            HidError::UnexpectedEndOfData { offset } => ParserError::UnexpectedEndOfData { offset },
            HidError::UnknownTypeOrTag { item } => ParserError::InvalidItemWhileParsing {
                item,
                parsed: vec![],
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;

fn parse_report_descriptor(bytes: &[u8]) -> Result<ReportDescriptor> {
    let items = ReportDescriptorItems::try_from(bytes)?;
    let reports = stack::collect_reports(&items)?;

    Ok(ReportDescriptor { items, reports })
}
