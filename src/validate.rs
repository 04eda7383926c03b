// SPDX-License-Identifier: MIT

//! Structural validation of a report descriptor.
//!
//! The [Validator] does a single forward pass over a sequence of items and
//! collects every [Violation] it finds. Validation never fails, a descriptor
//! is structurally valid if the list of violations is empty.
//!
//! ```
//! # use hidrdesc::hid::ReportDescriptorItems;
//! # use hidrdesc::validate::*;
//! #[rustfmt::skip]
//! let bytes: &[u8] = &[
//!     0x05, 0x01,        // Usage Page (Generic Desktop)
//!     0x09, 0x02,        // Usage (Mouse)
//!     0xa1, 0x01,        // Collection (Application)
//!     0x15, 0x81,        //   Logical Minimum (-127)
//!     0x25, 0x7f,        //   Logical Maximum (127)
//!     0x75, 0x08,        //   Report Size (8)
//!     0x95, 0x01,        //   Report Count (1)
//!     0x81, 0x06,        //   Input (Data,Var,Rel)
//!     // missing End Collection
//! ];
//! let items = ReportDescriptorItems::try_from(bytes).unwrap();
//! assert_eq!(validate(&items), vec![Violation::UnbalancedCollectionTags]);
//! ```

use std::ops::ControlFlow;

use crate::hid::{GlobalItem, ItemType, LocalItem, MainItem, RawItem, ReportDescriptorItem};

use thiserror::Error;

/// A structural problem in a report descriptor.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    #[error("Collection and End Collection items are not balanced")]
    UnbalancedCollectionTags,
    #[error("Push and Pop items are not balanced")]
    UnbalancedGlobalPushPop,
    #[error("Unknown item type or tag")]
    UnknownTypeOrTag,
    #[error("No Input, Output or Feature items")]
    NoReportItems,
    #[error("Usage Minimum and Usage Maximum are not paired")]
    UnevenUsageBoundaries,
    #[error("String Minimum and String Maximum are not paired")]
    UnevenStringBoundaries,
    #[error("Designator Minimum and Designator Maximum are not paired")]
    UnevenDesignatorBoundaries,
    #[error("Main item without a Usage Page")]
    MissingUsagePage,
    #[error("Main item without a Usage or Usage Minimum/Maximum")]
    MissingUsage,
    #[error("Main item without a Logical Minimum")]
    MissingLogicalMinimum,
    #[error("Main item without a Logical Maximum")]
    MissingLogicalMaximum,
    #[error("Main item without a Report Size")]
    MissingReportSize,
    #[error("Main item without a Report Count")]
    MissingReportCount,
}

/// Items seen before a Main item. These are never reset within one pass.
#[derive(Debug, Default)]
struct Seen {
    usage_page: bool,
    usage: bool,
    usage_minimum: bool,
    usage_maximum: bool,
    logical_minimum: bool,
    logical_maximum: bool,
    report_size: bool,
    report_count: bool,
}

impl Seen {
    fn has_usage(&self) -> bool {
        self.usage || (self.usage_minimum && self.usage_maximum)
    }
}

/// The single-pass validator state. A [Validator] is created for
/// one sequence of items and consumed by it, use [validate] or
/// [validate_raw_items].
#[derive(Debug, Default)]
pub struct Validator {
    collections: isize,
    push_pop: isize,
    report_items: usize,
    usage_ranges: usize,
    string_ranges: usize,
    designator_ranges: usize,
    seen: Seen,
    violations: Vec<Violation>,
}

impl Validator {
    /// Validate a sequence of items where `None` is an item that could not
    /// be interpreted.
    pub fn scan<'a>(items: impl IntoIterator<Item = Option<&'a ItemType>>) -> Vec<Violation> {
        let mut validator = Validator::default();
        for item in items {
            let next = match item {
                Some(item) => validator.step(item),
                None => ControlFlow::Break(Violation::UnknownTypeOrTag),
            };
            if let ControlFlow::Break(violation) = next {
                return vec![violation];
            }
        }
        validator.finish()
    }

    fn step(&mut self, item: &ItemType) -> ControlFlow<Violation> {
        match item {
            ItemType::Main(MainItem::Collection(_)) => self.collections += 1,
            ItemType::Main(MainItem::EndCollection) => {
                self.collections -= 1;
                if self.collections < 0 {
                    return ControlFlow::Break(Violation::UnbalancedCollectionTags);
                }
            }
            ItemType::Main(main) => {
                if let Some(data_item) = main.data_item() {
                    self.report_items += 1;
                    self.check_required_state(data_item.is_constant());
                }
            }
            ItemType::Global(global) => match global {
                GlobalItem::UsagePage(_) => self.seen.usage_page = true,
                GlobalItem::LogicalMinimum(_) => self.seen.logical_minimum = true,
                GlobalItem::LogicalMaximum(_) => self.seen.logical_maximum = true,
                GlobalItem::ReportSize(_) => self.seen.report_size = true,
                GlobalItem::ReportCount(_) => self.seen.report_count = true,
                GlobalItem::Push => self.push_pop += 1,
                GlobalItem::Pop => {
                    self.push_pop -= 1;
                    if self.push_pop < 0 {
                        return ControlFlow::Break(Violation::UnbalancedGlobalPushPop);
                    }
                }
                _ => {}
            },
            ItemType::Local(local) => match local {
                LocalItem::Usage(..) | LocalItem::UsageId(_) => self.seen.usage = true,
                LocalItem::UsageMinimum(_) => {
                    self.usage_ranges += 1;
                    self.seen.usage_minimum = true;
                }
                LocalItem::UsageMaximum(_) => {
                    self.usage_ranges += 1;
                    self.seen.usage_maximum = true;
                }
                LocalItem::StringMinimum(_) | LocalItem::StringMaximum(_) => {
                    self.string_ranges += 1;
                }
                LocalItem::DesignatorMinimum(_) | LocalItem::DesignatorMaximum(_) => {
                    self.designator_ranges += 1;
                }
                _ => {}
            },
        }
        ControlFlow::Continue(())
    }

    /// Check the globals and locals required before an Input, Output
    /// or Feature item.
    fn check_required_state(&mut self, is_constant: bool) {
        let seen = &self.seen;
        // Constant padding only needs a size and count
        let padding = is_constant
            && seen.report_size
            && seen.report_count
            && !seen.usage_page
            && !seen.has_usage()
            && !seen.logical_minimum
            && !seen.logical_maximum;
        if padding {
            return;
        }

        let required = [
            (seen.usage_page, Violation::MissingUsagePage),
            (seen.has_usage(), Violation::MissingUsage),
            (seen.logical_minimum, Violation::MissingLogicalMinimum),
            (seen.logical_maximum, Violation::MissingLogicalMaximum),
            (seen.report_size, Violation::MissingReportSize),
            (seen.report_count, Violation::MissingReportCount),
        ];
        let missing = required
            .into_iter()
            .filter_map(|(present, violation)| (!present).then_some(violation));
        self.violations.extend(missing);
    }

    fn finish(mut self) -> Vec<Violation> {
        if self.collections != 0 {
            self.violations.push(Violation::UnbalancedCollectionTags);
        }
        if self.push_pop != 0 {
            self.violations.push(Violation::UnbalancedGlobalPushPop);
        }
        if self.report_items == 0 {
            self.violations.push(Violation::NoReportItems);
        }
        if self.usage_ranges % 2 != 0 {
            self.violations.push(Violation::UnevenUsageBoundaries);
        }
        if self.string_ranges % 2 != 0 {
            self.violations.push(Violation::UnevenStringBoundaries);
        }
        if self.designator_ranges % 2 != 0 {
            self.violations.push(Violation::UnevenDesignatorBoundaries);
        }
        self.violations
    }
}

/// Validate the given items, returning all violations found.
pub fn validate(items: &[ReportDescriptorItem]) -> Vec<Violation> {
    Validator::scan(items.iter().map(|item| Some(item.item())))
}

/// Validate the given raw items. The first raw item that cannot be
/// interpreted stops validation with [Violation::UnknownTypeOrTag].
pub fn validate_raw_items(items: &[RawItem]) -> Vec<Violation> {
    let items: Vec<Option<ItemType>> = items.iter().map(ItemType::from_raw).collect();
    Validator::scan(items.iter().map(Option::as_ref))
}
