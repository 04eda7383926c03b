// SPDX-License-Identifier: MIT

//! The global item state table and per-report size bookkeeping.
//!
//! Global items apply to all subsequent Main items until overridden
//! (Section 6.2.2.7). A [GlobalStack] keeps the current set of [Globals]
//! and any copies saved by a Push item. [collect_reports] walks
//! the items of a report descriptor and sums up the size of each report.

use std::collections::BTreeMap;

use crate::hid::{GlobalItem, ItemType, MainItem, ReportDescriptorItem};
use crate::types::*;
use crate::{Direction, ParserError};

/// The state of all global items at one point in the report descriptor.
/// A field is `None` until the corresponding global item is seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Globals {
    pub usage_page: Option<UsagePage>,
    pub logical_minimum: Option<LogicalMinimum>,
    pub logical_maximum: Option<LogicalMaximum>,
    pub physical_minimum: Option<PhysicalMinimum>,
    pub physical_maximum: Option<PhysicalMaximum>,
    pub unit_exponent: Option<UnitExponent>,
    pub unit: Option<Unit>,
    pub report_size: Option<ReportSize>,
    pub report_id: Option<ReportId>,
    pub report_count: Option<ReportCount>,
}

impl Globals {
    /// The number of bits a data item with these globals adds to its report.
    /// A missing Report Size or Report Count counts as zero.
    pub fn bits(&self) -> usize {
        let size = self.report_size.map(usize::from).unwrap_or(0);
        let count = self.report_count.map(usize::from).unwrap_or(0);
        size.saturating_mul(count)
    }
}

/// The global item state table. There is always exactly one current
/// [Globals] record, a Push saves a copy of it and a Pop restores the
/// most recently saved copy.
///
/// ```
/// # use hidrdesc::stack::*;
/// # use hidrdesc::hid::GlobalItem;
/// # use hidrdesc::types::*;
/// let mut stack = GlobalStack::new();
/// stack.update(&GlobalItem::ReportSize(ReportSize(8)));
/// stack.push();
/// stack.update(&GlobalItem::ReportSize(ReportSize(16)));
/// assert_eq!(stack.globals().report_size, Some(ReportSize(16)));
/// assert!(stack.pop().is_some());
/// assert_eq!(stack.globals().report_size, Some(ReportSize(8)));
/// assert!(stack.pop().is_none());
/// ```
#[derive(Debug, Default)]
pub struct GlobalStack {
    current: Globals,
    saved: Vec<Globals>,
}

macro_rules! update_globals {
    ($stack:ident, $which:ident, $from:ident) => {
        $stack.globals_mut().$which = Some(*$from);
    };
}

impl GlobalStack {
    pub fn new() -> Self {
        GlobalStack::default()
    }

    /// Save a copy of the current globals.
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the most recently pushed globals, returning the record
    /// that was current before the Pop. Returns `None` and leaves the
    /// current globals untouched if there is nothing to restore.
    pub fn pop(&mut self) -> Option<Globals> {
        let restored = self.saved.pop()?;
        Some(std::mem::replace(&mut self.current, restored))
    }

    /// The number of records on the stack, including the current one.
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }

    pub fn globals(&self) -> &Globals {
        &self.current
    }

    pub fn globals_mut(&mut self) -> &mut Globals {
        &mut self.current
    }

    /// Apply the given global item to the current globals. Push and Pop
    /// are ignored here, use [GlobalStack::push] and [GlobalStack::pop].
    pub fn update(&mut self, item: &GlobalItem) {
        let stack = self;
        match item {
            GlobalItem::UsagePage(usage_page) => {
                update_globals!(stack, usage_page, usage_page);
            }
            GlobalItem::LogicalMinimum(minimum) => {
                update_globals!(stack, logical_minimum, minimum);
            }
            GlobalItem::LogicalMaximum(maximum) => {
                update_globals!(stack, logical_maximum, maximum);
            }
            GlobalItem::PhysicalMinimum(minimum) => {
                update_globals!(stack, physical_minimum, minimum);
            }
            GlobalItem::PhysicalMaximum(maximum) => {
                update_globals!(stack, physical_maximum, maximum);
            }
            GlobalItem::UnitExponent(exponent) => {
                update_globals!(stack, unit_exponent, exponent);
            }
            GlobalItem::Unit(unit) => {
                update_globals!(stack, unit, unit);
            }
            GlobalItem::ReportSize(size) => {
                update_globals!(stack, report_size, size);
            }
            GlobalItem::ReportId(id) => {
                update_globals!(stack, report_id, id);
            }
            GlobalItem::ReportCount(count) => {
                update_globals!(stack, report_count, count);
            }
            GlobalItem::Push | GlobalItem::Pop => {}
        }
    }
}

/// The accumulated size in bits of the Input, Output and Feature report
/// for one report ID.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportBits {
    pub input: usize,
    pub output: usize,
    pub feature: usize,
}

impl ReportBits {
    /// A numbered report starts with 8 bits for the report ID byte.
    fn numbered() -> Self {
        ReportBits {
            input: 8,
            output: 8,
            feature: 8,
        }
    }

    pub fn get(&self, direction: Direction) -> usize {
        match direction {
            Direction::Input => self.input,
            Direction::Output => self.output,
            Direction::Feature => self.feature,
        }
    }

    fn add(&mut self, direction: Direction, bits: usize) {
        let total = match direction {
            Direction::Input => &mut self.input,
            Direction::Output => &mut self.output,
            Direction::Feature => &mut self.feature,
        };
        *total = total.saturating_add(bits);
    }
}

/// The report sizes for the report without report ID and for
/// each report ID seen in the report descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportBookkeeping {
    /// Bits for the report-id less report
    unnumbered: ReportBits,
    /// Bits for report with report-id
    numbered: BTreeMap<ReportId, ReportBits>,
}

impl ReportBookkeeping {
    pub fn new() -> Self {
        ReportBookkeeping::default()
    }

    /// Register the given report ID. A report ID already seen keeps
    /// its current counts.
    pub fn register(&mut self, report_id: ReportId) {
        self.numbered
            .entry(report_id)
            .or_insert_with(ReportBits::numbered);
    }

    /// Add the bits for a data item with the given globals.
    pub fn add(&mut self, direction: Direction, globals: &Globals) {
        let bits = globals.bits();
        let report = match globals.report_id {
            Some(id) => self.numbered.entry(id).or_insert_with(ReportBits::numbered),
            None => &mut self.unnumbered,
        };
        report.add(direction, bits);
    }

    /// The bits of the report without a report ID
    pub fn unnumbered(&self) -> &ReportBits {
        &self.unnumbered
    }

    /// The bits of the report with the given ID, if that ID was seen.
    pub fn report(&self, report_id: ReportId) -> Option<&ReportBits> {
        self.numbered.get(&report_id)
    }

    /// All report IDs seen, in ascending order.
    pub fn report_ids(&self) -> impl Iterator<Item = &ReportId> {
        self.numbered.keys()
    }
}

/// Walk the given items, tracking the global state, and sum up the
/// report sizes per report ID.
///
/// Fails with [ParserError::UnbalancedGlobalPushPop] on a Pop item
/// without a preceding Push.
pub fn collect_reports(items: &[ReportDescriptorItem]) -> crate::Result<ReportBookkeeping> {
    let mut stack = GlobalStack::new();
    let mut reports = ReportBookkeeping::new();

    for rdesc_item in items {
        match rdesc_item.item() {
            ItemType::Global(GlobalItem::Push) => stack.push(),
            ItemType::Global(GlobalItem::Pop) => {
                stack
                    .pop()
                    .ok_or(ParserError::UnbalancedGlobalPushPop {
                        offset: rdesc_item.offset(),
                    })?;
            }
            ItemType::Global(item) => {
                stack.update(item);
                if let GlobalItem::ReportId(id) = item {
                    reports.register(*id);
                }
            }
            ItemType::Main(MainItem::Input(_)) => reports.add(Direction::Input, stack.globals()),
            ItemType::Main(MainItem::Output(_)) => reports.add(Direction::Output, stack.globals()),
            ItemType::Main(MainItem::Feature(_)) => {
                reports.add(Direction::Feature, stack.globals())
            }
            ItemType::Main(_) | ItemType::Local(_) => {}
        }
    }

    Ok(reports)
}
