// SPDX-License-Identifier: MIT

//! Items of a HID Report Descriptor.
//!
//! A report descriptor is a flat sequence of items. This module decodes the
//! byte framing of a single item ([RawItem]), interprets a raw item as one of
//! the known Main, Global or Local items ([ItemType]) and splits a whole
//! descriptor into its items ([ReportDescriptorItems]).
//!
//! In this document and unless stated otherwise, a reference to "Section a.b.c" refers to the
//! [HID Device Class Definition for HID 1.11](https://www.usb.org/document-library/device-class-definition-hid-111).
//!
//! # Splitting a report descriptor into items
//!
//! ```
//! # use hidrdesc::hid::*;
//! # fn dump(bytes: &[u8]) -> Result<(), hidrdesc::ParserError> {
//! let items = ReportDescriptorItems::try_from(bytes)?;
//! for item in items.iter() {
//!     if let ItemType::Main(MainItem::Collection(c)) = item.item() {
//!         println!("{c:?} collection at offset {}", item.offset());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Writing a report descriptor
//!
//! ```
//! # use hidrdesc::hid::*;
//! # use hidrdesc::types::*;
//! let bytes = ReportDescriptorBuilder::new()
//!     .append(UsagePage(0x0c).into())
//!     .append(UsageId(0x01).into())
//!     .open_collection(CollectionItem::Application)
//!     .append(LogicalMinimum(0).into())
//!     .append(LogicalMaximum(1).into())
//!     .append(UsageId(0xe9).into())
//!     .append(UsageId(0xea).into())
//!     .append(ReportSize(1).into())
//!     .append(ReportCount(2).into())
//!     .input(DataItemBuilder::new().variable().input())
//!     .close_collection()
//!     .build();
//! assert_eq!(bytes.len(), 21);
//! ```
//!
//! The [ReportDescriptorBuilder] writes whatever it is given, run the result
//! through [crate::validate] to find structural problems.

use crate::types::*;
use crate::{ensure, ParserError};

use thiserror::Error;

/// Header byte of a Long Item, see Section 6.2.2.3.
pub const LONG_ITEM_HEADER: u8 = 0xFE;

const MAIN: u8 = 0b00;
const GLOBAL: u8 = 0b01;
const LOCAL: u8 = 0b10;

/// The header byte of a short item without the size bits.
fn prefix(item_type: u8, tag: u8) -> u8 {
    (tag << 4) | (item_type << 2)
}

fn bit(bits: u16, bit: u8) -> bool {
    bits & (1 << bit) != 0
}

/// The value in little endian using 1, 2 or 4 bytes, whichever is the
/// shortest to represent it.
fn unsigned_bytes(value: u32) -> Vec<u8> {
    let len = match value {
        0..=0xff => 1,
        0x100..=0xffff => 2,
        _ => 4,
    };
    value.to_le_bytes()[..len].to_vec()
}

/// The value in little endian using 1, 2 or 4 bytes, whichever is the
/// shortest that keeps the sign intact.
fn signed_bytes(value: i32) -> Vec<u8> {
    let len = if i8::try_from(value).is_ok() {
        1
    } else if i16::try_from(value).is_ok() {
        2
    } else {
        4
    };
    value.to_le_bytes()[..len].to_vec()
}

fn usize_bytes(value: usize) -> Vec<u8> {
    unsigned_bytes(u32::try_from(value).unwrap_or(u32::MAX))
}

/// A short item with the given prefix and at most 4 data bytes.
fn short_item(prefix: u8, data: Vec<u8>) -> Vec<u8> {
    let size = match data.len() {
        0 => 0b00,
        1 => 0b01,
        2 => 0b10,
        _ => 0b11,
    };
    let mut bytes = Vec::with_capacity(data.len() + 1);
    bytes.push(prefix | size);
    bytes.extend(data);
    bytes
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HidError {
    #[error("Unexpected end of data in item at offset {offset}")]
    UnexpectedEndOfData { offset: usize },
    #[error("Unknown item type or tag: {item}")]
    UnknownTypeOrTag { item: RawItem },
}

type Result<T> = std::result::Result<T, HidError>;

/// One item as framed in the report descriptor, see Section 6.2.2.2
/// (short items, 1 to 5 bytes) and Section 6.2.2.3 (long items, 3 to 258 bytes).
///
/// A [RawItem] knows nothing about what its tag means, use
/// [`ItemType::try_from`](ItemType::try_from) to interpret it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    offset: usize,
    header: u8,
    item_type: u8,
    item_tag: u8,
    byte_count: usize,
    unsigned_value: u32,
    signed_value: i32,
    bytes: Vec<u8>,
}

impl RawItem {
    /// Decode exactly one item from `bytes`, starting at `offset`.
    ///
    /// ```
    /// # use hidrdesc::hid::*;
    /// let bytes = [0x05, 0x01, 0x15, 0x81];
    /// let item = RawItem::decode(&bytes, 2).unwrap();
    /// assert_eq!(item.size(), 2);
    /// assert_eq!(item.item_type(), 1);
    /// assert_eq!(item.tag(), 1);
    /// assert_eq!(item.unsigned_value(), 0x81);
    /// assert_eq!(item.signed_value(), -127);
    /// ```
    pub fn decode(bytes: &[u8], offset: usize) -> Result<RawItem> {
        let eod = HidError::UnexpectedEndOfData { offset };
        ensure!(offset < bytes.len(), eod);

        let header = bytes[offset];
        let item_type = (header >> 2) & 0b11;
        let (item_tag, byte_count, data_start) = if header == LONG_ITEM_HEADER {
            let byte_count = *bytes.get(offset + 1).ok_or_else(|| eod.clone())?;
            let tag = *bytes.get(offset + 2).ok_or_else(|| eod.clone())?;
            (tag, byte_count as usize, offset + 3)
        } else {
            let byte_count = match header & 0b11 {
                0b11 => 4,
                n => n as usize,
            };
            (header >> 4, byte_count, offset + 1)
        };

        let data = bytes
            .get(data_start..data_start + byte_count)
            .ok_or(eod)?;
        let (unsigned_value, signed_value) = decode_value(data);

        Ok(RawItem {
            offset,
            header,
            item_type,
            item_tag,
            byte_count,
            unsigned_value,
            signed_value,
            bytes: data.to_owned(),
        })
    }

    /// Offset of the header byte in the report descriptor
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The first byte of the item. For a long item this is
    /// always [LONG_ITEM_HEADER].
    pub fn header(&self) -> u8 {
        self.header
    }

    /// 0 (Main), 1 (Global), 2 (Local) or 3 (Reserved). Long items are
    /// always type 3.
    pub fn item_type(&self) -> u8 {
        self.item_type
    }

    /// The 4-bit tag of a short item or the 8-bit tag of a long item.
    pub fn tag(&self) -> u8 {
        self.item_tag
    }

    pub fn is_long_item(&self) -> bool {
        self.header == LONG_ITEM_HEADER
    }

    /// Number of data bytes, excluding header, size and tag bytes.
    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    /// Number of bytes this item occupies in the report descriptor.
    pub fn size(&self) -> usize {
        match self.is_long_item() {
            true => self.byte_count + 3,
            false => self.byte_count + 1,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.bytes
    }

    /// The data bytes as zero-extended little endian value. Zero for
    /// items without data and for long items with more than 4 data bytes.
    pub fn unsigned_value(&self) -> u32 {
        self.unsigned_value
    }

    /// Like [RawItem::unsigned_value] but sign-extended from the most
    /// significant bit of the last data byte.
    pub fn signed_value(&self) -> i32 {
        self.signed_value
    }

    /// The item as found in the report descriptor.
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.header];
        if self.is_long_item() {
            bytes.push(self.byte_count as u8);
            bytes.push(self.item_tag);
        }
        bytes.extend_from_slice(&self.bytes);
        bytes
    }
}

impl std::fmt::Display for RawItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "type {} tag {:#x} with {} data bytes at offset {}",
            self.item_type, self.item_tag, self.byte_count, self.offset
        )
    }
}

/// Returns the (unsigned, signed) value of the given little endian data bytes.
fn decode_value(data: &[u8]) -> (u32, i32) {
    match data.len() {
        n @ 1..=4 => {
            let unsigned = data
                .iter()
                .rev()
                .fold(0u32, |acc, b| (acc << 8) | *b as u32);
            let negative = data.last().is_some_and(|b| b & 0x80 != 0);
            let signed = if negative && n < 4 {
                (unsigned | (u32::MAX << (8 * n))) as i32
            } else {
                unsigned as i32
            };
            (unsigned, signed)
        }
        _ => (0, 0),
    }
}

/// An interpreted item, one of [MainItem], [GlobalItem], or [LocalItem].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Main(MainItem),
    Global(GlobalItem),
    Local(LocalItem),
}

impl ItemType {
    /// Interpret the given [RawItem]. Returns `None` if the item type or
    /// tag is unknown, this includes every long item.
    pub fn from_raw(item: &RawItem) -> Option<ItemType> {
        match item.item_type() {
            MAIN => MainItem::from_raw(item).map(ItemType::Main),
            GLOBAL => GlobalItem::from_raw(item).map(ItemType::Global),
            LOCAL => LocalItem::from_raw(item).map(ItemType::Local),
            _ => None,
        }
    }

    /// Encode this item with the fewest data bytes possible.
    ///
    /// ```
    /// # use hidrdesc::hid::*;
    /// # use hidrdesc::types::*;
    /// let item = ItemType::from(LogicalMaximum(-200));
    /// let bytes = item.as_bytes();
    /// // Logical Maximum with two data bytes
    /// assert_eq!(bytes, [0x26, 0x38, 0xff]);
    ///
    /// let raw = RawItem::decode(&bytes, 0).unwrap();
    /// assert_eq!(ItemType::try_from(&raw).unwrap(), item);
    /// ```
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            ItemType::Main(item) => item.as_bytes(),
            ItemType::Global(item) => item.as_bytes(),
            ItemType::Local(item) => item.as_bytes(),
        }
    }
}

impl TryFrom<&RawItem> for ItemType {
    type Error = HidError;

    fn try_from(item: &RawItem) -> Result<ItemType> {
        ItemType::from_raw(item).ok_or_else(|| HidError::UnknownTypeOrTag { item: item.clone() })
    }
}

#[cfg(feature = "hut")]
impl From<&hut::UsagePage> for UsagePage {
    fn from(hut: &hut::UsagePage) -> UsagePage {
        UsagePage(hut::AsUsagePage::usage_page_value(hut))
    }
}

#[cfg(feature = "hut")]
impl From<hut::UsagePage> for ItemType {
    fn from(hut: hut::UsagePage) -> ItemType {
        GlobalItem::UsagePage(UsagePage::from(&hut)).into()
    }
}

/// A full usage including its Usage Page, encoded with 4 data bytes.
#[cfg(feature = "hut")]
impl From<&hut::Usage> for ItemType {
    fn from(hut: &hut::Usage) -> ItemType {
        let usage = hut::AsUsage::usage_value(hut);
        LocalItem::Usage(UsagePage((usage >> 16) as u16), UsageId(usage as u16)).into()
    }
}

#[cfg(feature = "hut")]
impl From<hut::Usage> for ItemType {
    fn from(hut: hut::Usage) -> ItemType {
        ItemType::from(&hut)
    }
}

impl From<MainItem> for ItemType {
    fn from(item: MainItem) -> ItemType {
        ItemType::Main(item)
    }
}

impl From<GlobalItem> for ItemType {
    fn from(item: GlobalItem) -> ItemType {
        ItemType::Global(item)
    }
}

impl From<LocalItem> for ItemType {
    fn from(item: LocalItem) -> ItemType {
        ItemType::Local(item)
    }
}

/// Implements `From<$from> for ItemType` via `$wrapper::$variant`.
macro_rules! impl_into_itemtype {
    ($from:ty, $wrapper:ident, $variant:ident) => {
        impl From<$from> for ItemType {
            fn from(value: $from) -> ItemType {
                $wrapper::$variant(value).into()
            }
        }
    };
}

impl_into_itemtype!(InputItem, MainItem, Input);
impl_into_itemtype!(OutputItem, MainItem, Output);
impl_into_itemtype!(FeatureItem, MainItem, Feature);
impl_into_itemtype!(CollectionItem, MainItem, Collection);
impl_into_itemtype!(UsagePage, GlobalItem, UsagePage);
impl_into_itemtype!(LogicalMinimum, GlobalItem, LogicalMinimum);
impl_into_itemtype!(LogicalMaximum, GlobalItem, LogicalMaximum);
impl_into_itemtype!(PhysicalMinimum, GlobalItem, PhysicalMinimum);
impl_into_itemtype!(PhysicalMaximum, GlobalItem, PhysicalMaximum);
impl_into_itemtype!(UnitExponent, GlobalItem, UnitExponent);
impl_into_itemtype!(Unit, GlobalItem, Unit);
impl_into_itemtype!(ReportSize, GlobalItem, ReportSize);
impl_into_itemtype!(ReportId, GlobalItem, ReportId);
impl_into_itemtype!(ReportCount, GlobalItem, ReportCount);
impl_into_itemtype!(UsageId, LocalItem, UsageId);
impl_into_itemtype!(UsageMinimum, LocalItem, UsageMinimum);
impl_into_itemtype!(UsageMaximum, LocalItem, UsageMaximum);
impl_into_itemtype!(DesignatorIndex, LocalItem, DesignatorIndex);
impl_into_itemtype!(DesignatorMinimum, LocalItem, DesignatorMinimum);
impl_into_itemtype!(DesignatorMaximum, LocalItem, DesignatorMaximum);
impl_into_itemtype!(StringIndex, LocalItem, StringIndex);
impl_into_itemtype!(StringMinimum, LocalItem, StringMinimum);
impl_into_itemtype!(StringMaximum, LocalItem, StringMaximum);
impl_into_itemtype!(Delimiter, LocalItem, Delimiter);

impl From<(UsagePage, UsageId)> for ItemType {
    fn from((page, id): (UsagePage, UsageId)) -> ItemType {
        LocalItem::Usage(page, id).into()
    }
}

/// Main Items, see Section 6.2.2.4. Input, Output and Feature items
/// define the fields of a report, Collection and End Collection group them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainItem {
    Input(InputItem),
    Output(OutputItem),
    Feature(FeatureItem),
    Collection(CollectionItem),
    EndCollection,
}

impl MainItem {
    fn from_raw(item: &RawItem) -> Option<MainItem> {
        let data = item.unsigned_value();
        let item = match item.tag() {
            0x8 => MainItem::Input(InputItem::from(data)),
            0x9 => MainItem::Output(OutputItem::from(data)),
            0xA => MainItem::Collection(CollectionItem::from(data)),
            0xB => MainItem::Feature(FeatureItem::from(data)),
            0xC => MainItem::EndCollection,
            _ => return None,
        };
        Some(item)
    }

    pub fn tag(&self) -> u8 {
        match self {
            MainItem::Input(_) => 0x8,
            MainItem::Output(_) => 0x9,
            MainItem::Collection(_) => 0xA,
            MainItem::Feature(_) => 0xB,
            MainItem::EndCollection => 0xC,
        }
    }

    /// Returns the [MainDataItem] if this is an Input, Output or Feature item.
    pub fn data_item(&self) -> Option<&dyn MainDataItem> {
        match self {
            MainItem::Input(i) => Some(i),
            MainItem::Output(o) => Some(o),
            MainItem::Feature(f) => Some(f),
            MainItem::Collection(_) | MainItem::EndCollection => None,
        }
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let header = prefix(MAIN, self.tag());
        match self {
            MainItem::Input(item) => data_item_bytes(header, item.flags()),
            MainItem::Output(item) => data_item_bytes(header, item.flags()),
            MainItem::Feature(item) => data_item_bytes(header, item.flags()),
            MainItem::Collection(item) => short_item(header, unsigned_bytes(u32::from(item))),
            MainItem::EndCollection => short_item(header, vec![]),
        }
    }
}

/// Encode the flags of a data item, using a second byte only if
/// bit 8 (buffered bytes) is set.
fn data_item_bytes(prefix: u8, flags: u16) -> Vec<u8> {
    let [lo, hi] = flags.to_le_bytes();
    match hi {
        0 => short_item(prefix, vec![lo]),
        _ => short_item(prefix, vec![lo, hi]),
    }
}

/// The flags shared by Input, Output and Feature items, see Section 6.2.2.5.
///
/// Each flag is one bit, the default (unset) state is the first one named
/// in the HID specification, e.g. Data rather than Constant. Both states
/// have an accessor.
pub trait MainDataItem {
    /// The flag bits 0 to 8 as found in the item.
    fn flags(&self) -> u16;

    /// A constant field is usually padding and can be ignored.
    fn is_constant(&self) -> bool {
        bit(self.flags(), 0)
    }

    fn is_data(&self) -> bool {
        !self.is_constant()
    }

    /// Each control has its own field. Otherwise the field is an array
    /// of the usages of the currently active controls.
    fn is_variable(&self) -> bool {
        bit(self.flags(), 1)
    }

    fn is_array(&self) -> bool {
        !self.is_variable()
    }

    /// Values are relative to the previous report.
    fn is_relative(&self) -> bool {
        bit(self.flags(), 2)
    }

    fn is_absolute(&self) -> bool {
        !self.is_relative()
    }

    /// Values roll over from the logical maximum to the logical minimum.
    fn wraps(&self) -> bool {
        bit(self.flags(), 3)
    }

    fn does_not_wrap(&self) -> bool {
        !self.wraps()
    }

    fn is_nonlinear(&self) -> bool {
        bit(self.flags(), 4)
    }

    fn is_linear(&self) -> bool {
        !self.is_nonlinear()
    }

    /// The control does not return to a rest position when released.
    fn has_no_preferred_state(&self) -> bool {
        bit(self.flags(), 5)
    }

    fn has_preferred_state(&self) -> bool {
        !self.has_no_preferred_state()
    }

    /// A value outside the logical range means "no data".
    fn has_null_state(&self) -> bool {
        bit(self.flags(), 6)
    }

    fn has_no_null_state(&self) -> bool {
        !self.has_null_state()
    }

    /// The field is a stream of bytes rather than a set of bits.
    fn is_buffered_bytes(&self) -> bool {
        bit(self.flags(), 8)
    }

    fn is_bitfield(&self) -> bool {
        !self.is_buffered_bytes()
    }
}

/// Bits 0-8 of a data item are defined, bit 7 only for Output and Feature.
const DATA_FLAGS: u32 = 0x1ff;
const VOLATILE: u16 = 1 << 7;

/// Defines a data item type storing the flag bits kept by `$mask`.
macro_rules! data_item {
    ($(#[$doc:meta])* $name:ident, $mask:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name {
            flags: u16,
        }

        impl From<u32> for $name {
            fn from(data: u32) -> $name {
                $name {
                    flags: (data & DATA_FLAGS) as u16 & $mask,
                }
            }
        }

        impl MainDataItem for $name {
            fn flags(&self) -> u16 {
                self.flags
            }
        }
    };
}

data_item!(
    /// An Input item, data sent from the device to the host.
    ///
    /// Bit 7 is reserved for Input items and always reads as unset.
    InputItem,
    !VOLATILE
);
data_item!(
    /// An Output item, data sent from the host to the device.
    OutputItem,
    u16::MAX
);
data_item!(
    /// A Feature item, configuration data exchanged in either direction.
    FeatureItem,
    u16::MAX
);

impl OutputItem {
    /// The value may change without the host writing it.
    pub fn is_volatile(&self) -> bool {
        bit(self.flags, 7)
    }

    pub fn is_nonvolatile(&self) -> bool {
        !self.is_volatile()
    }
}

impl FeatureItem {
    /// The value may change without the host writing it.
    pub fn is_volatile(&self) -> bool {
        bit(self.flags, 7)
    }

    pub fn is_nonvolatile(&self) -> bool {
        !self.is_volatile()
    }
}

/// Generates a setter for the given flag bit and a setter clearing it.
macro_rules! impl_builder_flag {
    ($(#[$set_doc:meta])* $set:ident, $clear:ident, $bit:expr) => {
        $(#[$set_doc])*
        pub fn $set(mut self) -> Self {
            self.flags |= 1 << $bit;
            self
        }

        pub fn $clear(mut self) -> Self {
            self.flags &= !(1 << $bit);
            self
        }
    };
}

/// Builds the flags of an [InputItem], [OutputItem] or [FeatureItem].
/// All flags start unset, i.e. Data, Array, Absolute, etc.
///
/// ```
/// # use hidrdesc::hid::*;
/// let buttons: InputItem = DataItemBuilder::new().variable().input();
/// assert!(buttons.is_variable() && buttons.is_data());
///
/// let padding: OutputItem = DataItemBuilder::new().constant().output();
/// assert!(padding.is_constant() && padding.is_array());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DataItemBuilder {
    flags: u16,
}

impl DataItemBuilder {
    pub fn new() -> DataItemBuilder {
        DataItemBuilder::default()
    }

    impl_builder_flag!(constant, data, 0);
    impl_builder_flag!(variable, array, 1);
    impl_builder_flag!(relative, absolute, 2);
    impl_builder_flag!(wrap, nowrap, 3);
    impl_builder_flag!(nonlinear, linear, 4);
    impl_builder_flag!(no_preferred_state, preferred_state, 5);
    impl_builder_flag!(null, no_null, 6);
    impl_builder_flag!(
        /// Ignored by [DataItemBuilder::input].
        volatile,
        non_volatile,
        7
    );
    impl_builder_flag!(buffered_bytes, bitfield, 8);

    pub fn input(self) -> InputItem {
        InputItem::from(self.flags as u32)
    }

    pub fn output(self) -> OutputItem {
        OutputItem::from(self.flags as u32)
    }

    pub fn feature(self) -> FeatureItem {
        FeatureItem::from(self.flags as u32)
    }
}

/// The type of a Collection item, see Section 6.2.2.6.
///
/// Values up to 0x06 are named, 0x07 to 0x7F are reserved and everything
/// from 0x80 upwards is vendor defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionItem {
    Physical,
    Application,
    Logical,
    Report,
    NamedArray,
    UsageSwitch,
    UsageModifier,
    Reserved { value: u8 },
    VendorDefined { value: u32 },
}

impl From<&CollectionItem> for u32 {
    fn from(c: &CollectionItem) -> u32 {
        match c {
            CollectionItem::Physical => 0x00,
            CollectionItem::Application => 0x01,
            CollectionItem::Logical => 0x02,
            CollectionItem::Report => 0x03,
            CollectionItem::NamedArray => 0x04,
            CollectionItem::UsageSwitch => 0x05,
            CollectionItem::UsageModifier => 0x06,
            CollectionItem::Reserved { value } => *value as u32,
            CollectionItem::VendorDefined { value } => *value,
        }
    }
}

impl From<u32> for CollectionItem {
    fn from(v: u32) -> CollectionItem {
        match v {
            0x00 => CollectionItem::Physical,
            0x01 => CollectionItem::Application,
            0x02 => CollectionItem::Logical,
            0x03 => CollectionItem::Report,
            0x04 => CollectionItem::NamedArray,
            0x05 => CollectionItem::UsageSwitch,
            0x06 => CollectionItem::UsageModifier,
            value @ 0x07..=0x7f => CollectionItem::Reserved { value: value as u8 },
            value => CollectionItem::VendorDefined { value },
        }
    }
}

/// Global items, see Section 6.2.2.7. A global item stays in effect for all
/// following Main items until it is replaced or restored by a Pop.
///
/// Minimum, maximum and exponent values are taken from the sign-extended item
/// value, all others from the zero-extended item value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalItem {
    UsagePage(UsagePage),
    LogicalMinimum(LogicalMinimum),
    LogicalMaximum(LogicalMaximum),
    PhysicalMinimum(PhysicalMinimum),
    PhysicalMaximum(PhysicalMaximum),
    UnitExponent(UnitExponent),
    Unit(Unit),
    ReportSize(ReportSize),
    ReportId(ReportId),
    ReportCount(ReportCount),
    Push,
    Pop,
}

impl GlobalItem {
    fn from_raw(item: &RawItem) -> Option<GlobalItem> {
        let unsigned = item.unsigned_value();
        let signed = item.signed_value();
        let item = match item.tag() {
            0x0 => GlobalItem::UsagePage(UsagePage(unsigned as u16)),
            0x1 => GlobalItem::LogicalMinimum(LogicalMinimum(signed)),
            0x2 => GlobalItem::LogicalMaximum(LogicalMaximum(signed)),
            0x3 => GlobalItem::PhysicalMinimum(PhysicalMinimum(signed)),
            0x4 => GlobalItem::PhysicalMaximum(PhysicalMaximum(signed)),
            0x5 => GlobalItem::UnitExponent(UnitExponent(signed)),
            0x6 => GlobalItem::Unit(Unit(unsigned)),
            0x7 => GlobalItem::ReportSize(ReportSize(unsigned as usize)),
            0x8 => GlobalItem::ReportId(ReportId(unsigned as u8)),
            0x9 => GlobalItem::ReportCount(ReportCount(unsigned as usize)),
            0xA => GlobalItem::Push,
            0xB => GlobalItem::Pop,
            _ => return None,
        };
        Some(item)
    }

    pub fn tag(&self) -> u8 {
        match self {
            GlobalItem::UsagePage(_) => 0x0,
            GlobalItem::LogicalMinimum(_) => 0x1,
            GlobalItem::LogicalMaximum(_) => 0x2,
            GlobalItem::PhysicalMinimum(_) => 0x3,
            GlobalItem::PhysicalMaximum(_) => 0x4,
            GlobalItem::UnitExponent(_) => 0x5,
            GlobalItem::Unit(_) => 0x6,
            GlobalItem::ReportSize(_) => 0x7,
            GlobalItem::ReportId(_) => 0x8,
            GlobalItem::ReportCount(_) => 0x9,
            GlobalItem::Push => 0xA,
            GlobalItem::Pop => 0xB,
        }
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let data = match self {
            GlobalItem::UsagePage(page) => unsigned_bytes(u16::from(page).into()),
            GlobalItem::LogicalMinimum(v) => signed_bytes(i32::from(v)),
            GlobalItem::LogicalMaximum(v) => signed_bytes(i32::from(v)),
            GlobalItem::PhysicalMinimum(v) => signed_bytes(i32::from(v)),
            GlobalItem::PhysicalMaximum(v) => signed_bytes(i32::from(v)),
            GlobalItem::UnitExponent(v) => signed_bytes(i32::from(v)),
            GlobalItem::Unit(unit) => unsigned_bytes(u32::from(unit)),
            GlobalItem::ReportSize(size) => usize_bytes(usize::from(size)),
            GlobalItem::ReportId(id) => vec![u8::from(id)],
            GlobalItem::ReportCount(count) => usize_bytes(usize::from(count)),
            GlobalItem::Push | GlobalItem::Pop => vec![],
        };
        short_item(prefix(GLOBAL, self.tag()), data)
    }
}

/// Local items, see Section 6.2.2.8. A local item only applies to the
/// next Main item.
///
/// A Usage item with 4 data bytes carries its own Usage Page in the upper
/// 16 bits and is a [LocalItem::Usage]. A Usage item with fewer data bytes
/// is a [LocalItem::UsageId] and relies on the Usage Page global item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalItem {
    Usage(UsagePage, UsageId),
    UsageId(UsageId),
    UsageMinimum(UsageMinimum),
    UsageMaximum(UsageMaximum),
    DesignatorIndex(DesignatorIndex),
    DesignatorMinimum(DesignatorMinimum),
    DesignatorMaximum(DesignatorMaximum),
    StringIndex(StringIndex),
    StringMinimum(StringMinimum),
    StringMaximum(StringMaximum),
    Delimiter(Delimiter),
}

impl LocalItem {
    fn from_raw(item: &RawItem) -> Option<LocalItem> {
        let value = item.unsigned_value();
        let item = match item.tag() {
            0x0 if item.byte_count() == 4 => {
                LocalItem::Usage(UsagePage((value >> 16) as u16), UsageId(value as u16))
            }
            0x0 => LocalItem::UsageId(UsageId(value as u16)),
            0x1 => LocalItem::UsageMinimum(UsageMinimum(value)),
            0x2 => LocalItem::UsageMaximum(UsageMaximum(value)),
            0x3 => LocalItem::DesignatorIndex(DesignatorIndex(value)),
            0x4 => LocalItem::DesignatorMinimum(DesignatorMinimum(value)),
            0x5 => LocalItem::DesignatorMaximum(DesignatorMaximum(value)),
            0x7 => LocalItem::StringIndex(StringIndex(value)),
            0x8 => LocalItem::StringMinimum(StringMinimum(value)),
            0x9 => LocalItem::StringMaximum(StringMaximum(value)),
            0xA => LocalItem::Delimiter(Delimiter(value != 0)),
            _ => return None,
        };
        Some(item)
    }

    pub fn tag(&self) -> u8 {
        match self {
            LocalItem::Usage(..) | LocalItem::UsageId(_) => 0x0,
            LocalItem::UsageMinimum(_) => 0x1,
            LocalItem::UsageMaximum(_) => 0x2,
            LocalItem::DesignatorIndex(_) => 0x3,
            LocalItem::DesignatorMinimum(_) => 0x4,
            LocalItem::DesignatorMaximum(_) => 0x5,
            LocalItem::StringIndex(_) => 0x7,
            LocalItem::StringMinimum(_) => 0x8,
            LocalItem::StringMaximum(_) => 0x9,
            LocalItem::Delimiter(_) => 0xA,
        }
    }

    /// True for both [LocalItem::Usage] and [LocalItem::UsageId]
    pub fn is_usage(&self) -> bool {
        self.tag() == 0x0
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let data = match self {
            LocalItem::Usage(page, id) => {
                let usage = (u32::from(u16::from(page)) << 16) | u32::from(u16::from(id));
                // all 4 bytes or the page is lost
                usage.to_le_bytes().to_vec()
            }
            LocalItem::UsageId(id) => unsigned_bytes(u16::from(id).into()),
            LocalItem::UsageMinimum(v) => unsigned_bytes(u32::from(v)),
            LocalItem::UsageMaximum(v) => unsigned_bytes(u32::from(v)),
            LocalItem::DesignatorIndex(v) => unsigned_bytes(u32::from(v)),
            LocalItem::DesignatorMinimum(v) => unsigned_bytes(u32::from(v)),
            LocalItem::DesignatorMaximum(v) => unsigned_bytes(u32::from(v)),
            LocalItem::StringIndex(v) => unsigned_bytes(u32::from(v)),
            LocalItem::StringMinimum(v) => unsigned_bytes(u32::from(v)),
            LocalItem::StringMaximum(v) => unsigned_bytes(u32::from(v)),
            LocalItem::Delimiter(d) => vec![d.is_open() as u8],
        };
        short_item(prefix(LOCAL, self.tag()), data)
    }
}

/// An interpreted item together with the [RawItem] it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDescriptorItem {
    item: ItemType,
    raw: RawItem,
}

impl ReportDescriptorItem {
    /// Offset of this item in the report descriptor
    pub fn offset(&self) -> usize {
        self.raw.offset()
    }

    pub fn item(&self) -> &ItemType {
        &self.item
    }

    pub fn raw(&self) -> &RawItem {
        &self.raw
    }
}

/// All items of a report descriptor in the order they appear in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDescriptorItems {
    items: Vec<ReportDescriptorItem>,
}

impl ReportDescriptorItems {
    pub fn into_inner(self) -> Vec<ReportDescriptorItem> {
        self.items
    }
}

impl std::ops::Deref for ReportDescriptorItems {
    type Target = [ReportDescriptorItem];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl TryFrom<&[u8]> for ReportDescriptorItems {
    type Error = ParserError;

    /// Split the report descriptor into its items. An unknown item fails with
    /// [ParserError::InvalidItemWhileParsing], carrying the items before it.
    fn try_from(bytes: &[u8]) -> crate::Result<Self> {
        let mut offset = 0;
        let mut items = Vec::new();
        while offset < bytes.len() {
            let raw = RawItem::decode(bytes, offset)?;
            let item = match ItemType::try_from(&raw) {
                Ok(item) => item,
                Err(HidError::UnknownTypeOrTag { item }) => {
                    return Err(ParserError::InvalidItemWhileParsing {
                        item,
                        parsed: items,
                    })
                }
                Err(e) => return Err(e.into()),
            };
            offset += raw.size();
            items.push(ReportDescriptorItem { item, raw });
        }
        Ok(ReportDescriptorItems { items })
    }
}

/// Writes a report descriptor item by item, each with the fewest data
/// bytes possible. Items are written in the order they are appended and
/// nothing is checked or merged.
#[derive(Debug, Default)]
pub struct ReportDescriptorBuilder {
    items: Vec<ItemType>,
}

impl ReportDescriptorBuilder {
    pub fn new() -> ReportDescriptorBuilder {
        ReportDescriptorBuilder::default()
    }

    pub fn append(mut self, item: ItemType) -> Self {
        self.items.push(item);
        self
    }

    /// Append a Usage Page item for the page of the given usage page or usage.
    #[cfg(feature = "hut")]
    pub fn usage_page(self, usage_page: impl hut::AsUsagePage) -> Self {
        let usage_page = UsagePage(usage_page.usage_page_value());
        self.append(usage_page.into())
    }

    /// Append a Usage item with the Usage ID only.
    ///
    /// <div class="warning">
    /// The usage is resolved against the last Usage Page item, which is
    /// not necessarily the page of the given usage.
    /// </div>
    #[cfg(feature = "hut")]
    pub fn usage_id(self, usage: impl hut::AsUsage) -> Self {
        let usage_id = UsageId((usage.usage_value() & 0xffff) as u16);
        self.append(usage_id.into())
    }

    /// Append a Collection item. Every collection needs a matching
    /// [ReportDescriptorBuilder::close_collection].
    pub fn open_collection(self, item: CollectionItem) -> Self {
        self.append(item.into())
    }

    pub fn close_collection(self) -> Self {
        self.append(MainItem::EndCollection.into())
    }

    pub fn push(self) -> Self {
        self.append(GlobalItem::Push.into())
    }

    pub fn pop(self) -> Self {
        self.append(GlobalItem::Pop.into())
    }

    pub fn input(self, item: InputItem) -> Self {
        self.append(item.into())
    }

    pub fn output(self, item: OutputItem) -> Self {
        self.append(item.into())
    }

    pub fn feature(self, item: FeatureItem) -> Self {
        self.append(item.into())
    }

    pub fn build(&self) -> Vec<u8> {
        self.items.iter().flat_map(ItemType::as_bytes).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> RawItem {
        RawItem::decode(bytes, 0).unwrap()
    }

    fn interpret(bytes: &[u8]) -> ItemType {
        ItemType::try_from(&decode(bytes)).unwrap()
    }

    #[test]
    fn item_size() {
        let payload: [u8; 4] = [0x11, 0x22, 0x33, 0x44];
        for (size_bits, nbytes) in [(0u8, 0usize), (1, 1), (2, 2), (3, 4)] {
            // Report Count
            let bytes = [&[0x94 | size_bits][..], &payload[..]].concat();
            let item = decode(&bytes);
            assert_eq!(item.byte_count(), nbytes);
            assert_eq!(item.size(), nbytes + 1);
            assert_eq!(item.data(), &payload[..nbytes]);
            assert_eq!(item.as_bytes(), bytes[..nbytes + 1]);
        }
    }

    #[test]
    fn item_header_fields() {
        let item = decode(&[0b10010111, 0, 0, 0, 0]);
        assert_eq!(item.tag(), 0b1001);
        assert_eq!(item.item_type(), 0b01);
        assert_eq!(item.byte_count(), 4);
        assert!(!item.is_long_item());
    }

    #[test]
    fn zero_length_values() {
        for header in [0x00u8, 0xa4, 0xb4, 0xc0, 0x08] {
            let item = decode(&[header]);
            assert_eq!(item.unsigned_value(), 0);
            assert_eq!(item.signed_value(), 0);
            assert!(item.data().is_empty());
        }
    }

    macro_rules! test_value {
        ($bytes:expr, $unsigned:expr, $signed:expr) => {
            let data: &[u8] = &$bytes;
            let size_bits: u8 = match data.len() {
                1 => 0b01,
                2 => 0b10,
                4 => 0b11,
                n => panic!("Size {n} cannot happen"),
            };
            let bytes = [&[0b00010100 | size_bits][..], data].concat();
            let item = decode(&bytes);
            assert_eq!(item.unsigned_value(), $unsigned);
            assert_eq!(item.signed_value(), $signed);
            // unsigned value re-encodes to the same bytes
            assert_eq!(&item.unsigned_value().to_le_bytes()[..data.len()], data);
        };
    }

    #[test]
    fn item_values() {
        test_value!([0x7F], 0x7F, 127);
        test_value!([0x80], 0x80, -128);
        test_value!([0xFF], 0xFF, -1);
        test_value!([0x00], 0x0, 0);

        test_value!([0xFF, 0x7F], 0x7FFF, 32767);
        test_value!([0x00, 0x80], 0x8000, -32768);
        test_value!([0xFF, 0xFF], 0xFFFF, -1);
        test_value!([0x34, 0x12], 0x1234, 4660);
        test_value!([0xCC, 0xED], 0xEDCC, -4660);
        // high bit of the first byte does not matter
        test_value!([0x80, 0x00], 0x0080, 128);

        test_value!([0x01, 0x02, 0x03, 0x04], 0x04030201, 0x04030201);
        test_value!([0xFF, 0xFF, 0xFF, 0x7F], 0x7FFFFFFF, i32::MAX);
        test_value!([0x00, 0x00, 0x00, 0x80], 0x80000000, i32::MIN);
        test_value!([0xFF, 0xFF, 0xFF, 0xFF], 0xFFFFFFFF, -1);
        test_value!([0x88, 0xA9, 0xCB, 0xED], 0xEDCBA988, -305419896);
    }

    #[test]
    fn sign_follows_last_byte() {
        for nbytes in [1usize, 2, 4] {
            for last in 0..=255u8 {
                let mut data = vec![0x55u8; nbytes];
                data[nbytes - 1] = last;
                let size_bits = if nbytes == 4 { 3 } else { nbytes as u8 };
                let bytes = [&[0b00010100 | size_bits][..], data.as_slice()].concat();
                let item = decode(&bytes);
                assert_eq!(item.signed_value() < 0, last & 0x80 != 0);
            }
        }
    }

    #[test]
    fn long_item() {
        let bytes: [u8; 9] = [0xFE, 0x05, 0xF1, 1, 2, 3, 4, 5, 0x05];
        let item = decode(&bytes);
        assert!(item.is_long_item());
        assert_eq!(item.item_type(), 3);
        assert_eq!(item.tag(), 0xF1);
        assert_eq!(item.byte_count(), 5);
        assert_eq!(item.size(), 8);
        assert_eq!(item.data(), &[1, 2, 3, 4, 5]);
        assert_eq!(item.unsigned_value(), 0);
        assert_eq!(item.as_bytes(), bytes[..8]);
        assert_eq!(ItemType::from_raw(&item), None);

        let item = decode(&[0xFE, 0x02, 0x10, 0x00, 0x80]);
        assert_eq!(item.unsigned_value(), 0x8000);
        assert_eq!(item.signed_value(), -32768);

        let item = decode(&[0xFE, 0x00, 0x10]);
        assert_eq!(item.size(), 3);
    }

    #[test]
    fn truncated_items() {
        let cases: [&[u8]; 5] = [
            &[0x26, 0xff],
            &[0x27, 0x01, 0x02, 0x03],
            &[0xFE],
            &[0xFE, 0x02],
            &[0xFE, 0x02, 0x10, 0x00],
        ];
        for bytes in cases {
            assert_eq!(
                RawItem::decode(bytes, 0),
                Err(HidError::UnexpectedEndOfData { offset: 0 })
            );
        }
        assert_eq!(
            RawItem::decode(&[0x05, 0x01], 2),
            Err(HidError::UnexpectedEndOfData { offset: 2 })
        );
    }

    #[test]
    fn unknown_tags() {
        // Main tags other than 8..=12, Global tags 12..=15, Local tag 6 and 11..=15, Reserved type
        let mut unknown: Vec<u8> = (0u8..8).chain(13..16).map(|t| t << 4).collect();
        unknown.extend((12u8..16).map(|t| (t << 4) | 0b0100));
        unknown.extend([6u8, 11, 12, 13, 14, 15].map(|t| (t << 4) | 0b1000));
        unknown.extend((0u8..16).map(|t| (t << 4) | 0b1100));
        for header in unknown {
            let item = decode(&[header]);
            assert_eq!(ItemType::from_raw(&item), None, "header {header:#x}");
            assert!(matches!(
                ItemType::try_from(&item),
                Err(HidError::UnknownTypeOrTag { item: _ })
            ));
        }
    }

    #[test]
    fn collection_types() {
        let named = [
            CollectionItem::Physical,
            CollectionItem::Application,
            CollectionItem::Logical,
            CollectionItem::Report,
            CollectionItem::NamedArray,
            CollectionItem::UsageSwitch,
            CollectionItem::UsageModifier,
        ];
        for v in 0x00..=0xffu32 {
            let c = CollectionItem::from(v);
            match v {
                0x00..=0x06 => assert_eq!(c, named[v as usize]),
                0x07..=0x7f => assert_eq!(c, CollectionItem::Reserved { value: v as u8 }),
                _ => assert_eq!(c, CollectionItem::VendorDefined { value: v }),
            }
            assert_eq!(u32::from(&c), v);
        }
        for v in [0x100, 0xff00, 0x12345678, u32::MAX] {
            assert_eq!(CollectionItem::from(v), CollectionItem::VendorDefined { value: v });
        }

        // A collection without data is a Physical collection
        assert_eq!(
            interpret(&[0xa0]),
            ItemType::Main(MainItem::Collection(CollectionItem::Physical))
        );
        assert_eq!(
            interpret(&[0xa2, 0x00, 0xff]),
            ItemType::Main(MainItem::Collection(CollectionItem::VendorDefined { value: 0xff00 }))
        );
    }

    #[test]
    fn feature_flags() {
        // Var, Wrap, No Preferred, Volatile, Buffered Bytes
        match interpret(&[0xb2, 0b10101010, 0b1]) {
            ItemType::Main(MainItem::Feature(f)) => {
                assert!(f.is_data());
                assert!(f.is_variable());
                assert!(f.is_absolute());
                assert!(f.wraps());
                assert!(f.is_linear());
                assert!(f.has_no_preferred_state());
                assert!(f.has_no_null_state());
                assert!(f.is_volatile());
                assert!(f.is_buffered_bytes());
                assert_eq!(f.flags(), 0x1aa);
            }
            item => panic!("Unexpected item {item:?}"),
        }
    }

    #[test]
    fn data_item_bits() {
        type Getter = fn(&dyn MainDataItem) -> bool;
        let getters: [(u8, Getter); 8] = [
            (0, |i| i.is_constant()),
            (1, |i| i.is_variable()),
            (2, |i| i.is_relative()),
            (3, |i| i.wraps()),
            (4, |i| i.is_nonlinear()),
            (5, |i| i.has_no_preferred_state()),
            (6, |i| i.has_null_state()),
            (8, |i| i.is_buffered_bytes()),
        ];
        for header in [0x82u8, 0x92, 0xb2] {
            for (bit, _) in getters.iter() {
                let flags = 1u16 << bit;
                let bytes = [&[header][..], &flags.to_le_bytes()[..]].concat();
                let item = match interpret(&bytes) {
                    ItemType::Main(m) => m,
                    item => panic!("Not a main item: {item:?}"),
                };
                let data_item = item.data_item().unwrap();
                for (other, getter) in getters.iter() {
                    assert_eq!(getter(data_item), other == bit, "bit {other} for {item:?}");
                }
                let volatile = match item {
                    MainItem::Input(_) => false,
                    MainItem::Output(o) => o.is_volatile(),
                    MainItem::Feature(f) => f.is_volatile(),
                    _ => panic!("Not a data item"),
                };
                assert!(!volatile);
            }
        }

        // bit 7 is volatile for Output and Feature, reserved for Input
        assert_eq!(InputItem::from(1 << 7), InputItem::default());
        assert!(OutputItem::from(1 << 7).is_volatile());
        assert!(FeatureItem::from(1 << 7).is_volatile());
        assert!(OutputItem::from(!(1 << 7)).is_nonvolatile());
        // bits above 8 are ignored
        assert_eq!(OutputItem::from(0xfe00), OutputItem::default());
    }

    #[test]
    fn data_item_encoding() {
        let item = DataItemBuilder::new().constant().variable().input();
        assert_eq!(item.flags(), 0b11);
        assert_eq!(ItemType::from(item).as_bytes(), [0x81, 0x03]);
        let item = DataItemBuilder::new().variable().volatile().output();
        assert_eq!(ItemType::from(item).as_bytes(), [0x91, 0x82]);
        let item = DataItemBuilder::new().buffered_bytes().feature();
        assert_eq!(ItemType::from(item).as_bytes(), [0xb2, 0x00, 0x01]);
        // volatile is dropped for inputs
        let item = DataItemBuilder::new().volatile().input();
        assert_eq!(ItemType::from(item).as_bytes(), [0x81, 0x00]);
        // clearing a flag
        let item = DataItemBuilder::new().relative().absolute().null().input();
        assert!(item.is_absolute() && item.has_null_state());
    }

    #[test]
    fn global_items() {
        let cases: [(&[u8], GlobalItem); 14] = [
            (&[0x05, 0x0d], GlobalItem::UsagePage(UsagePage(0x0d))),
            (&[0x06, 0x00, 0xff], GlobalItem::UsagePage(UsagePage(0xff00))),
            (&[0x15, 0x81], GlobalItem::LogicalMinimum(LogicalMinimum(-127))),
            (&[0x26, 0xff, 0x00], GlobalItem::LogicalMaximum(LogicalMaximum(255))),
            (&[0x25, 0xff], GlobalItem::LogicalMaximum(LogicalMaximum(-1))),
            (&[0x35, 0x00], GlobalItem::PhysicalMinimum(PhysicalMinimum(0))),
            (&[0x46, 0x3a, 0x20], GlobalItem::PhysicalMaximum(PhysicalMaximum(8250))),
            (&[0x55, 0x0d], GlobalItem::UnitExponent(UnitExponent(0x0d))),
            (&[0x65, 0x13], GlobalItem::Unit(Unit(0x13))),
            (&[0x75, 0x08], GlobalItem::ReportSize(ReportSize(8))),
            (&[0x85, 0x02], GlobalItem::ReportId(ReportId(2))),
            (&[0x96, 0x00, 0x01], GlobalItem::ReportCount(ReportCount(256))),
            (&[0xa4], GlobalItem::Push),
            (&[0xb4], GlobalItem::Pop),
        ];
        for (bytes, expected) in cases {
            assert_eq!(interpret(bytes), ItemType::Global(expected));
        }
    }

    #[test]
    fn local_items() {
        let cases: [(&[u8], LocalItem); 13] = [
            (&[0x09, 0x30], LocalItem::UsageId(UsageId(0x30))),
            (&[0x0a, 0xc0, 0x02], LocalItem::UsageId(UsageId(0x2c0))),
            (
                &[0x0b, 0x30, 0x00, 0x01, 0x00],
                LocalItem::Usage(UsagePage(0x01), UsageId(0x30)),
            ),
            (&[0x19, 0x01], LocalItem::UsageMinimum(UsageMinimum(1))),
            (&[0x2a, 0xff, 0x00], LocalItem::UsageMaximum(UsageMaximum(255))),
            (&[0x39, 0x02], LocalItem::DesignatorIndex(DesignatorIndex(2))),
            (&[0x49, 0x03], LocalItem::DesignatorMinimum(DesignatorMinimum(3))),
            (&[0x59, 0x04], LocalItem::DesignatorMaximum(DesignatorMaximum(4))),
            (&[0x79, 0x05], LocalItem::StringIndex(StringIndex(5))),
            (&[0x89, 0x06], LocalItem::StringMinimum(StringMinimum(6))),
            (&[0x99, 0x07], LocalItem::StringMaximum(StringMaximum(7))),
            (&[0xa9, 0x01], LocalItem::Delimiter(Delimiter(true))),
            (&[0xa8], LocalItem::Delimiter(Delimiter(false))),
        ];
        for (bytes, expected) in cases {
            assert_eq!(interpret(bytes), ItemType::Local(expected));
            assert_eq!(expected.is_usage(), bytes[0] & 0xfc == 0x08);
        }
    }

    #[test]
    fn item_encoding() {
        let items: [ItemType; 11] = [
            UsagePage(0xff00).into(),
            LogicalMinimum(-1).into(),
            LogicalMaximum(-32768).into(),
            LogicalMaximum(i32::MAX).into(),
            Unit(0xE011).into(),
            ReportCount(70000).into(),
            (UsagePage(0x01), UsageId(0x30)).into(),
            (UsagePage(0x00), UsageId(0x01)).into(),
            UsageMaximum(0x10000).into(),
            CollectionItem::VendorDefined { value: 0x1ff }.into(),
            GlobalItem::Pop.into(),
        ];
        for item in items {
            let bytes = item.as_bytes();
            let raw = decode(&bytes);
            assert_eq!(raw.size(), bytes.len());
            assert_eq!(ItemType::try_from(&raw).unwrap(), item);
        }
        assert_eq!(ItemType::from(LogicalMinimum(-1)).as_bytes(), [0x15, 0xff]);
        assert_eq!(ItemType::from(ReportSize(8)).as_bytes(), [0x75, 0x08]);
        assert_eq!(ItemType::from(MainItem::EndCollection).as_bytes(), [0xc0]);
        assert_eq!(ItemType::from(Delimiter(true)).as_bytes(), [0xa9, 0x01]);
    }

    #[test]
    fn itemize_offsets() {
        let bytes: [u8; 9] = [0x05, 0x01, 0xa4, 0x27, 0x01, 0x00, 0x00, 0x00, 0xb4];
        let items = ReportDescriptorItems::try_from(bytes.as_slice()).unwrap();
        let offsets: Vec<usize> = items.iter().map(|i| i.offset()).collect();
        assert_eq!(offsets, [0, 2, 3, 8]);
        assert_eq!(items[2].raw().byte_count(), 4);
        assert_eq!(items.into_inner().len(), 4);
    }

    #[test]
    fn itemize_truncated() {
        // header declares 2 bytes, only 1 present
        let err = ReportDescriptorItems::try_from([0x26u8, 0xff].as_slice()).unwrap_err();
        assert_eq!(err, ParserError::UnexpectedEndOfData { offset: 0 });

        let err = ReportDescriptorItems::try_from([0x05u8, 0x01, 0x26, 0xff].as_slice()).unwrap_err();
        assert_eq!(err, ParserError::UnexpectedEndOfData { offset: 2 });
    }

    #[test]
    fn itemize_unknown_item() {
        let bytes: [u8; 6] = [0x05, 0x01, 0x09, 0x02, 0xd0, 0xc0];
        let err = ReportDescriptorItems::try_from(bytes.as_slice()).unwrap_err();
        match err {
            ParserError::InvalidItemWhileParsing { item, parsed } => {
                assert_eq!(item.offset(), 4);
                assert_eq!(item.header(), 0xd0);
                assert_eq!(parsed.len(), 2);
                assert_eq!(
                    parsed[1].item(),
                    &ItemType::Local(LocalItem::UsageId(UsageId(0x02)))
                );
            }
            e => panic!("Unexpected error {e}"),
        }
    }

    #[test]
    fn builder_joystick() {
        let rdesc: Vec<u8> = ReportDescriptorBuilder::new()
            .append(UsagePage(0x01).into())
            .append(UsageId(0x04).into())
            .open_collection(CollectionItem::Application)
            .append(ReportId(3).into())
            .push()
            .append(UsagePage(0x09).into())
            .append(UsageMinimum(1).into())
            .append(UsageMaximum(8).into())
            .append(LogicalMinimum(0).into())
            .append(LogicalMaximum(1).into())
            .append(ReportSize(1).into())
            .append(ReportCount(8).into())
            .input(DataItemBuilder::new().variable().input())
            .pop()
            .append(UsageId(0x39).into())
            .append(LogicalMinimum(0).into())
            .append(LogicalMaximum(7).into())
            .append(PhysicalMinimum(0).into())
            .append(PhysicalMaximum(315).into())
            .append(Unit(0x14).into())
            .append(ReportSize(4).into())
            .append(ReportCount(1).into())
            .input(DataItemBuilder::new().variable().null().input())
            .input(DataItemBuilder::new().constant().input())
            .close_collection()
            .build();

        #[rustfmt::skip]
        let expected: [u8; 48] = [
            0x05, 0x01,        // Usage Page (Generic Desktop)
            0x09, 0x04,        // Usage (Joystick)
            0xa1, 0x01,        // Collection (Application)
            0x85, 0x03,        //   Report ID (3)
            0xa4,              //   Push
            0x05, 0x09,        //     Usage Page (Button)
            0x19, 0x01,        //     Usage Minimum (1)
            0x29, 0x08,        //     Usage Maximum (8)
            0x15, 0x00,        //     Logical Minimum (0)
            0x25, 0x01,        //     Logical Maximum (1)
            0x75, 0x01,        //     Report Size (1)
            0x95, 0x08,        //     Report Count (8)
            0x81, 0x02,        //     Input (Data,Var,Abs)
            0xb4,              //   Pop
            0x09, 0x39,        //   Usage (Hat switch)
            0x15, 0x00,        //   Logical Minimum (0)
            0x25, 0x07,        //   Logical Maximum (7)
            0x35, 0x00,        //   Physical Minimum (0)
            0x46, 0x3b, 0x01,  //   Physical Maximum (315)
            0x65, 0x14,        //   Unit (Degrees)
            0x75, 0x04,        //   Report Size (4)
            0x95, 0x01,        //   Report Count (1)
            0x81, 0x42,        //   Input (Data,Var,Abs,Null)
            0x81, 0x01,        //   Input (Cnst)
            0xc0,              // End Collection
        ];
        assert_eq!(rdesc, expected);

        let items = ReportDescriptorItems::try_from(rdesc.as_slice()).unwrap();
        assert_eq!(crate::validate::validate(&items), vec![]);
        let reports = crate::stack::collect_reports(&items).unwrap();
        assert_eq!(reports.report(ReportId(3)).unwrap().input, 8 + 8 + 4 + 4);
    }

    #[cfg(feature = "hut")]
    #[test]
    fn builder_hut() {
        use hut::AsUsage;

        let rdesc: Vec<u8> = ReportDescriptorBuilder::new()
            .usage_page(hut::UsagePage::Consumer)
            .usage_id(hut::Consumer::ConsumerControl)
            .open_collection(CollectionItem::Application)
            .append(LogicalMinimum(0).into())
            .append(LogicalMaximum(0x3ff).into())
            .append(UsageMinimum(0).into())
            .append(UsageMaximum(0x3ff).into())
            .append(ReportSize(16).into())
            .append(ReportCount(1).into())
            .input(DataItemBuilder::new().input())
            .close_collection()
            .append(hut::UsagePage::GenericDesktop.into())
            .build();

        #[rustfmt::skip]
        let expected: [u8; 25] = [
            0x05, 0x0c,        // Usage Page (Consumer)
            0x09, 0x01,        // Usage (Consumer Control)
            0xa1, 0x01,        // Collection (Application)
            0x15, 0x00,        //   Logical Minimum (0)
            0x26, 0xff, 0x03,  //   Logical Maximum (1023)
            0x19, 0x00,        //   Usage Minimum (0)
            0x2a, 0xff, 0x03,  //   Usage Maximum (1023)
            0x75, 0x10,        //   Report Size (16)
            0x95, 0x01,        //   Report Count (1)
            0x81, 0x00,        //   Input (Data,Arr,Abs)
            0xc0,              // End Collection
            0x05, 0x01,        // Usage Page (Generic Desktop)
        ];
        assert_eq!(rdesc, expected);

        // A full usage includes its usage page
        let item = ItemType::from(hut::GenericDesktop::X.usage());
        assert_eq!(item.as_bytes(), [0x0b, 0x30, 0x00, 0x01, 0x00]);
    }
}
