// SPDX-License-Identifier: MIT

//! Typed values of the Global and Local items. Each one wraps the number
//! decoded from its item, a few add accessors for the packed fields.
//!
//! In this document and unless stated otherwise, a reference to "Section a.b.c" refers to the
//! [HID Device Class Definition for HID 1.11](https://www.usb.org/document-library/device-class-definition-hid-111).

/// Declares a tuple struct around a single number with `From` conversions
/// in both directions (also from a reference) and a `Display` that prints
/// the number.
macro_rules! value_type {
    ($(#[$attr:meta])* $name:ident($inner:ty)) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub $inner);

        impl From<$name> for $inner {
            fn from(v: $name) -> $inner {
                v.0
            }
        }

        impl From<&$name> for $inner {
            fn from(v: &$name) -> $inner {
                v.0
            }
        }

        impl From<$inner> for $name {
            fn from(v: $inner) -> $name {
                $name(v)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

value_type!(
    /// The upper 16 bits of a usage, see [UsageId].
    #[derive(Hash)]
    UsagePage(u16)
);
value_type!(LogicalMinimum(i32));
value_type!(LogicalMaximum(i32));
value_type!(PhysicalMinimum(i32));
value_type!(PhysicalMaximum(i32));

/// The system of measurement of a [Unit], see Section 6.2.2.7, the
/// lowest nibble of the Unit item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    None,
    SiLinear,
    SiRotation,
    EnglishLinear,
    EnglishRotation,
    Reserved(u8),
    VendorDefined,
}

impl From<u8> for UnitSystem {
    fn from(nibble: u8) -> UnitSystem {
        match nibble & 0xf {
            0x0 => UnitSystem::None,
            0x1 => UnitSystem::SiLinear,
            0x2 => UnitSystem::SiRotation,
            0x3 => UnitSystem::EnglishLinear,
            0x4 => UnitSystem::EnglishRotation,
            0xf => UnitSystem::VendorDefined,
            n => UnitSystem::Reserved(n),
        }
    }
}

value_type!(
    /// A Unit as described in Section 6.2.2.7. The value is a set of
    /// nibbles, the lowest one is the [UnitSystem], each of the following
    /// nibbles is the (signed, 4-bit) exponent of one base unit.
    ///
    /// ```
    /// # use hidrdesc::types::*;
    /// // Centimeter per second squared, SI Linear
    /// let unit = Unit(0xE011);
    /// assert_eq!(unit.system(), UnitSystem::SiLinear);
    /// assert_eq!(unit.length(), 1);
    /// assert_eq!(unit.time(), -2);
    /// assert_eq!(unit.mass(), 0);
    /// ```
    Unit(u32)
);

impl Unit {
    /// Sign-extend the 4-bit nibble at the given nibble index.
    fn nibble(&self, idx: u32) -> i8 {
        let n = ((self.0 >> (idx * 4)) & 0xf) as i8;
        (n << 4) >> 4
    }

    pub fn system(&self) -> UnitSystem {
        UnitSystem::from((self.0 & 0xf) as u8)
    }

    /// Exponent of the length unit (centimeter, radians, inch or degrees,
    /// depending on the [UnitSystem])
    pub fn length(&self) -> i8 {
        self.nibble(1)
    }

    /// Exponent of the mass unit (gram or slug)
    pub fn mass(&self) -> i8 {
        self.nibble(2)
    }

    /// Exponent of the time unit (seconds)
    pub fn time(&self) -> i8 {
        self.nibble(3)
    }

    /// Exponent of the temperature unit (kelvin or fahrenheit)
    pub fn temperature(&self) -> i8 {
        self.nibble(4)
    }

    /// Exponent of the current unit (ampere)
    pub fn current(&self) -> i8 {
        self.nibble(5)
    }

    /// Exponent of the luminous intensity unit (candela)
    pub fn luminous_intensity(&self) -> i8 {
        self.nibble(6)
    }
}

value_type!(
    /// The Unit Exponent as found in the item. Section 6.2.2.7 encodes the
    /// exponent as a 4-bit two's complement value, see [UnitExponent::exponent].
    UnitExponent(i32)
);

impl UnitExponent {
    /// The base-10 exponent. Values within -8..=7 are used as-is, anything
    /// else is interpreted as a 4-bit nibble (e.g. `0x0D` is -3).
    ///
    /// ```
    /// # use hidrdesc::types::*;
    /// assert_eq!(UnitExponent(0x0D).exponent(), -3);
    /// assert_eq!(UnitExponent(-3).exponent(), -3);
    /// assert_eq!(UnitExponent(2).exponent(), 2);
    /// ```
    pub fn exponent(&self) -> i8 {
        match self.0 {
            -8..=7 => self.0 as i8,
            v => (((v & 0xf) as i8) << 4) >> 4,
        }
    }
}

value_type!(
    /// Size of one field in bits
    ReportSize(usize)
);
value_type!(
    /// Reports with an ID are sent with the ID as first byte
    #[derive(Hash, PartialOrd, Ord)]
    ReportId(u8)
);
value_type!(ReportCount(usize));

value_type!(
    /// The lower 16 bits of a usage. Combined with the current [UsagePage]
    /// unless the Usage item carries its own page.
    #[derive(Hash)]
    UsageId(u16)
);
value_type!(UsageMinimum(u32));
value_type!(UsageMaximum(u32));
value_type!(StringIndex(u32));
value_type!(StringMinimum(u32));
value_type!(StringMaximum(u32));
value_type!(DesignatorIndex(u32));
value_type!(DesignatorMinimum(u32));
value_type!(DesignatorMaximum(u32));

/// A Delimiter opens (`true`) or closes (`false`) a set of alternative usages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter(pub bool);

impl From<Delimiter> for bool {
    fn from(d: Delimiter) -> bool {
        d.0
    }
}

impl Delimiter {
    pub fn is_open(&self) -> bool {
        self.0
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            true => write!(f, "Open"),
            false => write!(f, "Close"),
        }
    }
}
