use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::{classify, HolidayCalendar, RateCategory};
use crate::errors::{ParseError, PricingError};
use crate::parse::DateRange;

/// Validated party size, 1 through 8 guests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCount(u8);

impl GuestCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(count: u32) -> Result<Self, ParseError> {
        if (Self::MIN as u32..=Self::MAX as u32).contains(&count) {
            Ok(Self(count as u8))
        } else {
            Err(ParseError::GuestCount)
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Rooms and bedding needed for a stay; fixed for the whole range since the
/// guest count does not change night to night.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRequirement {
    pub rooms: u8,
    pub needs_extra_bed: bool,
}

/// Inclusive guest-count bracket; evaluated in order, first match wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRule {
    pub min_guests: u8,
    pub max_guests: u8,
    pub rooms: u8,
    pub extra_bed: bool,
}

impl BracketRule {
    pub fn covers(&self, guests: u8) -> bool {
        (self.min_guests..=self.max_guests).contains(&guests)
    }
}

/// Nightly base price per rate category, in whole TWD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePrices {
    pub weekday: u32,
    pub friday: u32,
    pub weekend: u32,
    pub sunday: u32,
    pub holiday: u32,
}

impl BasePrices {
    pub fn for_category(&self, category: RateCategory) -> u32 {
        match category {
            RateCategory::Weekday => self.weekday,
            RateCategory::Friday => self.friday,
            RateCategory::Weekend => self.weekend,
            RateCategory::Sunday => self.sunday,
            RateCategory::Holiday => self.holiday,
        }
    }
}

/// One priced night. `subtotal = base_price * rooms`, plus the flat extra-bed
/// fee once per night when the requirement calls for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCharge {
    pub date: NaiveDate,
    pub category: RateCategory,
    pub rooms: u8,
    pub extra_bed: bool,
    pub base_price: Decimal,
    pub subtotal: Decimal,
}

impl DailyCharge {
    /// The flat fee portion of the subtotal; zero when no extra bed was
    /// required.
    pub fn extra_bed_fee(&self) -> Decimal {
        self.subtotal - self.base_price * Decimal::from(self.rooms)
    }
}

/// A fully computed price breakdown for a stay. Immutable once computed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub range: DateRange,
    pub guest_count: GuestCount,
    pub requirement: RoomRequirement,
    pub charges: Vec<DailyCharge>,
    pub total: Decimal,
}

impl Quote {
    pub fn nights(&self) -> u32 {
        self.range.nights()
    }
}

/// The pricing engine: category base prices, the extra-bed fee, the ordered
/// room-bracket table, and the holiday calendar the classifier consults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateTable {
    base_prices: BasePrices,
    extra_bed_fee: u32,
    brackets: Vec<BracketRule>,
    holidays: HolidayCalendar,
}

impl RateTable {
    pub fn new(
        base_prices: BasePrices,
        extra_bed_fee: u32,
        brackets: Vec<BracketRule>,
        holidays: HolidayCalendar,
    ) -> Self {
        Self { base_prices, extra_bed_fee, brackets, holidays }
    }

    pub fn extra_bed_fee(&self) -> u32 {
        self.extra_bed_fee
    }

    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    pub fn room_requirement(&self, guests: GuestCount) -> Result<RoomRequirement, PricingError> {
        self.brackets
            .iter()
            .find(|rule| rule.covers(guests.get()))
            .map(|rule| RoomRequirement { rooms: rule.rooms, needs_extra_bed: rule.extra_bed })
            .ok_or(PricingError::UncoveredGuestCount(guests.get()))
    }

    /// Prices every night of the stay. Fails only when no bracket covers the
    /// guest count, which validated configuration rules out.
    pub fn quote(&self, range: DateRange, guests: GuestCount) -> Result<Quote, PricingError> {
        let requirement = self.room_requirement(guests)?;
        let charges: Vec<DailyCharge> =
            range.iter_nights().map(|date| self.daily_charge(date, requirement)).collect();
        let total = charges.iter().map(|charge| charge.subtotal).sum();

        Ok(Quote { range, guest_count: guests, requirement, charges, total })
    }

    fn daily_charge(&self, date: NaiveDate, requirement: RoomRequirement) -> DailyCharge {
        let category = classify(date, &self.holidays);
        let base_price = Decimal::from(self.base_prices.for_category(category));

        let mut subtotal = base_price * Decimal::from(requirement.rooms);
        if requirement.needs_extra_bed {
            subtotal += Decimal::from(self.extra_bed_fee);
        }

        DailyCharge {
            date,
            category,
            rooms: requirement.rooms,
            extra_bed: requirement.needs_extra_bed,
            base_price,
            subtotal,
        }
    }
}
