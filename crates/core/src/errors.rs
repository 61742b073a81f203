use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no recognized date expression, or the expression is not a valid calendar date")]
    Date,
    #[error("no guest count between 1 and 8 found")]
    GuestCount,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("no room bracket covers a party of {0}")]
    UncoveredGuestCount(u8),
}
