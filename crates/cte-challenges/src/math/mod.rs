//! Math challenges: integer overflow, storage layout and ether accounting.

mod donation;
mod fifty_years;
mod mapping;
mod retirement_fund;
mod token_sale;
mod token_whale;

pub use donation::{Donation, DonationFixed, DonationRecord};
pub use fifty_years::{Contribution, FiftyYears, FiftyYearsFixed};
pub use mapping::MappingChallenge;
pub use retirement_fund::RetirementFund;
pub use token_sale::TokenSale;
pub use token_whale::TokenWhale;
