pub mod acceptance;
pub mod couriers;
pub mod decline;
pub mod ledger;
pub mod lifecycle;
pub mod proposal;
pub mod queue;
pub mod ranking;
pub mod remittance;
pub mod settlement;

#[cfg(test)]
pub mod test_support;
