pub mod authority_ledger;
pub mod authority_record;
