pub mod billing_records;
