pub mod customer_billing;
pub mod outbound_email;
