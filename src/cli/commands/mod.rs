pub mod checkout;
pub mod register;
pub mod resource;
pub mod sales;
pub mod token;
